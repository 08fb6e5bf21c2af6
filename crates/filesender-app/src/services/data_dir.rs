// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Data directory resolution for config, keys and the default outbox.

use std::path::PathBuf;

const APP_DIR: &str = "filesender";

/// Application data directory.  Not created here; writers create what
/// they need.
pub fn data_dir() -> PathBuf {
    base_dir().join(APP_DIR)
}

/// Default config file location.
pub fn config_path() -> PathBuf {
    data_dir().join("config.json")
}

/// Default outbox when neither the command line nor the config names one.
pub fn default_outbox() -> PathBuf {
    data_dir().join("outbox")
}

fn base_dir() -> PathBuf {
    // XDG data dir, then ~/.local/share
    if let Some(xdg) = std::env::var_os("XDG_DATA_HOME").filter(|v| !v.is_empty()) {
        return PathBuf::from(xdg);
    }
    if let Some(home) = std::env::var_os("HOME") {
        return PathBuf::from(home).join(".local").join("share");
    }
    std::env::temp_dir()
}
