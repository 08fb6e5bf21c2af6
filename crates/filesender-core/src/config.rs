// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Pipeline policy and application configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{FileSenderError, Result};

/// Format tags accepted out of the box.
pub const DEFAULT_ACCEPTED_FORMATS: [&str; 2] = ["4.0", "3.1"];

/// How a batch is scheduled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    /// One file after another on the calling thread.
    #[default]
    Sequential,
    /// Files evaluated on the rayon pool; results still in input order.
    Parallel,
}

/// Validation policy applied by the pipeline to every recognised document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SenderConfig {
    /// Format tags that pass the format check (exact string match).
    pub accepted_formats: Vec<String>,
    /// Freshness window in calendar months.
    pub freshness_months: u32,
    pub execution: ExecutionMode,
}

impl Default for SenderConfig {
    fn default() -> Self {
        Self {
            accepted_formats: DEFAULT_ACCEPTED_FORMATS.iter().map(|f| f.to_string()).collect(),
            freshness_months: 1,
            execution: ExecutionMode::Sequential,
        }
    }
}

impl SenderConfig {
    /// Whether `format` is in the accepted set.  No trimming, no case folding.
    pub fn accepts_format(&self, format: &str) -> bool {
        self.accepted_formats.iter().any(|f| f == format)
    }

    /// Reject policies that could never send anything.
    pub fn validate(&self) -> Result<()> {
        if self.accepted_formats.is_empty() {
            return Err(FileSenderError::Config(
                "accepted_formats must not be empty".into(),
            ));
        }
        if self.freshness_months == 0 {
            return Err(FileSenderError::Config(
                "freshness_months must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Persistent settings for the `filesender` command-line tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub sender: SenderConfig,
    /// Outbox used by `send` when neither `--outbox` nor `--raw` is given.
    pub default_outbox: Option<PathBuf>,
    /// Connect/write timeout for raw TCP delivery, in seconds.
    pub raw_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            sender: SenderConfig::default(),
            default_outbox: None,
            raw_timeout_secs: 60,
        }
    }
}

impl AppConfig {
    /// Load a config file written by [`AppConfig::save`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&data)?;
        config.sender.validate()?;
        debug!(path = %path.display(), "config loaded");
        Ok(config)
    }

    /// Load `path` if it exists, otherwise return defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            debug!(path = %path.display(), "no config file, using defaults");
            Ok(Self::default())
        }
    }

    /// Persist as pretty-printed JSON, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}
