// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Document validation: format tag and freshness window.

use chrono::{DateTime, Months, Utc};
use filesender_core::config::SenderConfig;
use filesender_core::types::{Document, SkipReason};

/// The document's format tag must be in the accepted set, compared as an
/// exact string.
pub fn check_format(document: &Document, config: &SenderConfig) -> Result<(), SkipReason> {
    if config.accepts_format(&document.format) {
        Ok(())
    } else {
        Err(SkipReason::UnsupportedFormat {
            format: document.format.clone(),
        })
    }
}

/// End of the freshness window: `created` plus `months` calendar months.
///
/// Month-end dates clamp to the last day of the target month
/// (January 31 + 1 month = February 28/29).  `None` if the result is out of
/// range.
pub fn freshness_deadline(created: DateTime<Utc>, months: u32) -> Option<DateTime<Utc>> {
    created.checked_add_months(Months::new(months))
}

/// Fresh when the deadline is strictly after `now`.
pub fn check_freshness(
    document: &Document,
    now: DateTime<Utc>,
    config: &SenderConfig,
) -> Result<(), SkipReason> {
    match freshness_deadline(document.created, config.freshness_months) {
        Some(deadline) if deadline > now => Ok(()),
        expired_at => Err(SkipReason::Stale {
            created: document.created,
            expired_at,
        }),
    }
}
