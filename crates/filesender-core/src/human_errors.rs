// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Plain-language explanations for skipped files and fatal errors.
//
// The command-line tool prints these instead of raw variant names so that
// whoever runs a batch knows what to fix before resubmitting.

use crate::error::FileSenderError;
use crate::types::SkipReason;

/// Whether resubmitting the same file unchanged could succeed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Remedy {
    /// Same file may go through later (e.g. the receiver was down).
    Resubmit,
    /// The file itself must be changed or regenerated.
    FixFile,
    /// Local setup (key, config, outbox) needs attention.
    FixSetup,
}

/// A human-readable explanation with an actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanSkip {
    /// Short summary, shown next to the file name.
    pub message: String,
    /// What to try next.
    pub suggestion: String,
    pub remedy: Remedy,
}

/// Explain why a file was skipped.
pub fn humanize_skip(reason: &SkipReason) -> HumanSkip {
    match reason {
        SkipReason::Unrecognized => HumanSkip {
            message: "not a recognised document".into(),
            suggestion: "Check that the file was produced by `filesender pack` or a compatible tool.".into(),
            remedy: Remedy::FixFile,
        },

        SkipReason::UnsupportedFormat { format } => HumanSkip {
            message: format!("format {format:?} is not accepted"),
            suggestion: "Re-export the document in an accepted format version.".into(),
            remedy: Remedy::FixFile,
        },

        SkipReason::Stale { created, expired_at } => HumanSkip {
            message: match expired_at {
                Some(expired) => format!(
                    "created {}, expired {}",
                    created.format("%Y-%m-%d %H:%M"),
                    expired.format("%Y-%m-%d %H:%M")
                ),
                None => format!("created {}, freshness window out of range", created.format("%Y-%m-%d")),
            },
            suggestion: "Regenerate the document; only recently created documents are sent.".into(),
            remedy: Remedy::FixFile,
        },

        SkipReason::SigningFailed { detail } => HumanSkip {
            message: "could not be signed".into(),
            suggestion: format!("Check the signing key. ({detail})"),
            remedy: Remedy::FixSetup,
        },

        SkipReason::DeliveryRejected { detail } => humanize_delivery(detail),
    }
}

/// Explain a fatal error that stopped the tool before or after a batch.
pub fn humanize_error(err: &FileSenderError) -> HumanSkip {
    match err {
        FileSenderError::Credential(detail) => HumanSkip {
            message: "the signing key could not be used".into(),
            suggestion: format!("Generate a new key with `filesender keygen`. ({detail})"),
            remedy: Remedy::FixSetup,
        },
        FileSenderError::Config(detail) | FileSenderError::Envelope(detail) => HumanSkip {
            message: err.to_string(),
            suggestion: format!("Correct the input and run again. ({detail})"),
            remedy: Remedy::FixSetup,
        },
        FileSenderError::Serialization(_) => HumanSkip {
            message: "a configuration file is not valid JSON".into(),
            suggestion: "Fix or delete the config file; defaults are used when it is absent.".into(),
            remedy: Remedy::FixSetup,
        },
        FileSenderError::Io(io) => HumanSkip {
            message: format!("file access failed: {io}"),
            suggestion: "Check that the path exists and is readable/writable.".into(),
            remedy: Remedy::FixSetup,
        },
        FileSenderError::Signing(detail) => humanize_skip(&SkipReason::SigningFailed {
            detail: detail.clone(),
        }),
        FileSenderError::Delivery(detail) => humanize_delivery(detail),
        FileSenderError::PayloadVerification(detail) => HumanSkip {
            message: "payload signature does not match".into(),
            suggestion: format!("The payload was altered or signed with another key. ({detail})"),
            remedy: Remedy::FixFile,
        },
    }
}

fn humanize_delivery(detail: &str) -> HumanSkip {
    let lower = detail.to_ascii_lowercase();

    if lower.contains("timed out") {
        HumanSkip {
            message: "the receiver did not respond in time".into(),
            suggestion: "Check the receiver is running and reachable, then resubmit.".into(),
            remedy: Remedy::Resubmit,
        }
    } else if lower.contains("connection refused") {
        HumanSkip {
            message: "the receiver refused the connection".into(),
            suggestion: "Check the host and port, then resubmit.".into(),
            remedy: Remedy::Resubmit,
        }
    } else if lower.contains("permission denied") {
        HumanSkip {
            message: "the outbox is not writable".into(),
            suggestion: "Fix the outbox directory permissions.".into(),
            remedy: Remedy::FixSetup,
        }
    } else {
        HumanSkip {
            message: "delivery failed".into(),
            suggestion: format!("Resubmit the file. ({detail})"),
            remedy: Remedy::Resubmit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn stale_message_names_both_dates() {
        let created = Utc.with_ymd_and_hms(2026, 1, 31, 8, 0, 0).unwrap();
        let expired = Utc.with_ymd_and_hms(2026, 2, 28, 8, 0, 0).unwrap();
        let human = humanize_skip(&SkipReason::Stale {
            created,
            expired_at: Some(expired),
        });
        assert_eq!(human.message, "created 2026-01-31 08:00, expired 2026-02-28 08:00");
        assert_eq!(human.remedy, Remedy::FixFile);
    }

    #[test]
    fn delivery_timeout_is_resubmittable() {
        let human = humanize_skip(&SkipReason::DeliveryRejected {
            detail: "connection to 10.0.0.5:9100 timed out after 60s".into(),
        });
        assert_eq!(human.remedy, Remedy::Resubmit);
        assert!(human.message.contains("in time"));
    }

    #[test]
    fn outbox_permission_needs_setup() {
        let human = humanize_error(&FileSenderError::Delivery(
            "write /spool/x.fsp: Permission denied (os error 13)".into(),
        ));
        assert_eq!(human.remedy, Remedy::FixSetup);
    }

    #[test]
    fn unsupported_format_quotes_tag() {
        let human = humanize_skip(&SkipReason::UnsupportedFormat { format: "".into() });
        assert_eq!(human.message, "format \"\" is not accepted");
    }
}
