// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for FileSender.

use thiserror::Error;

/// Top-level error type for all FileSender operations.
///
/// Per-file business failures inside a batch never surface as this type;
/// the pipeline folds them into [`crate::SkipReason`].  These variants are
/// what collaborators and tooling return.
#[derive(Debug, Error)]
pub enum FileSenderError {
    // -- Document errors --
    #[error("envelope error: {0}")]
    Envelope(String),

    // -- Security errors --
    #[error("credential error: {0}")]
    Credential(String),

    #[error("signing failed: {0}")]
    Signing(String),

    #[error("payload verification failed: {0}")]
    PayloadVerification(String),

    // -- Delivery errors --
    #[error("delivery failed: {0}")]
    Delivery(String),

    // -- Configuration / persistence --
    #[error("configuration error: {0}")]
    Config(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, FileSenderError>;
