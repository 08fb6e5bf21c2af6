// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the FileSender pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An unprocessed, named byte payload submitted for sending.
///
/// Immutable once constructed: the pipeline only ever reads it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RawFile {
    name: String,
    content: Vec<u8>,
}

impl RawFile {
    pub fn new(name: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }

    /// Read a file from disk, using its file name (not the full path) as
    /// the identifying name.
    pub fn read(path: impl AsRef<std::path::Path>) -> crate::error::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self { name, content })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn content(&self) -> &[u8] {
        &self.content
    }
}

/// A recognised document, derived from a [`RawFile`] by a recogniser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub name: String,
    /// Document body, possibly re-derived from the raw content.
    pub content: Vec<u8>,
    pub created: DateTime<Utc>,
    /// Format / version tag, e.g. `"4.0"`.
    pub format: String,
}

impl Document {
    pub fn new(
        name: impl Into<String>,
        content: impl Into<Vec<u8>>,
        created: DateTime<Utc>,
        format: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
            created,
            format: format.into(),
        }
    }
}

/// Opaque signed bytes produced by a signer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SignedPayload(Vec<u8>);

impl SignedPayload {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<u8>> for SignedPayload {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

/// Why a file was left out of a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkipReason {
    /// The recogniser could not turn the file into a document.
    Unrecognized,
    /// The document's format tag is not in the accepted set.
    UnsupportedFormat { format: String },
    /// The document fell outside the freshness window.
    ///
    /// `expired_at` is `None` when the window end is not representable.
    Stale {
        created: DateTime<Utc>,
        expired_at: Option<DateTime<Utc>>,
    },
    /// The signer returned an error.
    SigningFailed { detail: String },
    /// The delivery channel did not accept the payload.
    DeliveryRejected { detail: String },
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unrecognized => write!(f, "unrecognized"),
            Self::UnsupportedFormat { format } => write!(f, "unsupported format {format:?}"),
            Self::Stale { created, .. } => write!(f, "stale (created {})", created.to_rfc3339()),
            Self::SigningFailed { detail } => write!(f, "signing failed: {detail}"),
            Self::DeliveryRejected { detail } => write!(f, "delivery rejected: {detail}"),
        }
    }
}

/// One skipped entry of a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedFile {
    /// Position of the file in the input batch.
    pub index: usize,
    pub file: RawFile,
    pub reason: SkipReason,
}

/// Outcome of one batch: the skipped subset of the input, in input order.
///
/// Files that are not listed here were sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchResult {
    total: usize,
    skipped: Vec<SkippedFile>,
}

impl BatchResult {
    /// Build a result for a batch of `total` files.  `skipped` is put into
    /// input order and keeps one entry per index.
    pub fn new(total: usize, mut skipped: Vec<SkippedFile>) -> Self {
        skipped.sort_by_key(|s| s.index);
        skipped.dedup_by_key(|s| s.index);
        Self { total, skipped }
    }

    /// Skipped entries with their positions and reasons.
    pub fn skipped(&self) -> &[SkippedFile] {
        &self.skipped
    }

    /// The skipped files themselves, in input order.
    pub fn skipped_files(&self) -> impl Iterator<Item = &RawFile> {
        self.skipped.iter().map(|s| &s.file)
    }

    /// Whether `file` (by value) is among the skipped files.
    pub fn contains(&self, file: &RawFile) -> bool {
        self.skipped.iter().any(|s| &s.file == file)
    }

    /// Whether the input entry at `index` was skipped.
    pub fn is_skipped(&self, index: usize) -> bool {
        self.skipped.binary_search_by_key(&index, |s| s.index).is_ok()
    }

    /// Number of files in the batch.
    pub fn total(&self) -> usize {
        self.total
    }

    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }

    pub fn sent_count(&self) -> usize {
        self.total.saturating_sub(self.skipped.len())
    }

    /// True when no file was skipped.
    pub fn all_sent(&self) -> bool {
        self.skipped.is_empty()
    }
}
