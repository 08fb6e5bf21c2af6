// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Document envelopes — a one-line JSON header followed by the body.
//
//   {"format":"4.0","created":"2026-10-01T09:30:00Z"}\n
//   <body bytes ...>
//
// The header may also carry `"name"`, which overrides the file name as the
// document name.  Anything else in the header is ignored.

use chrono::{DateTime, Utc};
use filesender_core::error::{FileSenderError, Result};
use filesender_core::traits::Recognizer;
use filesender_core::types::{Document, RawFile};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Longest header line considered before giving up.
pub const MAX_HEADER_LEN: usize = 4096;

#[derive(Debug, Serialize, Deserialize)]
struct EnvelopeHeader {
    format: String,
    created: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
}

/// Recognises files written by [`write_envelope`].
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvelopeRecognizer;

impl EnvelopeRecognizer {
    pub fn new() -> Self {
        Self
    }
}

impl Recognizer for EnvelopeRecognizer {
    fn recognize(&self, file: &RawFile) -> Option<Document> {
        let content = file.content();
        let search = &content[..content.len().min(MAX_HEADER_LEN + 1)];

        let Some(newline) = search.iter().position(|&b| b == b'\n') else {
            debug!(file = file.name(), "no envelope header line");
            return None;
        };

        let header: EnvelopeHeader = match serde_json::from_slice(&content[..newline]) {
            Ok(header) => header,
            Err(e) => {
                debug!(file = file.name(), error = %e, "envelope header not parseable");
                return None;
            }
        };

        Some(Document {
            name: header.name.unwrap_or_else(|| file.name().to_owned()),
            content: content[newline + 1..].to_vec(),
            created: header.created,
            format: header.format,
        })
    }
}

/// Wrap `body` in an envelope header.
pub fn write_envelope(
    format: &str,
    created: DateTime<Utc>,
    name: Option<&str>,
    body: &[u8],
) -> Result<Vec<u8>> {
    if format.contains('\n') {
        return Err(FileSenderError::Envelope("format tag must be a single line".into()));
    }

    let header = EnvelopeHeader {
        format: format.to_owned(),
        created,
        name: name.map(str::to_owned),
    };
    // Compact JSON escapes newlines inside strings, so the header is one line.
    let mut out = serde_json::to_vec(&header)?;
    if out.len() > MAX_HEADER_LEN {
        return Err(FileSenderError::Envelope(format!(
            "header is {} bytes, limit is {MAX_HEADER_LEN}",
            out.len()
        )));
    }
    out.push(b'\n');
    out.extend_from_slice(body);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn created() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 1, 9, 30, 0).unwrap()
    }

    #[test]
    fn recognises_written_envelope() {
        let bytes = write_envelope("4.0", created(), None, b"line one\nline two").unwrap();
        let file = RawFile::new("invoice.fsd", bytes);

        let doc = EnvelopeRecognizer.recognize(&file).expect("should recognise");
        assert_eq!(doc.name, "invoice.fsd");
        assert_eq!(doc.format, "4.0");
        assert_eq!(doc.created, created());
        assert_eq!(doc.content, b"line one\nline two");
    }

    #[test]
    fn header_name_overrides_file_name() {
        let bytes = write_envelope("3.1", created(), Some("Invoice 42"), b"").unwrap();
        let doc = EnvelopeRecognizer
            .recognize(&RawFile::new("tmp-001", bytes))
            .unwrap();
        assert_eq!(doc.name, "Invoice 42");
        assert!(doc.content.is_empty());
    }

    #[test]
    fn hand_written_header_is_accepted() {
        let file = RawFile::new(
            "a",
            &b"{\"format\":\"###\",\"created\":\"2026-10-01T09:30:00+02:00\",\"extra\":1}\r\nbody"[..],
        );
        let doc = EnvelopeRecognizer.recognize(&file).unwrap();
        // Unaccepted tags are still recognised; validation happens later.
        assert_eq!(doc.format, "###");
        assert_eq!(doc.created, Utc.with_ymd_and_hms(2026, 10, 1, 7, 30, 0).unwrap());
        assert_eq!(doc.content, b"body");
    }

    #[test]
    fn rejects_files_without_header() {
        let cases: [&[u8]; 6] = [
            b"",
            b"no newline at all",
            b"plain text\nbody",
            b"{\"format\":\"4.0\"}\nmissing created",
            b"{\"format\":4.0,\"created\":\"2026-10-01T09:30:00Z\"}\nnumeric format",
            b"\xff\xfe\nnot utf-8",
        ];
        for content in cases {
            assert!(
                EnvelopeRecognizer.recognize(&RawFile::new("x", content)).is_none(),
                "should reject {content:?}"
            );
        }
    }

    #[test]
    fn header_beyond_limit_is_rejected() {
        let mut content = vec![b' '; MAX_HEADER_LEN + 10];
        content.extend_from_slice(b"\nbody");
        assert!(EnvelopeRecognizer.recognize(&RawFile::new("x", content)).is_none());
    }

    #[test]
    fn multi_line_format_is_refused() {
        assert!(write_envelope("4.0\n", created(), None, b"").is_err());
    }
}
