// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// filesender-document — Turning raw files into documents.
//
// Provides the envelope format (a JSON header line in front of the document
// body) and its recogniser.

pub mod envelope;

pub use envelope::{EnvelopeRecognizer, write_envelope};
