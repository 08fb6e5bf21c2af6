// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// filesender-pipeline — The per-file recognise / validate / sign / deliver
// pipeline.  Collaborators are injected through the traits in
// `filesender-core`; failures are collected into a `BatchResult` instead of
// aborting the batch.

pub mod checks;
pub mod sender;

pub use checks::{check_format, check_freshness, freshness_deadline};
pub use sender::FileSender;
