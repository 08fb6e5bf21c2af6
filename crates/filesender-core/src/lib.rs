// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// FileSender — Core types, errors and collaborator traits shared across all
// crates.

pub mod cache;
pub mod clock;
pub mod config;
pub mod error;
pub mod human_errors;
pub mod traits;
pub mod types;

pub use cache::{ReadThroughCache, Source};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{AppConfig, ExecutionMode, SenderConfig};
pub use error::FileSenderError;
pub use traits::{DeliveryChannel, Recognizer, Signer};
pub use types::*;
