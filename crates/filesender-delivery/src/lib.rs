// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// FileSender Delivery — channels that accept signed payloads: a spool
// directory, a raw TCP socket, and an in-memory buffer.

pub mod memory;
pub mod outbox;
pub mod raw_tcp;

pub use memory::MemoryChannel;
pub use outbox::OutboxChannel;
pub use raw_tcp::RawTcpChannel;
