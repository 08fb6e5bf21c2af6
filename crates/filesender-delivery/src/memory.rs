// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// In-memory delivery channel.
//
// Buffers delivered payloads in a queue that the caller drains.  Used for
// dry runs and as a deterministic receiver in tests and benchmarks.  Can be
// switched to reject everything to simulate an unreachable receiver.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use filesender_core::error::{FileSenderError, Result};
use filesender_core::traits::DeliveryChannel;
use filesender_core::types::SignedPayload;
use tracing::{debug, warn};

/// Delivery channel that keeps payloads in memory.
///
/// Clones share the same buffer, so a test can hand one clone to the
/// pipeline and inspect another.
#[derive(Debug, Clone, Default)]
pub struct MemoryChannel {
    buffer: Arc<Mutex<VecDeque<SignedPayload>>>,
    rejecting: Arc<AtomicBool>,
}

impl MemoryChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// While `true`, every `try_send` fails and nothing is buffered.
    pub fn set_rejecting(&self, rejecting: bool) {
        let old = self.rejecting.swap(rejecting, Ordering::SeqCst);
        if old != rejecting {
            warn!(rejecting, "memory channel acceptance changed");
        }
    }

    /// Number of payloads waiting in the buffer.
    pub fn delivered_count(&self) -> usize {
        self.lock().len()
    }

    /// Take all buffered payloads in delivery order (empties the buffer).
    pub fn drain(&self) -> Vec<SignedPayload> {
        self.lock().drain(..).collect()
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<SignedPayload>> {
        self.buffer.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl DeliveryChannel for MemoryChannel {
    fn try_send(&self, payload: &SignedPayload) -> Result<()> {
        if self.rejecting.load(Ordering::SeqCst) {
            return Err(FileSenderError::Delivery("memory channel is rejecting".into()));
        }

        let mut buffer = self.lock();
        buffer.push_back(payload.clone());
        debug!(len = payload.len(), buffered = buffer.len(), "payload buffered");
        Ok(())
    }
}
