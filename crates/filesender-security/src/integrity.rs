// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// SHA-256 digests used to name outbox files and to tag log lines.

use sha2::{Digest, Sha256};

/// Hex characters kept by [`fingerprint`].
const FINGERPRINT_LEN: usize = 16;

/// SHA-256 of `data` as a lowercase hex string.
pub fn hash_bytes(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

/// Short, log-friendly prefix of [`hash_bytes`].
///
/// Not collision resistant enough to identify content; use the full hash
/// for anything stored.
pub fn fingerprint(data: &[u8]) -> String {
    let mut full = hash_bytes(data);
    full.truncate(FINGERPRINT_LEN);
    full
}
