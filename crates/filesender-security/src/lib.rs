// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// filesender-security — Signing credentials and payload signing.
//
// A credential is an ECDSA P-256 key pair held as PKCS#8 DER.  `EcdsaSigner`
// turns document content into a self-describing signed payload that
// `verify_payload` can check against the credential's public key.

pub mod credential;
pub mod integrity;
pub mod signer;

pub use credential::SigningCredential;
pub use integrity::{fingerprint, hash_bytes};
pub use signer::{EcdsaSigner, verify_payload};
