// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// ECDSA P-256 payload signing.
//
// Payload layout:
//
//   offset  size  field
//   0       4     magic "FSP1"
//   4       4     content length N, big-endian u32
//   8       N     content
//   8+N     ..    ASN.1 DER ECDSA-P256-SHA256 signature over content

use filesender_core::error::{FileSenderError, Result};
use filesender_core::traits::Signer;
use filesender_core::types::SignedPayload;
use ring::rand::SystemRandom;
use ring::signature::{ECDSA_P256_SHA256_ASN1, UnparsedPublicKey};
use tracing::trace;

use crate::credential::SigningCredential;

const MAGIC: &[u8; 4] = b"FSP1";
const HEADER_LEN: usize = 8;

/// Signs document content with a [`SigningCredential`].
#[derive(Debug)]
pub struct EcdsaSigner {
    rng: SystemRandom,
}

impl Default for EcdsaSigner {
    fn default() -> Self {
        Self::new()
    }
}

impl EcdsaSigner {
    pub fn new() -> Self {
        Self {
            rng: SystemRandom::new(),
        }
    }
}

impl Signer for EcdsaSigner {
    type Credential = SigningCredential;

    fn sign(&self, content: &[u8], credential: &SigningCredential) -> Result<SignedPayload> {
        let len = u32::try_from(content.len()).map_err(|_| {
            FileSenderError::Signing(format!("content too large: {} bytes", content.len()))
        })?;

        let signature = credential
            .key_pair()
            .sign(&self.rng, content)
            .map_err(|e| FileSenderError::Signing(format!("ECDSA signing failed: {e}")))?;

        let mut payload = Vec::with_capacity(HEADER_LEN + content.len() + signature.as_ref().len());
        payload.extend_from_slice(MAGIC);
        payload.extend_from_slice(&len.to_be_bytes());
        payload.extend_from_slice(content);
        payload.extend_from_slice(signature.as_ref());

        trace!(content_len = content.len(), payload_len = payload.len(), "content signed");
        Ok(SignedPayload::new(payload))
    }
}

/// Check `payload` against an uncompressed SEC1 P-256 public key and return
/// the signed content.
pub fn verify_payload<'a>(payload: &'a [u8], public_key: &[u8]) -> Result<&'a [u8]> {
    let malformed = |what: &str| FileSenderError::PayloadVerification(what.to_owned());

    if payload.len() < HEADER_LEN || &payload[..4] != MAGIC {
        return Err(malformed("missing FSP1 header"));
    }
    let mut len_bytes = [0u8; 4];
    len_bytes.copy_from_slice(&payload[4..HEADER_LEN]);
    let len = u32::from_be_bytes(len_bytes) as usize;

    let body = &payload[HEADER_LEN..];
    if body.len() <= len {
        return Err(malformed("truncated payload"));
    }
    let (content, signature) = body.split_at(len);

    UnparsedPublicKey::new(&ECDSA_P256_SHA256_ASN1, public_key)
        .verify(content, signature)
        .map_err(|_| malformed("signature does not match"))?;

    Ok(content)
}
