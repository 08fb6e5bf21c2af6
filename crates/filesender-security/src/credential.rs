// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Signing credential — an ECDSA P-256 key pair.
//
// `ring` has no X.509 support, so a credential is the raw PKCS#8 v1 DER key
// document.  It is parsed once on construction; a value of this type always
// holds a usable key.

use std::path::Path;

use filesender_core::error::{FileSenderError, Result};
use ring::rand::SystemRandom;
use ring::signature::{ECDSA_P256_SHA256_ASN1_SIGNING, EcdsaKeyPair, KeyPair};
use tracing::{debug, instrument};

use crate::integrity::fingerprint;

/// ECDSA P-256 signing authority shared by every file of a batch.
pub struct SigningCredential {
    /// PKCS#8 v1 DER (includes the public key).
    pkcs8_der: Vec<u8>,
    key_pair: EcdsaKeyPair,
}

impl SigningCredential {
    /// Generate a fresh key pair using the OS CSPRNG.
    #[instrument]
    pub fn generate() -> Result<Self> {
        let rng = SystemRandom::new();
        let document = EcdsaKeyPair::generate_pkcs8(&ECDSA_P256_SHA256_ASN1_SIGNING, &rng)
            .map_err(|e| FileSenderError::Credential(format!("key generation failed: {e}")))?;

        let credential = Self::from_pkcs8_der(document.as_ref())?;
        debug!(fingerprint = %credential.fingerprint(), "credential generated");
        Ok(credential)
    }

    /// Parse and validate a PKCS#8 v1 DER key document.
    pub fn from_pkcs8_der(der: &[u8]) -> Result<Self> {
        let rng = SystemRandom::new();
        let key_pair = EcdsaKeyPair::from_pkcs8(&ECDSA_P256_SHA256_ASN1_SIGNING, der, &rng)
            .map_err(|e| FileSenderError::Credential(format!("key rejected: {e}")))?;

        Ok(Self {
            pkcs8_der: der.to_vec(),
            key_pair,
        })
    }

    /// Load a key written by [`SigningCredential::save`].
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let der = std::fs::read(path.as_ref())?;
        let credential = Self::from_pkcs8_der(&der)?;
        debug!(fingerprint = %credential.fingerprint(), "credential loaded");
        Ok(credential)
    }

    /// Write the PKCS#8 DER to `path`, owner-readable only on Unix.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, &self.pkcs8_der)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
        }

        Ok(())
    }

    /// PKCS#8 v1 DER private key document.
    pub fn pkcs8_der(&self) -> &[u8] {
        &self.pkcs8_der
    }

    /// Uncompressed SEC1 public key (65 bytes).
    pub fn public_key(&self) -> &[u8] {
        self.key_pair.public_key().as_ref()
    }

    /// Short hash of the public key, for logs and CLI output.
    pub fn fingerprint(&self) -> String {
        fingerprint(self.public_key())
    }

    pub(crate) fn key_pair(&self) -> &EcdsaKeyPair {
        &self.key_pair
    }
}

impl std::fmt::Debug for SigningCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningCredential")
            .field("fingerprint", &self.fingerprint())
            .finish_non_exhaustive()
    }
}
