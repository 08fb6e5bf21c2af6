// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Collaborator capabilities consumed by the pipeline.
//
// The pipeline never talks to a concrete recogniser, signer or transport.
// Each is injected as a type implementing one of these traits, so tests can
// substitute deterministic doubles.

use crate::error::Result;
use crate::types::{Document, RawFile, SignedPayload};

/// Turns a raw file into a structured document.
pub trait Recognizer {
    /// Returns `None` when the file cannot be recognised.
    ///
    /// Must be deterministic for a given file name and content.
    fn recognize(&self, file: &RawFile) -> Option<Document>;
}

/// Produces a signed payload from document content and a credential.
pub trait Signer {
    /// Signing authority, supplied once per batch and only ever borrowed.
    type Credential: ?Sized;

    fn sign(&self, content: &[u8], credential: &Self::Credential) -> Result<SignedPayload>;
}

/// Accepts a signed payload for delivery.
pub trait DeliveryChannel {
    /// `Ok(())` when the payload was delivered.  An error means it was not;
    /// callers must not assume anything was partially written.
    fn try_send(&self, payload: &SignedPayload) -> Result<()>;
}

impl<T: Recognizer + ?Sized> Recognizer for &T {
    fn recognize(&self, file: &RawFile) -> Option<Document> {
        (**self).recognize(file)
    }
}

impl<T: Recognizer + ?Sized> Recognizer for Box<T> {
    fn recognize(&self, file: &RawFile) -> Option<Document> {
        (**self).recognize(file)
    }
}

impl<T: Signer + ?Sized> Signer for &T {
    type Credential = T::Credential;

    fn sign(&self, content: &[u8], credential: &Self::Credential) -> Result<SignedPayload> {
        (**self).sign(content, credential)
    }
}

impl<T: Signer + ?Sized> Signer for Box<T> {
    type Credential = T::Credential;

    fn sign(&self, content: &[u8], credential: &Self::Credential) -> Result<SignedPayload> {
        (**self).sign(content, credential)
    }
}

impl<T: DeliveryChannel + ?Sized> DeliveryChannel for &T {
    fn try_send(&self, payload: &SignedPayload) -> Result<()> {
        (**self).try_send(payload)
    }
}

impl<T: DeliveryChannel + ?Sized> DeliveryChannel for Box<T> {
    fn try_send(&self, payload: &SignedPayload) -> Result<()> {
        (**self).try_send(payload)
    }
}
