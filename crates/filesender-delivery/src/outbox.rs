// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Outbox delivery — spool each payload into a directory.
//
// Files are named by the SHA-256 of the payload, so delivering the same
// payload twice rewrites the same file.  Each write goes to its own temporary
// file in the outbox and is renamed into place, so concurrent sends of one
// payload never share a partial file and a reader polling the outbox never
// sees a half-written `.fsp` file.

use std::io::Write;
use std::path::{Path, PathBuf};

use filesender_core::error::{FileSenderError, Result};
use filesender_core::traits::DeliveryChannel;
use filesender_core::types::SignedPayload;
use filesender_security::hash_bytes;
use tempfile::NamedTempFile;
use tracing::{debug, instrument};

/// Extension of spooled payload files.
pub const PAYLOAD_EXTENSION: &str = "fsp";

/// Delivers payloads by writing them into a directory.
#[derive(Debug, Clone)]
pub struct OutboxChannel {
    dir: PathBuf,
}

impl OutboxChannel {
    /// Use `dir` as the outbox, creating it if needed.
    #[instrument(skip_all, fields(dir = %dir.as_ref().display()))]
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir)?;
        debug!("outbox ready");
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path a payload is (or would be) spooled to.
    pub fn path_for(&self, payload: &SignedPayload) -> PathBuf {
        self.dir
            .join(format!("{}.{PAYLOAD_EXTENSION}", hash_bytes(payload.as_bytes())))
    }

    /// Spooled payload files, sorted by name.
    pub fn list(&self) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for entry in std::fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == PAYLOAD_EXTENSION) {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }
}

impl DeliveryChannel for OutboxChannel {
    fn try_send(&self, payload: &SignedPayload) -> Result<()> {
        let target = self.path_for(payload);

        let mut partial = NamedTempFile::new_in(&self.dir).map_err(|e| {
            FileSenderError::Delivery(format!("create temp file in {}: {e}", self.dir.display()))
        })?;
        partial.write_all(payload.as_bytes()).map_err(|e| {
            FileSenderError::Delivery(format!("write {}: {e}", partial.path().display()))
        })?;
        partial.persist(&target).map_err(|e| {
            FileSenderError::Delivery(format!("rename into {}: {}", target.display(), e.error))
        })?;

        debug!(path = %target.display(), len = payload.len(), "payload spooled");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_lands_under_its_hash() {
        let dir = tempfile::tempdir().unwrap();
        let outbox = OutboxChannel::open(dir.path().join("out")).unwrap();
        let payload = SignedPayload::new(b"signed bytes".to_vec());

        outbox.try_send(&payload).unwrap();

        let files = outbox.list().unwrap();
        assert_eq!(files, [outbox.path_for(&payload)]);
        assert_eq!(std::fs::read(&files[0]).unwrap(), b"signed bytes");
    }

    #[test]
    fn same_payload_twice_is_one_file() {
        let dir = tempfile::tempdir().unwrap();
        let outbox = OutboxChannel::open(dir.path()).unwrap();
        let payload = SignedPayload::new(vec![7; 32]);

        outbox.try_send(&payload).unwrap();
        outbox.try_send(&payload).unwrap();
        outbox.try_send(&SignedPayload::new(vec![8; 32])).unwrap();

        assert_eq!(outbox.list().unwrap().len(), 2);
    }

    #[test]
    fn concurrent_sends_of_one_payload_all_succeed() {
        let dir = tempfile::tempdir().unwrap();
        let outbox = OutboxChannel::open(dir.path()).unwrap();
        let payload = SignedPayload::new((0..1 << 20).map(|i| (i % 251) as u8).collect());

        let failures: usize = std::thread::scope(|scope| {
            let workers: Vec<_> = (0..8)
                .map(|_| {
                    scope.spawn(|| {
                        (0..10)
                            .filter(|_| outbox.try_send(&payload).is_err())
                            .count()
                    })
                })
                .collect();
            workers.into_iter().map(|w| w.join().unwrap()).sum()
        });

        assert_eq!(failures, 0);
        assert_eq!(outbox.list().unwrap(), [outbox.path_for(&payload)]);
        assert_eq!(std::fs::read(outbox.path_for(&payload)).unwrap(), payload.as_bytes());
        // No temporary files left behind.
        assert_eq!(std::fs::read_dir(outbox.dir()).unwrap().count(), 1);
    }

    #[test]
    fn vanished_outbox_is_a_delivery_error() {
        let dir = tempfile::tempdir().unwrap();
        let outbox = OutboxChannel::open(dir.path().join("gone")).unwrap();
        std::fs::remove_dir(outbox.dir()).unwrap();

        let err = outbox.try_send(&SignedPayload::new(vec![1])).unwrap_err();
        assert!(matches!(err, FileSenderError::Delivery(_)));
    }
}
