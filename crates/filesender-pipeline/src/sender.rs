// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// The batch pipeline: recognise → check format → check freshness → sign →
// deliver, per file, collecting the files that fall out at any stage.
//
// A file's evaluation reads only the file itself, the shared credential and
// the injected collaborators.  Nothing one file does changes how another is
// judged, which is what makes parallel evaluation equivalent to sequential.

use filesender_core::clock::{Clock, SystemClock};
use filesender_core::config::{ExecutionMode, SenderConfig};
use filesender_core::traits::{DeliveryChannel, Recognizer, Signer};
use filesender_core::types::{BatchResult, RawFile, SkipReason, SkippedFile};
use filesender_security::fingerprint;
use rayon::prelude::*;
use tracing::{debug, info, instrument, warn};

use crate::checks::{check_format, check_freshness};

/// Sends batches of files through a recogniser, signer and delivery channel.
pub struct FileSender<R, S, D, C = SystemClock> {
    recognizer: R,
    signer: S,
    channel: D,
    clock: C,
    config: SenderConfig,
}

impl<R, S, D> FileSender<R, S, D, SystemClock> {
    /// Pipeline with the default policy and the system clock.
    pub fn new(recognizer: R, signer: S, channel: D) -> Self {
        Self {
            recognizer,
            signer,
            channel,
            clock: SystemClock,
            config: SenderConfig::default(),
        }
    }
}

impl<R, S, D, C> FileSender<R, S, D, C> {
    /// Replace the time source used by the freshness check.
    pub fn with_clock<C2>(self, clock: C2) -> FileSender<R, S, D, C2> {
        FileSender {
            recognizer: self.recognizer,
            signer: self.signer,
            channel: self.channel,
            clock,
            config: self.config,
        }
    }

    pub fn with_config(mut self, config: SenderConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &SenderConfig {
        &self.config
    }

    pub fn recognizer(&self) -> &R {
        &self.recognizer
    }

    pub fn signer(&self) -> &S {
        &self.signer
    }

    pub fn channel(&self) -> &D {
        &self.channel
    }
}

impl<R, S, D, C> FileSender<R, S, D, C>
where
    R: Recognizer,
    S: Signer,
    D: DeliveryChannel,
    C: Clock,
{
    /// Run one file through every stage, stopping at the first failure.
    pub fn send_file(&self, file: &RawFile, credential: &S::Credential) -> Result<(), SkipReason> {
        let document = self
            .recognizer
            .recognize(file)
            .ok_or(SkipReason::Unrecognized)?;

        check_format(&document, &self.config)?;
        check_freshness(&document, self.clock.now(), &self.config)?;

        let payload = self
            .signer
            .sign(&document.content, credential)
            .map_err(|e| SkipReason::SigningFailed {
                detail: e.to_string(),
            })?;

        self.channel
            .try_send(&payload)
            .map_err(|e| SkipReason::DeliveryRejected {
                detail: e.to_string(),
            })?;

        debug!(
            file = file.name(),
            document = %document.name,
            payload = %fingerprint(payload.as_bytes()),
            "file sent"
        );
        Ok(())
    }

    /// Evaluate the batch on the calling thread, in input order.
    #[instrument(skip_all, fields(files = files.len()))]
    pub fn send_files_sequential(&self, files: &[RawFile], credential: &S::Credential) -> BatchResult {
        let skipped = files
            .iter()
            .enumerate()
            .filter_map(|(index, file)| self.judge(index, file, credential))
            .collect();
        summarize(files.len(), skipped)
    }

    fn judge(&self, index: usize, file: &RawFile, credential: &S::Credential) -> Option<SkippedFile> {
        let reason = self.send_file(file, credential).err()?;
        warn!(file = file.name(), index, %reason, "file skipped");
        Some(SkippedFile {
            index,
            file: file.clone(),
            reason,
        })
    }
}

impl<R, S, D, C> FileSender<R, S, D, C>
where
    R: Recognizer + Sync,
    S: Signer + Sync,
    S::Credential: Sync,
    D: DeliveryChannel + Sync,
    C: Clock + Sync,
{
    /// Send a batch with the configured [`ExecutionMode`].
    ///
    /// Never fails as a whole: every per-file failure ends up in the
    /// returned skip list, in input order.
    pub fn send_files(&self, files: &[RawFile], credential: &S::Credential) -> BatchResult {
        match self.config.execution {
            ExecutionMode::Sequential => self.send_files_sequential(files, credential),
            ExecutionMode::Parallel => self.send_files_parallel(files, credential),
        }
    }

    /// Evaluate files on the rayon pool.  The skip list is the same as
    /// [`FileSender::send_files_sequential`] would produce.
    #[instrument(skip_all, fields(files = files.len()))]
    pub fn send_files_parallel(&self, files: &[RawFile], credential: &S::Credential) -> BatchResult {
        // Indexed collect keeps input order.
        let outcomes: Vec<Option<SkippedFile>> = files
            .par_iter()
            .enumerate()
            .map(|(index, file)| self.judge(index, file, credential))
            .collect();
        summarize(files.len(), outcomes.into_iter().flatten().collect())
    }
}

fn summarize(total: usize, skipped: Vec<SkippedFile>) -> BatchResult {
    let result = BatchResult::new(total, skipped);
    info!(
        total,
        sent = result.sent_count(),
        skipped = result.skipped_count(),
        "batch finished"
    );
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use filesender_core::clock::FixedClock;
    use filesender_core::error::{FileSenderError, Result};
    use filesender_core::types::{Document, SignedPayload};
    use std::collections::{HashMap, HashSet};
    use std::sync::Mutex;

    // -- Test doubles -------------------------------------------------------

    /// Recognises files by name from a fixed table and logs every call.
    #[derive(Default)]
    struct TableRecognizer {
        documents: HashMap<String, Document>,
        calls: Mutex<Vec<String>>,
    }

    impl TableRecognizer {
        fn with(mut self, file: &RawFile, document: Document) -> Self {
            self.documents.insert(file.name().to_owned(), document);
            self
        }
    }

    impl Recognizer for TableRecognizer {
        fn recognize(&self, file: &RawFile) -> Option<Document> {
            self.calls.lock().unwrap().push(file.name().to_owned());
            self.documents.get(file.name()).cloned()
        }
    }

    /// Payload = content followed by the credential bytes.  Fails for
    /// content listed in `refuse`.
    #[derive(Default)]
    struct ConcatSigner {
        refuse: HashSet<Vec<u8>>,
        calls: Mutex<Vec<Vec<u8>>>,
    }

    impl Signer for ConcatSigner {
        type Credential = str;

        fn sign(&self, content: &[u8], credential: &str) -> Result<SignedPayload> {
            self.calls.lock().unwrap().push(content.to_vec());
            if self.refuse.contains(content) {
                return Err(FileSenderError::Signing("hardware token unplugged".into()));
            }
            let mut bytes = content.to_vec();
            bytes.extend_from_slice(credential.as_bytes());
            Ok(SignedPayload::new(bytes))
        }
    }

    /// Accepts every payload except those in `reject`.
    #[derive(Default)]
    struct RecordingChannel {
        reject: HashSet<Vec<u8>>,
        delivered: Mutex<Vec<Vec<u8>>>,
        attempts: Mutex<usize>,
    }

    impl DeliveryChannel for RecordingChannel {
        fn try_send(&self, payload: &SignedPayload) -> Result<()> {
            *self.attempts.lock().unwrap() += 1;
            if self.reject.contains(payload.as_bytes()) {
                return Err(FileSenderError::Delivery("receiver said no".into()));
            }
            self.delivered.lock().unwrap().push(payload.as_bytes().to_vec());
            Ok(())
        }
    }

    const CERT: &str = "cert";

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 16, 12, 0, 0).unwrap()
    }

    fn file() -> RawFile {
        RawFile::new("someFile", vec![1, 2, 3])
    }

    fn document_for(file: &RawFile, format: &str, created: DateTime<Utc>) -> Document {
        Document::new(file.name(), file.content(), created, format)
    }

    fn signed(content: &[u8]) -> Vec<u8> {
        let mut bytes = content.to_vec();
        bytes.extend_from_slice(CERT.as_bytes());
        bytes
    }

    type TestSender = FileSender<TableRecognizer, ConcatSigner, RecordingChannel, FixedClock>;

    fn sender(recognizer: TableRecognizer) -> TestSender {
        sender_with(recognizer, ConcatSigner::default(), RecordingChannel::default())
    }

    fn sender_with(
        recognizer: TableRecognizer,
        signer: ConcatSigner,
        channel: RecordingChannel,
    ) -> TestSender {
        FileSender::new(recognizer, signer, channel).with_clock(FixedClock(now()))
    }

    /// The ordinary case: `file()` recognised as a fresh 4.0 document.
    fn default_sender() -> TestSender {
        let f = file();
        sender(TableRecognizer::default().with(&f, document_for(&f, "4.0", now())))
    }

    fn skip_reasons(result: &BatchResult) -> Vec<&SkipReason> {
        result.skipped().iter().map(|s| &s.reason).collect()
    }

    // -- Single-file behaviour ---------------------------------------------

    #[test]
    fn sends_accepted_formats() {
        for format in ["4.0", "3.1"] {
            let f = file();
            let sender = sender(TableRecognizer::default().with(&f, document_for(&f, format, now())));

            let result = sender.send_files(&[f.clone()], CERT);
            assert!(result.all_sent(), "{format}");
            assert_eq!(*sender.channel().delivered.lock().unwrap(), [signed(f.content())]);
        }
    }

    #[test]
    fn skips_bad_format_regardless_of_everything_else() {
        let f = file();
        let sender = sender(TableRecognizer::default().with(&f, document_for(&f, "###", now())));

        let result = sender.send_files(&[f.clone()], CERT);
        assert!(result.contains(&f));
        assert_eq!(
            skip_reasons(&result),
            [&SkipReason::UnsupportedFormat { format: "###".into() }]
        );
        assert!(sender.signer().calls.lock().unwrap().is_empty());
        assert_eq!(*sender.channel().attempts.lock().unwrap(), 0);
    }

    #[test]
    fn skips_document_exactly_one_month_old() {
        let f = file();
        let created = Utc.with_ymd_and_hms(2026, 9, 16, 12, 0, 0).unwrap();
        let sender = sender(TableRecognizer::default().with(&f, document_for(&f, "4.0", created)));

        let result = sender.send_files(&[f.clone()], CERT);
        assert!(result.contains(&f));
        assert!(matches!(skip_reasons(&result)[0], SkipReason::Stale { .. }));
    }

    #[test]
    fn skips_document_one_month_and_a_unit_old() {
        let f = file();
        let created = Utc.with_ymd_and_hms(2026, 9, 16, 12, 0, 0).unwrap() - Duration::seconds(1);
        let sender = sender(TableRecognizer::default().with(&f, document_for(&f, "4.0", created)));

        assert!(sender.send_files(&[f.clone()], CERT).contains(&f));
    }

    #[test]
    fn sends_document_just_younger_than_a_month() {
        let f = file();
        let created = Utc.with_ymd_and_hms(2026, 9, 16, 12, 0, 0).unwrap() + Duration::seconds(1);
        let sender = sender(TableRecognizer::default().with(&f, document_for(&f, "4.0", created)));

        assert!(sender.send_files(&[f], CERT).all_sent());
    }

    #[test]
    fn unrecognized_file_never_reaches_signer_or_channel() {
        let sender = sender(TableRecognizer::default());

        let result = sender.send_files(&[file()], CERT);
        assert!(result.contains(&file()));
        assert_eq!(skip_reasons(&result), [&SkipReason::Unrecognized]);
        assert_eq!(*sender.recognizer().calls.lock().unwrap(), ["someFile"]);
        assert!(sender.signer().calls.lock().unwrap().is_empty());
        assert_eq!(*sender.channel().attempts.lock().unwrap(), 0);
    }

    #[test]
    fn skips_when_delivery_fails() {
        let f = file();
        let channel = RecordingChannel {
            reject: HashSet::from([signed(f.content())]),
            ..Default::default()
        };
        let sender = sender_with(
            TableRecognizer::default().with(&f, document_for(&f, "4.0", now())),
            ConcatSigner::default(),
            channel,
        );

        let result = sender.send_files(&[f.clone()], CERT);
        assert!(result.contains(&f));
        assert!(matches!(
            skip_reasons(&result)[0],
            SkipReason::DeliveryRejected { detail } if detail.contains("receiver said no")
        ));
    }

    #[test]
    fn skips_when_signing_fails_without_delivering() {
        let f = file();
        let signer = ConcatSigner {
            refuse: HashSet::from([f.content().to_vec()]),
            ..Default::default()
        };
        let sender = sender_with(
            TableRecognizer::default().with(&f, document_for(&f, "4.0", now())),
            signer,
            RecordingChannel::default(),
        );

        let result = sender.send_files(&[f], CERT);
        assert!(matches!(skip_reasons(&result)[0], SkipReason::SigningFailed { .. }));
        assert_eq!(*sender.channel().attempts.lock().unwrap(), 0);
    }

    #[test]
    fn signs_recognized_content_with_batch_credential() {
        let f = file();
        // Recogniser re-derives the content from the raw bytes.
        let recognizer =
            TableRecognizer::default().with(&f, Document::new("renamed", vec![9, 9], now(), "3.1"));
        let sender = sender(recognizer);

        sender.send_files(&[f], "other-cert");
        assert_eq!(*sender.signer().calls.lock().unwrap(), [vec![9, 9]]);
        assert_eq!(
            *sender.channel().delivered.lock().unwrap(),
            [b"\x09\x09other-cert".to_vec()]
        );
    }

    // -- Batches -------------------------------------------------------------

    #[test]
    fn empty_batch_skips_nothing() {
        let result = default_sender().send_files(&[], CERT);
        assert!(result.all_sent());
        assert_eq!(result.total(), 0);
    }

    #[test]
    fn unrecognized_file_does_not_affect_neighbour() {
        let other = RawFile::new("otherFile", vec![1, 2, 3]);
        let sender = default_sender();

        let result = sender.send_files(&[file(), other.clone()], CERT);
        let skipped: Vec<&RawFile> = result.skipped_files().collect();
        assert_eq!(skipped, [&other]);
        assert_eq!(result.sent_count(), 1);
    }

    #[test]
    fn failed_delivery_does_not_affect_neighbour() {
        let f = file();
        let other = RawFile::new("otherFile", vec![3, 3, 3]);
        let channel = RecordingChannel {
            reject: HashSet::from([signed(other.content())]),
            ..Default::default()
        };
        let recognizer = TableRecognizer::default()
            .with(&f, document_for(&f, "4.0", now()))
            .with(&other, document_for(&other, "4.0", now()));
        let sender = sender_with(recognizer, ConcatSigner::default(), channel);

        let result = sender.send_files(&[f.clone(), other.clone()], CERT);
        assert_eq!(result.skipped_files().collect::<Vec<_>>(), [&other]);
        assert_eq!(*sender.channel().delivered.lock().unwrap(), [signed(f.content())]);
    }

    #[test]
    fn duplicates_are_judged_independently() {
        let f = file();
        let result = default_sender().send_files(&[f.clone(), f.clone(), f], CERT);
        assert!(result.all_sent());

        let unknown = RawFile::new("unknown", vec![0]);
        let result = default_sender().send_files(&[unknown.clone(), file(), unknown], CERT);
        let indices: Vec<usize> = result.skipped().iter().map(|s| s.index).collect();
        assert_eq!(indices, [0, 2]);
    }

    /// A mixed batch exercising every stage.  Returns the batch and the
    /// names expected to be skipped, in order.
    fn mixed_batch() -> (TestSender, Vec<RawFile>, Vec<String>) {
        let fresh = now() - Duration::days(2);
        let stale = now() - Duration::days(45);
        let files: Vec<RawFile> = (0..24)
            .map(|i| RawFile::new(format!("f{i:02}"), vec![i as u8]))
            .collect();

        let mut recognizer = TableRecognizer::default();
        let mut refuse_sign = HashSet::new();
        let mut reject = HashSet::new();
        let mut expected = Vec::new();
        for (i, f) in files.iter().enumerate() {
            match i % 6 {
                0 => expected.push(i), // unrecognised
                1 => recognizer = recognizer.with(f, document_for(f, "2.0", fresh)),
                2 => recognizer = recognizer.with(f, document_for(f, "3.1", stale)),
                3 => {
                    refuse_sign.insert(f.content().to_vec());
                    recognizer = recognizer.with(f, document_for(f, "4.0", fresh));
                }
                4 => {
                    reject.insert(signed(f.content()));
                    recognizer = recognizer.with(f, document_for(f, "4.0", fresh));
                }
                _ => recognizer = recognizer.with(f, document_for(f, "3.1", fresh)),
            }
            if (1..=4).contains(&(i % 6)) {
                expected.push(i);
            }
        }

        let names = expected.into_iter().map(|i| format!("f{i:02}")).collect();
        let sender = sender_with(
            recognizer,
            ConcatSigner {
                refuse: refuse_sign,
                ..Default::default()
            },
            RecordingChannel {
                reject,
                ..Default::default()
            },
        );
        (sender, files, names)
    }

    #[test]
    fn skip_list_is_subset_in_input_order() {
        let (sender, files, expected) = mixed_batch();
        let result = sender.send_files(&files, CERT);

        let names: Vec<&str> = result.skipped_files().map(RawFile::name).collect();
        assert_eq!(names, expected);
        assert!(result.skipped().iter().all(|s| files[s.index] == s.file));
        assert_eq!(result.sent_count(), 4);
        // Every sent file was delivered exactly once.
        assert_eq!(sender.channel().delivered.lock().unwrap().len(), 4);
    }

    #[test]
    fn parallel_matches_sequential() {
        let (sequential, files, _) = mixed_batch();
        let (parallel, _, _) = mixed_batch();
        let parallel = parallel.with_config(SenderConfig {
            execution: ExecutionMode::Parallel,
            ..Default::default()
        });

        let a = sequential.send_files(&files, CERT);
        let b = parallel.send_files(&files, CERT);
        assert_eq!(a, b);

        let mut delivered_a = sequential.channel().delivered.lock().unwrap().clone();
        let mut delivered_b = parallel.channel().delivered.lock().unwrap().clone();
        delivered_a.sort();
        delivered_b.sort();
        assert_eq!(delivered_a, delivered_b);
    }

    #[test]
    fn custom_policy_is_applied() {
        let f = file();
        let sender = sender(TableRecognizer::default().with(&f, document_for(&f, "5.0", now())))
            .with_config(SenderConfig {
                accepted_formats: vec!["5.0".into()],
                ..Default::default()
            });
        assert!(sender.send_files(&[f], CERT).all_sent());
    }
}
