// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Command implementations.  Each writes its report to `out` and returns
// whether everything it was asked to do succeeded; fatal problems are
// returned as errors.

use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use filesender_core::error::{FileSenderError, Result};
use filesender_core::human_errors::humanize_skip;
use filesender_core::traits::DeliveryChannel;
use filesender_core::{AppConfig, ExecutionMode, RawFile};
use filesender_delivery::{OutboxChannel, RawTcpChannel};
use filesender_document::{EnvelopeRecognizer, write_envelope};
use filesender_pipeline::FileSender;
use filesender_security::{EcdsaSigner, SigningCredential, verify_payload};
use tracing::{info, instrument};

use super::data_dir;

/// Where `send` delivers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Outbox(PathBuf),
    RawTcp(String),
}

impl Target {
    /// Command-line choice first, then the config, then the data dir.
    pub fn resolve(outbox: Option<PathBuf>, raw: Option<String>, config: &AppConfig) -> Self {
        match (outbox, raw) {
            (_, Some(addr)) => Self::RawTcp(addr),
            (Some(dir), None) => Self::Outbox(dir),
            (None, None) => Self::Outbox(
                config
                    .default_outbox
                    .clone()
                    .unwrap_or_else(data_dir::default_outbox),
            ),
        }
    }

    fn open(&self, config: &AppConfig) -> Result<Box<dyn DeliveryChannel + Sync>> {
        let channel: Box<dyn DeliveryChannel + Sync> = match self {
            Self::Outbox(dir) => Box::new(OutboxChannel::open(dir)?),
            Self::RawTcp(addr) => Box::new(
                RawTcpChannel::new(addr)?
                    .with_timeout(std::time::Duration::from_secs(config.raw_timeout_secs)),
            ),
        };
        Ok(channel)
    }
}

/// Options for [`send`].
#[derive(Debug, Clone)]
pub struct SendOptions {
    pub key: PathBuf,
    pub target: Target,
    pub parallel: bool,
    pub json: bool,
    pub files: Vec<PathBuf>,
}

/// Generate a credential and write it to `out_path`.
pub fn keygen(out_path: &Path, force: bool, out: &mut impl Write) -> Result<()> {
    if out_path.exists() && !force {
        return Err(FileSenderError::Credential(format!(
            "{} already exists (use --force to overwrite)",
            out_path.display()
        )));
    }
    let credential = SigningCredential::generate()?;
    credential.save(out_path)?;
    writeln!(out, "{}  {}", credential.fingerprint(), out_path.display())?;
    Ok(())
}

/// Wrap a body file in an envelope.
pub fn pack(
    body_path: &Path,
    format: &str,
    created: Option<DateTime<Utc>>,
    name: Option<&str>,
    out_path: &Path,
) -> Result<()> {
    let body = std::fs::read(body_path)?;
    let bytes = write_envelope(format, created.unwrap_or_else(Utc::now), name, &body)?;
    std::fs::write(out_path, bytes)?;
    info!(out = %out_path.display(), format, "envelope written");
    Ok(())
}

/// Run the pipeline over `options.files`.  `Ok(true)` when nothing was
/// skipped.
#[instrument(skip_all, fields(files = options.files.len()))]
pub fn send(options: &SendOptions, config: &AppConfig, out: &mut impl Write) -> Result<bool> {
    let credential = SigningCredential::load(&options.key)?;
    let files = options
        .files
        .iter()
        .map(RawFile::read)
        .collect::<Result<Vec<_>>>()?;

    let mut sender_config = config.sender.clone();
    if options.parallel {
        sender_config.execution = ExecutionMode::Parallel;
    }
    sender_config.validate()?;

    let channel = options.target.open(config)?;
    let sender = FileSender::new(EnvelopeRecognizer, EcdsaSigner::new(), channel)
        .with_config(sender_config);

    info!(credential = %credential.fingerprint(), target = ?options.target, "sending batch");
    let result = sender.send_files(&files, &credential);

    if options.json {
        let skipped: Vec<serde_json::Value> = result
            .skipped()
            .iter()
            .map(|s| {
                serde_json::json!({
                    "path": options.files[s.index].display().to_string(),
                    "reason": s.reason,
                })
            })
            .collect();
        let report = serde_json::json!({
            "total": result.total(),
            "sent": result.sent_count(),
            "skipped": skipped,
        });
        writeln!(out, "{}", serde_json::to_string_pretty(&report)?)?;
    } else {
        for skipped in result.skipped() {
            let human = humanize_skip(&skipped.reason);
            writeln!(
                out,
                "skipped {}: {}\n    {}",
                options.files[skipped.index].display(),
                human.message,
                human.suggestion
            )?;
        }
        writeln!(
            out,
            "{} sent, {} skipped",
            result.sent_count(),
            result.skipped_count()
        )?;
    }

    Ok(result.all_sent())
}

/// Check payload files against a credential.  `Ok(true)` when all verify.
pub fn verify(key: &Path, payloads: &[PathBuf], out: &mut impl Write) -> Result<bool> {
    let credential = SigningCredential::load(key)?;
    let mut all_ok = true;

    for path in payloads {
        let bytes = std::fs::read(path)?;
        match verify_payload(&bytes, credential.public_key()) {
            Ok(content) => writeln!(out, "ok      {} ({} bytes)", path.display(), content.len())?,
            Err(e) => {
                all_ok = false;
                writeln!(out, "FAILED  {}: {e}", path.display())?;
            }
        }
    }
    Ok(all_ok)
}
