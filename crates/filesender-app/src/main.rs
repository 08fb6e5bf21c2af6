// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// FileSender — command-line batch signer and sender.
//
// Entry point. Initialises logging, loads configuration, and dispatches to
// the command implementations in `services::commands`.

mod services;

use std::path::PathBuf;
use std::process::ExitCode;

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use filesender_core::AppConfig;
use filesender_core::error::Result;
use filesender_core::human_errors::humanize_error;

use services::commands::{self, SendOptions, Target};
use services::data_dir;

/// Exit status when the command ran but some files were skipped or some
/// payloads failed verification.
const EXIT_PARTIAL: u8 = 2;

#[derive(Debug, Parser)]
#[command(name = "filesender", version, about = "Recognise, sign and deliver document batches")]
struct Cli {
    /// Log at debug level (RUST_LOG overrides).
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (default: <data dir>/filesender/config.json).
    #[arg(long, global = true, env = "FILESENDER_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Generate a signing key.
    Keygen {
        #[arg(long)]
        out: PathBuf,
        /// Overwrite an existing key file.
        #[arg(long)]
        force: bool,
    },
    /// Wrap a body file in a document envelope.
    Pack {
        /// Format tag, e.g. 4.0
        #[arg(long)]
        format: String,
        /// Creation time, RFC 3339 (default: now).
        #[arg(long, value_parser = parse_rfc3339)]
        created: Option<DateTime<Utc>>,
        /// Document name (default: the file name it is sent under).
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        out: PathBuf,
        body: PathBuf,
    },
    /// Sign and deliver a batch; skipped files are listed.
    Send {
        #[arg(long)]
        key: PathBuf,
        /// Spool payloads into this directory.
        #[arg(long, conflicts_with = "raw")]
        outbox: Option<PathBuf>,
        /// Send payloads over raw TCP to host[:port].
        #[arg(long)]
        raw: Option<String>,
        /// Evaluate files in parallel.
        #[arg(long)]
        parallel: bool,
        /// Print the report as JSON.
        #[arg(long)]
        json: bool,
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Verify spooled payloads against a key.
    Verify {
        #[arg(long)]
        key: PathBuf,
        #[arg(required = true)]
        payloads: Vec<PathBuf>,
    },
}

fn parse_rfc3339(value: &str) -> std::result::Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| format!("expected RFC 3339 timestamp: {e}"))
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(EXIT_PARTIAL),
        Err(e) => {
            tracing::error!(error = %e, "filesender failed");
            let human = humanize_error(&e);
            eprintln!("error: {}\n    {}", human.message, human.suggestion);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<bool> {
    let config_path = cli.config.unwrap_or_else(data_dir::config_path);
    let config = AppConfig::load_or_default(&config_path)?;
    let mut stdout = std::io::stdout().lock();

    match cli.command {
        Command::Keygen { out, force } => {
            commands::keygen(&out, force, &mut stdout)?;
            Ok(true)
        }
        Command::Pack {
            format,
            created,
            name,
            out,
            body,
        } => {
            commands::pack(&body, &format, created, name.as_deref(), &out)?;
            Ok(true)
        }
        Command::Send {
            key,
            outbox,
            raw,
            parallel,
            json,
            files,
        } => {
            let options = SendOptions {
                key,
                target: Target::resolve(outbox, raw, &config),
                parallel,
                json,
                files,
            };
            commands::send(&options, &config, &mut stdout)
        }
        Command::Verify { key, payloads } => commands::verify(&key, &payloads, &mut stdout),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn outbox_and_raw_conflict() {
        let err = Cli::try_parse_from([
            "filesender", "send", "--key", "k", "--outbox", "o", "--raw", "h", "f",
        ])
        .unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn created_must_be_rfc3339() {
        assert!(parse_rfc3339("2026-10-01T09:30:00Z").is_ok());
        assert!(parse_rfc3339("2026-10-01").is_err());
    }
}
