// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Raw TCP delivery (JetDirect-style, port 9100).
//
// Open a socket, write the payload, shut down.  No framing, no
// acknowledgement: the receiver reads until EOF.  A payload counts as
// delivered once it has been flushed and the write half closed cleanly.

use std::time::Duration;

use filesender_core::error::{FileSenderError, Result};
use filesender_core::traits::DeliveryChannel;
use filesender_core::types::SignedPayload;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::runtime::Runtime;
use tracing::{debug, info};

/// Default raw TCP port.
pub const RAW_PORT: u16 = 9100;

/// Default connect and write timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

const CHUNK_SIZE: usize = 8192;

/// Delivers each payload over its own raw TCP connection.
///
/// The pipeline is synchronous, so the channel owns a single-threaded tokio
/// runtime and blocks on each send.  Do not call `try_send` from inside
/// another tokio runtime.
pub struct RawTcpChannel {
    addr: String,
    timeout: Duration,
    runtime: Runtime,
}

impl RawTcpChannel {
    /// `target` is `host:port`, or just `host` for [`RAW_PORT`].
    pub fn new(target: &str) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| FileSenderError::Delivery(format!("tokio runtime: {e}")))?;

        Ok(Self {
            addr: normalize_target(target),
            timeout: DEFAULT_TIMEOUT,
            runtime,
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn addr(&self) -> &str {
        &self.addr
    }
}

impl DeliveryChannel for RawTcpChannel {
    fn try_send(&self, payload: &SignedPayload) -> Result<()> {
        self.runtime
            .block_on(send_raw(&self.addr, payload.as_bytes(), self.timeout))
    }
}

impl std::fmt::Debug for RawTcpChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RawTcpChannel")
            .field("addr", &self.addr)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Send `bytes` to `addr` over a fresh TCP connection.
pub async fn send_raw(addr: &str, bytes: &[u8], timeout: Duration) -> Result<()> {
    debug!(addr, total = bytes.len(), "connecting via raw TCP");

    let mut stream = tokio::time::timeout(timeout, TcpStream::connect(addr))
        .await
        .map_err(|_| {
            FileSenderError::Delivery(format!(
                "connection to {addr} timed out after {}s",
                timeout.as_secs()
            ))
        })?
        .map_err(|e| FileSenderError::Delivery(format!("connect to {addr}: {e}")))?;

    tokio::time::timeout(timeout, write_all_chunked(&mut stream, bytes))
        .await
        .map_err(|_| {
            FileSenderError::Delivery(format!(
                "write to {addr} timed out after {}s",
                timeout.as_secs()
            ))
        })??;

    info!(addr, total = bytes.len(), "payload sent via raw TCP");
    Ok(())
}

async fn write_all_chunked(stream: &mut TcpStream, bytes: &[u8]) -> Result<()> {
    let mut sent = 0usize;
    for chunk in bytes.chunks(CHUNK_SIZE) {
        stream.write_all(chunk).await.map_err(|e| {
            FileSenderError::Delivery(format!("raw TCP send failed at byte {sent}: {e}"))
        })?;
        sent += chunk.len();
    }

    stream
        .flush()
        .await
        .map_err(|e| FileSenderError::Delivery(format!("raw TCP flush: {e}")))?;
    stream
        .shutdown()
        .await
        .map_err(|e| FileSenderError::Delivery(format!("raw TCP shutdown: {e}")))?;
    Ok(())
}

/// Append [`RAW_PORT`] when `target` carries no port.  A bare IPv6 literal
/// (`::1`) is bracketed first; a port after an IPv6 host needs brackets
/// (`[::1]:9100`).
fn normalize_target(target: &str) -> String {
    let has_port = target.rsplit_once(':').is_some_and(|(host, port)| {
        let host_ok = if host.starts_with('[') {
            host.ends_with(']')
        } else {
            !host.is_empty() && !host.contains(':')
        };
        host_ok && port.parse::<u16>().is_ok()
    });
    if has_port {
        target.to_owned()
    } else if target.contains(':') && !target.starts_with('[') {
        format!("[{target}]:{RAW_PORT}")
    } else {
        format!("{target}:{RAW_PORT}")
    }
}
