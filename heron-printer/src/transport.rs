//! Network transport for ESC/POS payloads
//!
//! Most thermal printers accept raw data on TCP port 9100. Delivery is
//! fire-and-forget: these devices return no application-level response, so
//! success means the full payload was written and flushed.

use crate::error::{PrintError, PrintResult};
use async_trait::async_trait;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tracing::{info, instrument};

/// Default timeout covering connect + write + flush.
pub const DEFAULT_SEND_TIMEOUT: Duration = Duration::from_millis(3000);

/// Transport seam for delivering one payload to one printer endpoint.
///
/// Exactly one resolution per call; no retries (retry policy belongs to
/// the caller); no connection reuse across calls.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Deliver `payload` to `address:port`, closing the connection on
    /// completion regardless of outcome.
    async fn send(&self, address: &str, port: u16, payload: &[u8]) -> PrintResult<()>;
}

/// TCP transport (raw port 9100 printing)
///
/// One fixed timeout bounds the whole operation; a printer that accepts
/// the connection but never drains the payload surfaces as `Timeout`
/// rather than hanging the caller.
#[derive(Debug, Clone)]
pub struct TcpTransport {
    timeout: Duration,
}

impl TcpTransport {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    async fn send_inner(address: &str, port: u16, payload: &[u8]) -> PrintResult<()> {
        let mut stream = TcpStream::connect((address, port))
            .await
            .map_err(|e| PrintError::Connect(format!("{}:{}: {}", address, port, e)))?;

        stream
            .write_all(payload)
            .await
            .map_err(|e| PrintError::Write(format!("{}:{}: {}", address, port, e)))?;

        stream
            .flush()
            .await
            .map_err(|e| PrintError::Write(format!("{}:{}: {}", address, port, e)))?;

        // Dropping the stream tears the connection down; late events on it
        // can no longer be observed, so a send resolves exactly once.
        Ok(())
    }
}

impl Default for TcpTransport {
    fn default() -> Self {
        Self::new(DEFAULT_SEND_TIMEOUT)
    }
}

#[async_trait]
impl Transport for TcpTransport {
    #[instrument(skip_all, fields(addr = %address, port = port, data_len = payload.len()))]
    async fn send(&self, address: &str, port: u16, payload: &[u8]) -> PrintResult<()> {
        if address.is_empty() {
            return Err(PrintError::InvalidConfig("empty printer address".into()));
        }

        match tokio::time::timeout(self.timeout, Self::send_inner(address, port, payload)).await {
            Ok(res) => {
                if res.is_ok() {
                    info!("Print payload delivered");
                }
                res
            }
            Err(_) => Err(PrintError::Timeout(format!(
                "{}:{} after {:?}",
                address, port, self.timeout
            ))),
        }
    }
}
