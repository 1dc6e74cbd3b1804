//! Remote channel client
//!
//! Established once at process start when a remote address is configured;
//! shared read-only by every caller afterwards. A timeout or disconnect is
//! surfaced as a transport failure for that call - it never degrades to
//! local execution, because that would silently change which secret
//! material backs the operation.

use crate::rpc::protocol::{RpcRequest, RpcResponse};
use fundlift_core::{ErrorContext, PlatformError, PlatformResult, RemoteConfig};
use serde_json::Value;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{
    tcp::{OwnedReadHalf, OwnedWriteHalf},
    TcpStream,
};
use tokio::sync::Mutex;
use tracing::{debug, info};

struct ChannelInner {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
}

/// Client side of the RPC channel
pub struct RemoteChannel {
    inner: Mutex<ChannelInner>,
    timeout: Duration,
    addr: String,
}

impl RemoteChannel {
    /// Connect to the configured remote service
    pub async fn connect(config: &RemoteConfig) -> PlatformResult<Self> {
        let stream = TcpStream::connect(&config.addr)
            .await
            .map_err(|e| PlatformError::Transport {
                message: format!("failed to connect to {}: {}", config.addr, e),
                source: Some(Box::new(e)),
                context: ErrorContext::new("channel")
                    .with_operation("connect")
                    .with_suggestion("Check that the remote service is running"),
            })?;

        info!(addr = %config.addr, "remote channel established");

        let (read_half, write_half) = stream.into_split();
        Ok(Self {
            inner: Mutex::new(ChannelInner {
                reader: BufReader::new(read_half),
                writer: write_half,
            }),
            timeout: Duration::from_millis(config.request_timeout_ms),
            addr: config.addr.clone(),
        })
    }

    /// Send one operation and await its correlated response
    pub async fn call(&self, op: &str, payload: Value) -> PlatformResult<Value> {
        let request = RpcRequest::new(op, payload);
        debug!(op = %op, id = %request.id, "remote call");

        match tokio::time::timeout(self.timeout, self.round_trip(&request)).await {
            Ok(result) => result,
            Err(_) => Err(PlatformError::transport(
                &format!("call '{}' to {} timed out", op, self.addr),
                "channel",
            )),
        }
    }

    async fn round_trip(&self, request: &RpcRequest) -> PlatformResult<Value> {
        let mut inner = self.inner.lock().await;

        let mut frame = serde_json::to_string(request)?;
        frame.push('\n');
        inner
            .writer
            .write_all(frame.as_bytes())
            .await
            .map_err(|e| PlatformError::transport(&format!("write failed: {}", e), "channel"))?;

        let mut line = String::new();
        loop {
            line.clear();
            let read = inner
                .reader
                .read_line(&mut line)
                .await
                .map_err(|e| PlatformError::transport(&format!("read failed: {}", e), "channel"))?;

            if read == 0 {
                return Err(PlatformError::transport("remote channel closed", "channel"));
            }

            let response: RpcResponse = serde_json::from_str(line.trim()).map_err(|e| {
                PlatformError::transport(&format!("malformed response frame: {}", e), "channel")
            })?;

            // A stale frame from a previously timed-out call; skip it and
            // keep waiting for ours
            if response.id != Some(request.id) {
                debug!(id = ?response.id, "discarding uncorrelated response frame");
                continue;
            }

            return match (response.ok, response.err) {
                (Some(value), None) => Ok(value),
                (None, Some(err)) => Err(err.into_platform_error("channel")),
                _ => Err(PlatformError::transport(
                    "response frame carried neither result nor error",
                    "channel",
                )),
            };
        }
    }
}

impl std::fmt::Debug for RemoteChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteChannel")
            .field("addr", &self.addr)
            .field("timeout", &self.timeout)
            .finish()
    }
}
