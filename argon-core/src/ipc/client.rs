//! IPC client for CLI commands
//!
//! Connects to the running daemon to send commands and receive responses.

use std::path::Path;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::UnixStream;
use tracing::debug;

use super::protocol::{DaemonStatus, IpcMessage, IpcResponse};
use super::socket_path;
use crate::error::{ArgonError, Result};
use crate::types::{SourceEntry, SourceOptions};

/// Default connection timeout
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Default read/write timeout
const IO_TIMEOUT: Duration = Duration::from_secs(10);

/// Timeout for enumeration requests
///
/// Deliberately generous: an enumeration can take a while, and if the
/// caller that originated a coalesced enumeration is torn down, the
/// daemon will never respond at all. This timeout is the client's
/// protection against waiting forever in that case.
const SOURCES_TIMEOUT: Duration = Duration::from_secs(30);

/// IPC client for communicating with the daemon
pub struct IpcClient {
    stream: UnixStream,
}

impl IpcClient {
    /// Connect to the daemon at the default socket path
    pub async fn connect() -> Result<Self> {
        Self::connect_to(socket_path()).await
    }

    /// Connect to the daemon at a specific socket path
    pub async fn connect_to(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ArgonError::NoActiveDaemon);
        }

        let stream = tokio::time::timeout(CONNECT_TIMEOUT, UnixStream::connect(path))
            .await
            .map_err(|_| ArgonError::Ipc("Connection timed out".into()))?
            .map_err(|e| ArgonError::Ipc(format!("Failed to connect to daemon: {}", e)))?;

        debug!("Connected to daemon at {:?}", path);

        Ok(Self { stream })
    }

    /// Send a message and receive a response with timeout
    async fn send(&mut self, msg: IpcMessage) -> Result<IpcResponse> {
        self.send_with_timeout(msg, IO_TIMEOUT).await
    }

    /// Send a message and receive a response with custom timeout
    async fn send_with_timeout(
        &mut self,
        msg: IpcMessage,
        timeout: Duration,
    ) -> Result<IpcResponse> {
        let (reader, mut writer) = self.stream.split();

        // Send message with timeout
        let msg_bytes = msg.to_bytes();
        tokio::time::timeout(timeout, writer.write_all(&msg_bytes))
            .await
            .map_err(|_| ArgonError::Ipc("Write timed out".into()))?
            .map_err(|e| ArgonError::Ipc(format!("Failed to send message: {}", e)))?;

        // Read response with timeout
        let mut reader = BufReader::new(reader);
        let mut line = String::new();
        tokio::time::timeout(timeout, reader.read_line(&mut line))
            .await
            .map_err(|_| ArgonError::Ipc("Read timed out".into()))?
            .map_err(|e| ArgonError::Ipc(format!("Failed to read response: {}", e)))?;

        IpcResponse::from_bytes(line.trim().as_bytes())
            .map_err(|e| ArgonError::Ipc(format!("Invalid response: {}", e)))
    }

    /// Ping the daemon to check if it's alive
    pub async fn ping(&mut self) -> Result<bool> {
        match self.send(IpcMessage::Ping).await {
            Ok(IpcResponse::Pong) => Ok(true),
            Ok(_) => Ok(false),
            Err(_) => Ok(false),
        }
    }

    /// Enumerate capturable sources
    pub async fn sources(&mut self, options: SourceOptions) -> Result<Vec<SourceEntry>> {
        match self
            .send_with_timeout(IpcMessage::Sources { options }, SOURCES_TIMEOUT)
            .await?
        {
            IpcResponse::Sources { sources } => Ok(sources),
            IpcResponse::Error { message } => Err(ArgonError::Capture(message)),
            _ => Err(ArgonError::Ipc("Unexpected response".into())),
        }
    }

    /// Get the current daemon status
    pub async fn status(&mut self) -> Result<DaemonStatus> {
        match self.send(IpcMessage::Status).await? {
            IpcResponse::Status(status) => Ok(status),
            IpcResponse::Error { message } => Err(ArgonError::Ipc(message)),
            _ => Err(ArgonError::Ipc("Unexpected response".into())),
        }
    }

    /// Request the daemon to stop
    pub async fn stop(&mut self) -> Result<()> {
        match self.send(IpcMessage::Stop).await? {
            IpcResponse::Stopping => Ok(()),
            IpcResponse::Error { message } => Err(ArgonError::Ipc(message)),
            _ => Err(ArgonError::Ipc("Unexpected response".into())),
        }
    }
}
