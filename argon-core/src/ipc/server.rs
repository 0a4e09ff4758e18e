//! IPC server for daemon mode
//!
//! Listens on a Unix socket and handles client requests. Each
//! connection runs on its own task so concurrent clients can coalesce
//! onto the same enumeration. A connection is one caller session: if it
//! closes while an enumeration it originated is still in flight, that
//! enumeration's delivery is cancelled.

use std::os::unix::fs::PermissionsExt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::unix::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

use super::protocol::{DaemonStatus, IpcMessage, IpcResponse};
use super::socket_path;
use crate::capture::SourceCoalescer;
use crate::error::{ArgonError, Result};
use crate::types::SourceOptions;

/// IPC server that handles client connections
pub struct IpcServer {
    /// Path to the Unix socket
    socket_path: PathBuf,
    /// Listener for incoming connections
    listener: Option<UnixListener>,
    /// Shared coalescer
    coalescer: Arc<SourceCoalescer>,
    /// Shutdown signal sender
    shutdown_tx: broadcast::Sender<()>,
    /// Start time for uptime calculation
    start_time: Instant,
}

impl IpcServer {
    /// Create a new IPC server at the default socket path
    pub fn new(coalescer: Arc<SourceCoalescer>) -> Result<Self> {
        Self::with_socket(coalescer, socket_path())
    }

    /// Create a new IPC server at a specific socket path
    pub fn with_socket(coalescer: Arc<SourceCoalescer>, path: PathBuf) -> Result<Self> {
        let (shutdown_tx, _) = broadcast::channel(1);

        Ok(Self {
            socket_path: path,
            listener: None,
            coalescer,
            shutdown_tx,
            start_time: Instant::now(),
        })
    }

    /// Start listening for connections
    pub async fn start(&mut self) -> Result<()> {
        // Remove existing socket if present
        if self.socket_path.exists() {
            std::fs::remove_file(&self.socket_path)
                .map_err(|e| ArgonError::Ipc(format!("Failed to remove old socket: {}", e)))?;
        }

        // Create parent directory if needed
        if let Some(parent) = self.socket_path.parent() {
            if !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    ArgonError::Ipc(format!("Failed to create socket directory: {}", e))
                })?;
            }
        }

        // Bind to socket
        let listener = UnixListener::bind(&self.socket_path).map_err(|e| {
            ArgonError::Ipc(format!(
                "Failed to bind socket at {:?}: {}",
                self.socket_path, e
            ))
        })?;

        // Set socket permissions to owner-only (0600)
        // This prevents other users from connecting to our daemon
        let permissions = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(&self.socket_path, permissions).map_err(|e| {
            warn!("Failed to set socket permissions: {}", e);
            ArgonError::Ipc(format!("Failed to set socket permissions: {}", e))
        })?;

        info!("IPC server listening on {:?}", self.socket_path);
        self.listener = Some(listener);

        Ok(())
    }

    /// Get a receiver for shutdown signals
    pub fn shutdown_receiver(&self) -> broadcast::Receiver<()> {
        self.shutdown_tx.subscribe()
    }

    /// Accept connections until a stop command arrives
    pub async fn run(&self) -> Result<()> {
        let listener = self
            .listener
            .as_ref()
            .ok_or_else(|| ArgonError::Ipc("Server not started".into()))?;

        let mut shutdown_rx = self.shutdown_tx.subscribe();

        loop {
            tokio::select! {
                _ = shutdown_rx.recv() => {
                    info!("IPC server shutting down");
                    return Ok(());
                }
                accepted = listener.accept() => {
                    match accepted {
                        Ok((stream, _addr)) => {
                            debug!("IPC client connected");
                            let handler = ConnectionHandler {
                                coalescer: Arc::clone(&self.coalescer),
                                shutdown_tx: self.shutdown_tx.clone(),
                                start_time: self.start_time,
                            };
                            tokio::spawn(handler.handle(stream));
                        }
                        Err(e) => {
                            error!("Failed to accept connection: {}", e);
                        }
                    }
                }
            }
        }
    }

    /// Clean up the socket file
    pub fn cleanup(&self) {
        if self.socket_path.exists() {
            if let Err(e) = std::fs::remove_file(&self.socket_path) {
                warn!("Failed to remove socket file: {}", e);
            } else {
                debug!("Removed socket file {:?}", self.socket_path);
            }
        }
    }
}

impl Drop for IpcServer {
    fn drop(&mut self) {
        self.cleanup();
    }
}

/// Per-connection state, one caller session per connection
struct ConnectionHandler {
    coalescer: Arc<SourceCoalescer>,
    shutdown_tx: broadcast::Sender<()>,
    start_time: Instant,
}

impl ConnectionHandler {
    async fn handle(self, stream: UnixStream) {
        let (reader, mut writer) = stream.into_split();
        let mut reader = BufReader::new(reader);
        let mut line = String::new();

        loop {
            line.clear();
            match reader.read_line(&mut line).await {
                Ok(0) => {
                    debug!("IPC client disconnected");
                    return;
                }
                Ok(_) => {
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        continue;
                    }

                    let msg = match IpcMessage::from_bytes(trimmed.as_bytes()) {
                        Ok(msg) => msg,
                        Err(e) => {
                            warn!("Invalid IPC message: {}", e);
                            let response = IpcResponse::error(format!("Invalid message: {}", e));
                            if !send_response(&mut writer, &response).await {
                                return;
                            }
                            continue;
                        }
                    };

                    match msg {
                        IpcMessage::Ping => {
                            if !send_response(&mut writer, &IpcResponse::Pong).await {
                                return;
                            }
                        }
                        IpcMessage::Status => {
                            let status = DaemonStatus {
                                pid: std::process::id(),
                                uptime_seconds: self.start_time.elapsed().as_secs_f64(),
                                in_flight: self.coalescer.in_flight(),
                            };
                            if !send_response(&mut writer, &IpcResponse::Status(status)).await {
                                return;
                            }
                        }
                        IpcMessage::Stop => {
                            info!("Received stop command via IPC");
                            let _ = send_response(&mut writer, &IpcResponse::Stopping).await;
                            let _ = self.shutdown_tx.send(());
                            return;
                        }
                        IpcMessage::Sources { options } => {
                            if !self.handle_sources(options, &mut reader, &mut writer).await {
                                return;
                            }
                        }
                    }
                }
                Err(e) => {
                    error!("Error reading from IPC client: {}", e);
                    return;
                }
            }
        }
    }

    /// Run one enumeration request for this connection
    ///
    /// Waits for the shared outcome while watching the read side: the
    /// connection closing before settlement is the caller's teardown
    /// notification, which cancels the session this connection
    /// originated (joined enumerations carry no guard and are left to
    /// their originator). Returns false when the connection is done.
    async fn handle_sources(
        &self,
        options: SourceOptions,
        reader: &mut BufReader<OwnedReadHalf>,
        writer: &mut OwnedWriteHalf,
    ) -> bool {
        let mut request = self.coalescer.request(options);
        let guard = request.take_cancel_guard();
        let pending = request.pending().clone();

        let mut probe = String::new();
        let outcome = loop {
            tokio::select! {
                outcome = pending.wait() => break Some(outcome),
                read = reader.read_line(&mut probe) => match read {
                    Ok(0) | Err(_) => break None,
                    Ok(_) => {
                        warn!("ignoring client input while enumeration is in flight");
                        probe.clear();
                    }
                }
            }
        };

        match outcome {
            Some(Ok(sources)) => {
                send_response(writer, &IpcResponse::Sources { sources }).await
            }
            // Carry the backend's reason string verbatim to the caller.
            Some(Err(ArgonError::Capture(reason))) => {
                send_response(writer, &IpcResponse::error(reason)).await
            }
            Some(Err(e)) => send_response(writer, &IpcResponse::error(e.to_string())).await,
            None => {
                debug!("IPC client disconnected mid-enumeration");
                if let Some(guard) = guard {
                    guard.cancel();
                }
                false
            }
        }
    }
}

async fn send_response(writer: &mut OwnedWriteHalf, response: &IpcResponse) -> bool {
    if let Err(e) = writer.write_all(&response.to_bytes()).await {
        error!("Failed to send IPC response: {}", e);
        return false;
    }
    true
}
