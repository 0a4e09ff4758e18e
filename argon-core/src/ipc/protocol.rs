//! IPC protocol definitions
//!
//! Defines the message types used for communication between the daemon
//! and CLI or embedding clients.

use serde::{Deserialize, Serialize};

use crate::types::{SourceEntry, SourceOptions};

/// Messages that can be sent to the daemon
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum IpcMessage {
    /// Check if daemon is alive
    Ping,
    /// Enumerate capturable sources with the given options
    Sources { options: SourceOptions },
    /// Request current status
    Status,
    /// Stop the daemon gracefully
    Stop,
}

/// Responses from the daemon
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum IpcResponse {
    /// Pong response to ping
    Pong,
    /// Enumerated sources
    Sources { sources: Vec<SourceEntry> },
    /// Error response
    Error { message: String },
    /// Status response
    Status(DaemonStatus),
    /// Shutdown acknowledgment
    Stopping,
}

/// Current daemon status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaemonStatus {
    /// Process ID
    pub pid: u32,
    /// Uptime in seconds
    pub uptime_seconds: f64,
    /// Enumerations currently in flight
    pub in_flight: usize,
}

impl IpcMessage {
    /// Serialize message to JSON bytes with newline terminator
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = serde_json::to_vec(self).unwrap_or_default();
        bytes.push(b'\n');
        bytes
    }

    /// Deserialize message from JSON bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }
}

impl IpcResponse {
    /// Serialize response to JSON bytes with newline terminator
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = serde_json::to_vec(self).unwrap_or_default();
        bytes.push(b'\n');
        bytes
    }

    /// Deserialize response from JSON bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    /// Create an error response
    pub fn error(message: impl Into<String>) -> Self {
        IpcResponse::Error {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{SourceOptions, ThumbnailSize};

    #[test]
    fn test_message_serialization() {
        let msg = IpcMessage::Sources {
            options: SourceOptions::all(ThumbnailSize::new(150, 150)),
        };
        let bytes = msg.to_bytes();
        let parsed = IpcMessage::from_bytes(&bytes[..bytes.len() - 1]).unwrap();
        assert!(matches!(parsed, IpcMessage::Sources { .. }));
    }

    #[test]
    fn test_response_serialization() {
        let resp = IpcResponse::Pong;
        let bytes = resp.to_bytes();
        let parsed = IpcResponse::from_bytes(&bytes[..bytes.len() - 1]).unwrap();
        assert!(matches!(parsed, IpcResponse::Pong));
    }
}
