//! Error types for Argon

use thiserror::Error;

/// Result type alias using ArgonError
pub type Result<T> = std::result::Result<T, ArgonError>;

/// Main error type for Argon operations
#[derive(Debug, Error)]
pub enum ArgonError {
    /// Portal/D-Bus communication error
    #[error("Portal error: {0}")]
    Portal(String),

    /// Enumeration failure reported by the capture backend
    #[error("Capture error: {0}")]
    Capture(String),

    /// Thumbnail encoding error
    #[error("Encode error: {0}")]
    Encode(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IPC transport error
    #[error("IPC error: {0}")]
    Ipc(String),

    /// Daemon socket not present
    #[error("No running argon daemon")]
    NoActiveDaemon,

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<ArgonError>,
    },
}

impl ArgonError {
    /// Create a portal error
    pub fn portal(msg: impl Into<String>) -> Self {
        Self::Portal(msg.into())
    }

    /// Create a capture error
    pub fn capture(msg: impl Into<String>) -> Self {
        Self::Capture(msg.into())
    }

    /// Create an encode error
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an IPC error
    pub fn ipc(msg: impl Into<String>) -> Self {
        Self::Ipc(msg.into())
    }

    /// Add context to an error
    pub fn with_context(self, context: impl Into<String>) -> Self {
        Self::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }
}

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

// Conversions from external error types

impl From<ashpd::Error> for ArgonError {
    fn from(err: ashpd::Error) -> Self {
        Self::Portal(err.to_string())
    }
}

impl From<zbus::Error> for ArgonError {
    fn from(err: zbus::Error) -> Self {
        Self::Portal(format!("D-Bus error: {}", err))
    }
}
