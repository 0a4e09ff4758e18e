//! Argon Core Library
//!
//! Coalesced enumeration of capturable screen and window sources for
//! screen sharing.
//!
//! This library provides:
//! - Request coalescing: concurrent requests with equal options share a
//!   single underlying enumeration and its result
//! - Capture session adapters with one-shot terminal signals and
//!   caller-driven cancellation
//! - Thumbnail encoding into transportable PNG data URLs
//! - Unix-socket IPC for daemon mode
//!
//! # Architecture
//!
//! ```text
//! ┌─────────┐    ┌──────────────────┐    ┌─────────────────┐
//! │ Callers │───▶│ SourceCoalescer  │───▶│ CaptureBackend  │
//! │ (IPC)   │◀───│ (in-flight set)  │◀───│ (portal)        │
//! └─────────┘    └──────────────────┘    └─────────────────┘
//! ```
//!
//! Requests join an in-flight enumeration when one with equal options
//! exists; otherwise a new [`capture::CaptureSession`] is started and
//! registered. The backend's single terminal signal settles the shared
//! outcome and evicts the entry.

pub mod capture;
pub mod config;
pub mod encode;
pub mod error;
pub mod ipc;
pub mod types;

pub use capture::{CaptureBackend, PortalBackend, SourceCoalescer};
pub use error::{ArgonError, Result};
pub use types::{SourceEntry, SourceOptions, ThumbnailSize};
