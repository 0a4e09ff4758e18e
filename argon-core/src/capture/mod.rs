//! Coalesced enumeration of capturable sources
//!
//! This module handles:
//! - Request coalescing: concurrent requests with equal options share
//!   one underlying enumeration and its eventual result
//! - Session adapters around each backend enumeration, with one-shot
//!   terminal signals and caller-driven cancellation
//! - The backend seam to the xdg-desktop-portal

pub mod backend;
pub mod coalesce;
pub mod pending;
pub mod session;

mod registry;

pub use backend::{CaptureBackend, PortalBackend};
pub use coalesce::{CancelGuard, SourceCoalescer, SourceRequest};
pub use pending::PendingSources;
pub use session::CaptureSession;
