//! Request coalescing for source enumeration
//!
//! N concurrent requests with equal options cause exactly one backend
//! enumeration; every caller shares the same pending outcome. Completed
//! results are not cached: once an enumeration settles and its entry is
//! evicted, an equal request starts fresh.

use std::sync::Arc;
use tracing::debug;

use super::backend::CaptureBackend;
use super::pending::PendingSources;
use super::registry::{Admission, InFlightRegistry};
use super::session::CaptureSession;
use crate::encode::{PngDataUrlEncoder, ThumbnailEncoder};
use crate::error::Result;
use crate::types::{SourceEntry, SourceOptions};

/// Coalesces concurrent equal enumeration requests
pub struct SourceCoalescer {
    backend: Arc<dyn CaptureBackend>,
    encoder: Arc<dyn ThumbnailEncoder>,
    registry: Arc<InFlightRegistry>,
}

impl SourceCoalescer {
    /// Create a coalescer over `backend` with the default PNG data-URL
    /// thumbnail encoder
    pub fn new(backend: Arc<dyn CaptureBackend>) -> Self {
        Self::with_encoder(backend, Arc::new(PngDataUrlEncoder))
    }

    /// Create a coalescer with a custom thumbnail encoder
    pub fn with_encoder(
        backend: Arc<dyn CaptureBackend>,
        encoder: Arc<dyn ThumbnailEncoder>,
    ) -> Self {
        Self {
            backend,
            encoder,
            registry: Arc::new(InFlightRegistry::new()),
        }
    }

    /// Request an enumeration for `options`
    ///
    /// Never suspends. Joins an in-flight enumeration with equal options
    /// if one exists; otherwise starts a new backend enumeration and
    /// registers it. Only the request that started the enumeration
    /// carries a [`CancelGuard`]; wiring it to the caller's teardown
    /// notification is the transport's job.
    pub fn request(&self, options: SourceOptions) -> SourceRequest {
        match self.registry.admit(&options) {
            Admission::Joined(pending) => {
                debug!(%options, "joining in-flight enumeration");
                SourceRequest {
                    pending,
                    cancel: None,
                }
            }
            Admission::Started {
                entry,
                pending,
                settler,
            } => {
                debug!(%options, %entry, "starting enumeration");
                let session = CaptureSession::new(
                    settler,
                    Arc::clone(&self.encoder),
                    Arc::clone(&self.registry),
                    entry,
                );
                self.backend
                    .start_enumeration(options, Arc::clone(&session));
                SourceRequest {
                    pending,
                    cancel: Some(CancelGuard { session }),
                }
            }
        }
    }

    /// Number of enumerations currently in flight
    pub fn in_flight(&self) -> usize {
        self.registry.len()
    }
}

/// Handle returned by [`SourceCoalescer::request`]
pub struct SourceRequest {
    pending: PendingSources,
    cancel: Option<CancelGuard>,
}

impl SourceRequest {
    /// The shared settlement handle; clone it to attach more waiters
    pub fn pending(&self) -> &PendingSources {
        &self.pending
    }

    /// Whether this request started the underlying enumeration rather
    /// than joining one already in flight
    pub fn is_originator(&self) -> bool {
        self.cancel.is_some()
    }

    /// Take the cancellation hook; present only on the originating
    /// request, and only once
    pub fn take_cancel_guard(&mut self) -> Option<CancelGuard> {
        self.cancel.take()
    }

    /// Wait for the outcome to settle
    pub async fn wait(&self) -> Result<Vec<SourceEntry>> {
        self.pending.wait().await
    }
}

/// Severs a session's ability to deliver its result
///
/// Wired to the originating caller's teardown notification. Invoking it
/// after the session reached a terminal state is a no-op; dropping it
/// unused cancels nothing.
pub struct CancelGuard {
    session: Arc<CaptureSession>,
}

impl CancelGuard {
    /// Cancel the session this guard controls
    pub fn cancel(&self) {
        self.session.cancel();
    }
}
