//! One live binding to an underlying enumeration
//!
//! A [`CaptureSession`] receives exactly one terminal signal from the
//! capture backend: [`finished`](CaptureSession::finished) or
//! [`failed`](CaptureSession::failed). [`cancel`](CaptureSession::cancel)
//! discards the session's ability to deliver a result before either
//! signal arrives.

use parking_lot::Mutex;
use std::sync::Arc;
use tracing::debug;

use super::pending::Settler;
use super::registry::InFlightRegistry;
use crate::encode::ThumbnailEncoder;
use crate::types::{Handle, RawSource, SourceEntry};

/// Adapter around one backend enumeration
///
/// State machine: armed until the first terminal signal, then terminal
/// forever. The armed state (including the one-shot delivery channel)
/// is taken exactly once, so a second signal finds nothing to deliver
/// with and becomes a no-op rather than a double settlement.
pub struct CaptureSession {
    state: Mutex<SessionState>,
}

enum SessionState {
    Armed(Box<Armed>),
    Terminal,
}

struct Armed {
    settler: Settler,
    encoder: Arc<dyn ThumbnailEncoder>,
    registry: Arc<InFlightRegistry>,
    entry: Handle,
}

impl CaptureSession {
    pub(crate) fn new(
        settler: Settler,
        encoder: Arc<dyn ThumbnailEncoder>,
        registry: Arc<InFlightRegistry>,
        entry: Handle,
    ) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(SessionState::Armed(Box::new(Armed {
                settler,
                encoder,
                registry,
                entry,
            }))),
        })
    }

    /// Success signal from the capture backend
    ///
    /// Maps each raw source into its transportable form, preserving the
    /// delivery order. `app_icon` is encoded only when the originating
    /// request asked for icons and the source carried one. Evicts the
    /// registry entry, then settles the shared outcome.
    pub fn finished(&self, sources: Vec<RawSource>, fetch_window_icons: bool) {
        let Some(armed) = self.disarm() else {
            debug!("ignoring finished signal on terminal session");
            return;
        };

        let entries: Vec<SourceEntry> = sources
            .into_iter()
            .map(|source| {
                let app_icon = if fetch_window_icons {
                    source.app_icon.as_ref().map(|icon| armed.encoder.encode(icon))
                } else {
                    None
                };
                SourceEntry {
                    id: source.id,
                    name: source.name,
                    thumbnail: armed.encoder.encode(&source.thumbnail),
                    display_id: source.display_id,
                    app_icon,
                }
            })
            .collect();

        debug!(entry = %armed.entry, count = entries.len(), "enumeration finished");
        armed.registry.remove(armed.entry);
        armed.settler.settle(Ok(entries));
    }

    /// Error signal from the capture backend
    ///
    /// Evicts the registry entry, then settles the shared outcome as a
    /// failure carrying the backend's reason.
    pub fn failed(&self, reason: impl Into<String>) {
        let Some(armed) = self.disarm() else {
            debug!("ignoring failed signal on terminal session");
            return;
        };

        let reason = reason.into();
        debug!(entry = %armed.entry, %reason, "enumeration failed");
        armed.registry.remove(armed.entry);
        armed.settler.settle(Err(reason));
    }

    /// Discard this session's ability to deliver a result
    ///
    /// Invoked when the originating caller's session is torn down before
    /// a terminal signal arrives. Evicts the registry entry immediately
    /// and drops the delivery channel without settling: waiters stay
    /// pending, and any later terminal signal is a no-op. Idempotent.
    pub fn cancel(&self) {
        let Some(armed) = self.disarm() else {
            return;
        };

        debug!(entry = %armed.entry, "enumeration cancelled, severing delivery");
        armed.registry.remove(armed.entry);
        // Settler dropped here without settling.
    }

    /// Whether a terminal signal (or cancellation) already happened
    pub fn is_terminal(&self) -> bool {
        matches!(*self.state.lock(), SessionState::Terminal)
    }

    fn disarm(&self) -> Option<Box<Armed>> {
        match std::mem::replace(&mut *self.state.lock(), SessionState::Terminal) {
            SessionState::Armed(armed) => Some(armed),
            SessionState::Terminal => None,
        }
    }
}
