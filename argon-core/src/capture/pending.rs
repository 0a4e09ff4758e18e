//! Single-settlement delivery of enumeration outcomes
//!
//! A [`PendingSources`] is shared by every caller coalesced onto one
//! underlying enumeration. It settles at most once; the write side is a
//! [`Settler`] consumed by value, so only one settlement can ever happen.

use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::Notify;

use crate::error::{ArgonError, Result};
use crate::types::SourceEntry;

/// Final outcome of one underlying enumeration
pub(crate) type Outcome = std::result::Result<Vec<SourceEntry>, String>;

struct Slot {
    outcome: Mutex<Option<Outcome>>,
    settled: Notify,
}

/// Shared handle to a not-yet-settled enumeration outcome
///
/// Clones observe the same settlement. Consumers may attach before or
/// after the outcome settles.
#[derive(Clone)]
pub struct PendingSources {
    slot: Arc<Slot>,
}

impl PendingSources {
    pub(crate) fn new() -> (Self, Settler) {
        let slot = Arc::new(Slot {
            outcome: Mutex::new(None),
            settled: Notify::new(),
        });
        (
            Self {
                slot: Arc::clone(&slot),
            },
            Settler { slot },
        )
    }

    /// Wait until the underlying enumeration settles
    ///
    /// If the originating caller's session was cancelled before a
    /// terminal signal arrived, the outcome never settles and this
    /// future stays pending; callers that cannot tolerate that apply
    /// their own timeout.
    pub async fn wait(&self) -> Result<Vec<SourceEntry>> {
        let notified = self.slot.settled.notified();
        tokio::pin!(notified);
        loop {
            // Register interest before checking, so a settlement racing
            // with the check cannot be missed.
            notified.as_mut().enable();
            if let Some(outcome) = self.slot.outcome.lock().clone() {
                return outcome.map_err(ArgonError::Capture);
            }
            notified.as_mut().await;
            notified.set(self.slot.settled.notified());
        }
    }

    /// Whether the outcome has settled
    pub fn is_settled(&self) -> bool {
        self.slot.outcome.lock().is_some()
    }

    /// The settled outcome, without waiting
    pub fn try_outcome(&self) -> Option<Result<Vec<SourceEntry>>> {
        self.slot
            .outcome
            .lock()
            .clone()
            .map(|outcome| outcome.map_err(ArgonError::Capture))
    }
}

/// Write side of a [`PendingSources`]
///
/// Consumed on settlement. Dropping it without settling severs delivery
/// permanently: every waiter stays pending.
pub(crate) struct Settler {
    slot: Arc<Slot>,
}

impl Settler {
    pub(crate) fn settle(self, outcome: Outcome) {
        *self.slot.outcome.lock() = Some(outcome);
        self.slot.settled.notify_waiters();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_waiter_sees_settlement() {
        let (pending, settler) = PendingSources::new();
        let waiter = {
            let pending = pending.clone();
            tokio::spawn(async move { pending.wait().await })
        };
        settler.settle(Ok(Vec::new()));
        let sources = waiter.await.unwrap().unwrap();
        assert!(sources.is_empty());
    }

    #[tokio::test]
    async fn test_late_consumer_sees_settled_outcome() {
        let (pending, settler) = PendingSources::new();
        settler.settle(Err("permission-denied".into()));
        assert!(pending.is_settled());
        assert!(pending.try_outcome().unwrap().is_err());
        let err = pending.wait().await.unwrap_err();
        assert!(matches!(err, ArgonError::Capture(reason) if reason == "permission-denied"));
    }

    #[tokio::test]
    async fn test_dropped_settler_never_settles() {
        let (pending, settler) = PendingSources::new();
        drop(settler);
        let waited =
            tokio::time::timeout(Duration::from_millis(50), pending.wait()).await;
        assert!(waited.is_err());
        assert!(!pending.is_settled());
    }
}
