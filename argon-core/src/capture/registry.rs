//! In-flight enumeration registry
//!
//! Holds at most one entry per distinct [`SourceOptions`] value. Lookup
//! and insertion happen under one lock so two equal concurrent requests
//! can never both miss; removal is keyed by entry identity.

use parking_lot::Mutex;

use super::pending::{PendingSources, Settler};
use crate::types::{Handle, SourceOptions};

struct InFlightEntry {
    entry: Handle,
    options: SourceOptions,
    pending: PendingSources,
}

/// Registry of enumerations currently in flight
#[derive(Default)]
pub(crate) struct InFlightRegistry {
    entries: Mutex<Vec<InFlightEntry>>,
}

/// Result of admitting a request into the registry
pub(crate) enum Admission {
    /// An equivalent enumeration is already in flight
    Joined(PendingSources),
    /// A new entry was registered; the caller owns the settler
    Started {
        entry: Handle,
        pending: PendingSources,
        settler: Settler,
    },
}

impl InFlightRegistry {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Find an in-flight entry with equal options, or register a new one
    pub(crate) fn admit(&self, options: &SourceOptions) -> Admission {
        let mut entries = self.entries.lock();
        if let Some(existing) = entries.iter().find(|e| e.options == *options) {
            return Admission::Joined(existing.pending.clone());
        }

        let (pending, settler) = PendingSources::new();
        let entry = Handle::new();
        entries.push(InFlightEntry {
            entry,
            options: options.clone(),
            pending: pending.clone(),
        });
        Admission::Started {
            entry,
            pending,
            settler,
        }
    }

    /// Remove the entry with the given identity
    ///
    /// Keyed by [`Handle`], not by option equality: only the session
    /// that owns an entry can evict it, and at most once.
    pub(crate) fn remove(&self, entry: Handle) {
        self.entries.lock().retain(|e| e.entry != entry);
    }

    /// Number of entries currently in flight
    pub(crate) fn len(&self) -> usize {
        self.entries.lock().len()
    }
}
