//! Durable audit log with in-process subscription.
//!
//! The store's append-only event log is the source of truth; the broadcast
//! channel is a best-effort live feed on top of it. A slow subscriber can
//! lag and miss broadcasts, but can always catch up by replaying the log.

use std::sync::Arc;
use tokio::sync::broadcast;

use insignia_core::{RegistryEvent, SequencedEvent};
use insignia_storage::CredentialStore;

use crate::error::RegistryError;

/// Append-only audit log over the credential store's event table.
#[derive(Clone)]
pub struct AuditLog {
    store: Arc<dyn CredentialStore>,
    tx: broadcast::Sender<SequencedEvent>,
}

impl AuditLog {
    /// Create an audit log over the given store. `capacity` bounds the
    /// broadcast channel for live subscribers.
    pub fn new(store: Arc<dyn CredentialStore>, capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { store, tx }
    }

    /// Durably append an event with no paired state mutation, then
    /// broadcast it. Returns the assigned sequence number. Mutations pair
    /// their event with the state write inside the store and call
    /// [`AuditLog::notify`] once the combined write has landed.
    pub(crate) fn record(&self, event: RegistryEvent) -> Result<u64, RegistryError> {
        let seq = self.store.append_event(&event)?;
        self.notify(seq, event);
        Ok(seq)
    }

    /// Broadcast an already-durable event to live subscribers.
    pub(crate) fn notify(&self, seq: u64, event: RegistryEvent) {
        tracing::debug!(seq, kind = event.kind(), "audit event recorded");
        // Send fails only when there are no subscribers, which is fine.
        let _ = self.tx.send(SequencedEvent { seq, event });
    }

    /// Subscribe to events emitted after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<SequencedEvent> {
        self.tx.subscribe()
    }

    /// Replay the full durable log in sequence order.
    pub fn replay(&self) -> Result<Vec<SequencedEvent>, RegistryError> {
        Ok(self.store.events()?)
    }
}
