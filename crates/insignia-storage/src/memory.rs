//! In-memory credential store for tests and development.

use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};

use insignia_core::{CredentialId, CredentialRecord, Principal, RegistryEvent, SequencedEvent};

use crate::error::StorageError;
use crate::store::CredentialStore;

/// In-memory [`CredentialStore`] backed by a single `RwLock`.
///
/// One lock covers all four tables, so every trait method is trivially
/// atomic, including the combined mutation-plus-event writes. Nothing is
/// persisted; all state is lost when the store drops.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    credentials: HashMap<CredentialId, CredentialRecord>,
    issuers: HashSet<Principal>,
    admin: Option<Principal>,
    events: Vec<RegistryEvent>,
}

impl Inner {
    fn push_event(&mut self, event: &RegistryEvent) -> u64 {
        let seq = self.events.len() as u64;
        self.events.push(event.clone());
        seq
    }
}

impl MemoryStore {
    /// Create an empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored credential records.
    pub fn credential_count(&self) -> usize {
        self.inner.read().credentials.len()
    }
}

impl CredentialStore for MemoryStore {
    fn get_credential(&self, id: &CredentialId) -> Result<Option<CredentialRecord>, StorageError> {
        Ok(self.inner.read().credentials.get(id).cloned())
    }

    fn insert_credential_with_event(
        &self,
        id: &CredentialId,
        record: &CredentialRecord,
        event: &RegistryEvent,
    ) -> Result<Option<u64>, StorageError> {
        let mut inner = self.inner.write();
        if inner.credentials.contains_key(id) {
            return Ok(None);
        }
        inner.credentials.insert(*id, record.clone());
        Ok(Some(inner.push_event(event)))
    }

    fn update_credential_with_event(
        &self,
        id: &CredentialId,
        record: &CredentialRecord,
        event: &RegistryEvent,
    ) -> Result<u64, StorageError> {
        let mut inner = self.inner.write();
        match inner.credentials.get_mut(id) {
            Some(existing) => *existing = record.clone(),
            None => return Err(StorageError::Corrupt(id.to_string())),
        }
        Ok(inner.push_event(event))
    }

    fn is_issuer_authorized(&self, issuer: &Principal) -> Result<bool, StorageError> {
        Ok(self.inner.read().issuers.contains(issuer))
    }

    fn put_issuer(&self, issuer: &Principal) -> Result<(), StorageError> {
        self.inner.write().issuers.insert(issuer.clone());
        Ok(())
    }

    fn put_issuer_with_event(
        &self,
        issuer: &Principal,
        event: &RegistryEvent,
    ) -> Result<u64, StorageError> {
        let mut inner = self.inner.write();
        inner.issuers.insert(issuer.clone());
        Ok(inner.push_event(event))
    }

    fn remove_issuer_with_event(
        &self,
        issuer: &Principal,
        event: &RegistryEvent,
    ) -> Result<u64, StorageError> {
        let mut inner = self.inner.write();
        inner.issuers.remove(issuer);
        Ok(inner.push_event(event))
    }

    fn admin(&self) -> Result<Option<Principal>, StorageError> {
        Ok(self.inner.read().admin.clone())
    }

    fn put_admin(&self, admin: &Principal) -> Result<(), StorageError> {
        self.inner.write().admin = Some(admin.clone());
        Ok(())
    }

    fn append_event(&self, event: &RegistryEvent) -> Result<u64, StorageError> {
        Ok(self.inner.write().push_event(event))
    }

    fn events(&self) -> Result<Vec<SequencedEvent>, StorageError> {
        Ok(self
            .inner
            .read()
            .events
            .iter()
            .enumerate()
            .map(|(i, event)| SequencedEvent {
                seq: i as u64,
                event: event.clone(),
            })
            .collect())
    }
}
