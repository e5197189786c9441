//! The storage trait the registry is written against.

use insignia_core::{CredentialId, CredentialRecord, Principal, RegistryEvent, SequencedEvent};

use crate::error::StorageError;

/// Persistent state behind the registry: the credential table, the
/// authorized-issuer set, the fixed admin identity, and the append-only
/// audit event log.
///
/// Implementations must be thread-safe (`Send + Sync`). Each individual
/// method call is atomic and crash-consistent; the registry itself
/// serializes mutating operations, so no method needs to coordinate
/// multi-call transactions.
///
/// The `*_with_event` methods pair a state mutation with its audit event
/// in one atomic write: either both land or neither does. They return the
/// sequence number the event was appended at. This is what keeps failed
/// operations from leaving a mutation behind without its event (or the
/// other way around).
pub trait CredentialStore: Send + Sync {
    /// Look up a credential record by identifier.
    fn get_credential(&self, id: &CredentialId) -> Result<Option<CredentialRecord>, StorageError>;

    /// Insert a credential record and append its issuance event, atomically,
    /// only if the identifier is not yet taken.
    ///
    /// Returns `None` without writing anything when a record already exists
    /// at `id`. Records are never overwritten through this method.
    fn insert_credential_with_event(
        &self,
        id: &CredentialId,
        record: &CredentialRecord,
        event: &RegistryEvent,
    ) -> Result<Option<u64>, StorageError>;

    /// Replace an existing credential record and append the corresponding
    /// event, atomically.
    ///
    /// The registry uses this only to clear the one-way `active` flag;
    /// the record at `id` must already exist.
    fn update_credential_with_event(
        &self,
        id: &CredentialId,
        record: &CredentialRecord,
        event: &RegistryEvent,
    ) -> Result<u64, StorageError>;

    /// Whether a principal is in the authorized-issuer set.
    fn is_issuer_authorized(&self, issuer: &Principal) -> Result<bool, StorageError>;

    /// Add a principal to the authorized-issuer set without an event.
    /// Used only to seed the admin at first initialization. Idempotent.
    fn put_issuer(&self, issuer: &Principal) -> Result<(), StorageError>;

    /// Add a principal to the authorized-issuer set and append the
    /// corresponding event, atomically. Idempotent on the set.
    fn put_issuer_with_event(
        &self,
        issuer: &Principal,
        event: &RegistryEvent,
    ) -> Result<u64, StorageError>;

    /// Remove a principal from the authorized-issuer set and append the
    /// corresponding event, atomically. Idempotent on the set.
    fn remove_issuer_with_event(
        &self,
        issuer: &Principal,
        event: &RegistryEvent,
    ) -> Result<u64, StorageError>;

    /// The admin identity, if the store has been initialized.
    fn admin(&self) -> Result<Option<Principal>, StorageError>;

    /// Record the admin identity. Written exactly once, at first
    /// initialization; the identity is immutable afterwards.
    fn put_admin(&self, admin: &Principal) -> Result<(), StorageError>;

    /// Append an event with no paired mutation (e.g. a no-op revocation)
    /// and return its sequence number. Sequence numbers start at zero and
    /// are dense and strictly increasing.
    fn append_event(&self, event: &RegistryEvent) -> Result<u64, StorageError>;

    /// Replay the full audit log in sequence order.
    fn events(&self) -> Result<Vec<SequencedEvent>, StorageError>;
}
