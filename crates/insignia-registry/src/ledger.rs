//! The credential ledger: issuance, lookup, revocation, liveness queries.

use chrono::{DateTime, Utc};
use std::sync::Arc;

use insignia_core::{CredentialId, CredentialRecord, ImageHash, Principal, RegistryEvent};
use insignia_storage::CredentialStore;

use crate::audit::AuditLog;
use crate::clock::Clock;
use crate::error::RegistryError;

/// Owns the durable credential table.
///
/// Authorization is checked by the caller ([`crate::MembershipRegistry`])
/// before mutating methods run; the ledger itself handles input validation,
/// identifier derivation, and the record lifecycle. Mutating methods assume
/// the registry's writer lock is held.
pub struct CredentialLedger {
    store: Arc<dyn CredentialStore>,
    audit: AuditLog,
    clock: Arc<dyn Clock>,
}

impl CredentialLedger {
    pub(crate) fn new(
        store: Arc<dyn CredentialStore>,
        audit: AuditLog,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            audit,
            clock,
        }
    }

    /// Issue a membership credential and return its identifier.
    ///
    /// Validates the inputs, derives the identifier from
    /// (image_hash, holder, issuer, now), and refuses to overwrite an
    /// existing record: a duplicate derivation is a [`RegistryError::Conflict`]
    /// and leaves state untouched.
    pub(crate) fn issue(
        &self,
        issuer: &Principal,
        image_hash: ImageHash,
        holder: &Principal,
        expires_at: DateTime<Utc>,
    ) -> Result<CredentialId, RegistryError> {
        if image_hash.is_zero() {
            return Err(RegistryError::Validation(
                "image hash must not be zero".into(),
            ));
        }
        let now = self.clock.now();
        if expires_at <= now {
            return Err(RegistryError::Validation(
                "expiry must be strictly in the future".into(),
            ));
        }

        let id = CredentialId::derive(&image_hash, holder, issuer, now);
        let record = CredentialRecord {
            image_hash,
            holder: holder.clone(),
            issuer: issuer.clone(),
            issued_at: now,
            expires_at,
            active: true,
        };

        let event = RegistryEvent::MembershipIssued {
            id,
            holder: holder.clone(),
            issuer: issuer.clone(),
        };
        // One atomic store write covers the record and its event.
        match self.store.insert_credential_with_event(&id, &record, &event)? {
            Some(seq) => self.audit.notify(seq, event),
            None => return Err(RegistryError::Conflict(id)),
        }
        tracing::info!(
            credential = %id,
            holder = %holder,
            issuer = %issuer,
            expires = %expires_at,
            "membership issued"
        );
        Ok(id)
    }

    /// Fetch the full record for a credential.
    pub fn get(&self, id: &CredentialId) -> Result<CredentialRecord, RegistryError> {
        self.store
            .get_credential(id)?
            .ok_or(RegistryError::NotFound(*id))
    }

    /// Revoke a credential: clear its `active` flag, one-way.
    ///
    /// Only the credential's issuer or the admin may revoke. Revoking an
    /// already-revoked credential is a no-op success.
    pub(crate) fn revoke(
        &self,
        caller: &Principal,
        id: &CredentialId,
        admin: &Principal,
    ) -> Result<(), RegistryError> {
        let mut record = self.get(id)?;
        if caller != &record.issuer && caller != admin {
            return Err(RegistryError::Unauthorized(format!(
                "caller {} may not revoke credential {}",
                caller, id
            )));
        }

        let event = RegistryEvent::MembershipRevoked { id: *id };
        if record.active {
            record.active = false;
            let seq = self.store.update_credential_with_event(id, &record, &event)?;
            self.audit.notify(seq, event);
        } else {
            // No state to touch; the repeat revocation is still logged.
            self.audit.record(event)?;
        }
        tracing::info!(credential = %id, caller = %caller, "membership revoked");
        Ok(())
    }

    /// Whether a credential is currently active: exists, not revoked, not
    /// yet expired. Never fails; a storage fault reads as inactive.
    pub fn is_active(&self, id: &CredentialId) -> bool {
        match self.store.get_credential(id) {
            Ok(Some(record)) => record.is_valid_at(self.clock.now()),
            Ok(None) => false,
            Err(e) => {
                tracing::warn!(credential = %id, error = %e, "credential lookup failed");
                false
            }
        }
    }
}
