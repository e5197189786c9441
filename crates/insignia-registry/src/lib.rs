//! Insignia Registry — Tamper-evident membership credentials: issuance,
//! verification, and revocation, gated by a single-admin issuer scheme.
//!
//! [`MembershipRegistry`] is the composition root. Every mutating call
//! passes through access control and then the ledger under one writer
//! lock; queries go straight to the ledger or verification engine and
//! never block on writers.

pub mod access;
pub mod audit;
pub mod clock;
pub mod error;
pub mod ledger;
pub mod verifier;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::broadcast;

use insignia_core::{
    CredentialId, CredentialRecord, ImageHash, Principal, RegistryConfig, SequencedEvent,
};
use insignia_storage::CredentialStore;

pub use access::AccessControl;
pub use audit::AuditLog;
pub use clock::{Clock, ManualClock, MonotonicClock, SystemClock};
pub use error::RegistryError;
pub use ledger::CredentialLedger;
pub use verifier::VerificationEngine;

/// The membership credential registry.
///
/// Owns the access control manager, the credential ledger, and the
/// verification engine over a shared [`CredentialStore`]. Mutating
/// operations are serialized by a single writer lock so authorization is
/// always evaluated against the same state snapshot as the mutation it
/// guards; queries bypass the lock entirely.
pub struct MembershipRegistry {
    access: AccessControl,
    ledger: CredentialLedger,
    verifier: VerificationEngine,
    audit: AuditLog,
    write_lock: Mutex<()>,
}

impl MembershipRegistry {
    /// Open a registry over the given store with the system clock.
    ///
    /// On a fresh store, `config.admin` becomes the admin identity and the
    /// first authorized issuer. On a store that was initialized before, the
    /// persisted admin wins and `config.admin` is ignored: the admin
    /// identity is immutable for the life of the system.
    pub fn open(
        store: Arc<dyn CredentialStore>,
        config: &RegistryConfig,
    ) -> Result<Self, RegistryError> {
        Self::open_with_clock(store, config, Arc::new(SystemClock))
    }

    /// Open a registry with an explicit clock. Tests use this with
    /// [`ManualClock`] to control issuance and expiry timing.
    ///
    /// The clock is wrapped in a [`MonotonicClock`], so registry-observed
    /// time never moves backwards even when the given clock does.
    pub fn open_with_clock(
        store: Arc<dyn CredentialStore>,
        config: &RegistryConfig,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, RegistryError> {
        let clock: Arc<dyn Clock> = Arc::new(MonotonicClock::new(clock));
        let admin = match store.admin()? {
            Some(admin) => {
                tracing::debug!(admin = %admin, "reopened store with existing admin");
                admin
            }
            None => {
                let admin = Principal::new(config.admin.clone())
                    .map_err(|e| RegistryError::Validation(e.to_string()))?;
                store.put_admin(&admin)?;
                store.put_issuer(&admin)?;
                tracing::info!(admin = %admin, "registry initialized");
                admin
            }
        };

        let audit = AuditLog::new(Arc::clone(&store), config.event_capacity);
        let access = AccessControl::new(Arc::clone(&store), admin, audit.clone());
        let ledger = CredentialLedger::new(Arc::clone(&store), audit.clone(), Arc::clone(&clock));
        let verifier = VerificationEngine::new(store, clock);

        Ok(Self {
            access,
            ledger,
            verifier,
            audit,
            write_lock: Mutex::new(()),
        })
    }

    /// The fixed admin identity.
    pub fn admin(&self) -> &Principal {
        self.access.admin()
    }

    /// Issue a membership credential bound to `image_hash` for `holder`.
    /// The caller must be an authorized issuer.
    pub fn issue_membership(
        &self,
        caller: &Principal,
        image_hash: ImageHash,
        holder: &Principal,
        expires_at: DateTime<Utc>,
    ) -> Result<CredentialId, RegistryError> {
        let _guard = self.write_lock.lock();
        self.access.require_issuer(caller)?;
        self.ledger.issue(caller, image_hash, holder, expires_at)
    }

    /// Fetch the full record for a credential.
    pub fn get_credential(&self, id: &CredentialId) -> Result<CredentialRecord, RegistryError> {
        self.ledger.get(id)
    }

    /// Revoke a membership credential. The caller must be the credential's
    /// issuer or the admin.
    pub fn revoke_membership(
        &self,
        caller: &Principal,
        id: &CredentialId,
    ) -> Result<(), RegistryError> {
        let _guard = self.write_lock.lock();
        self.ledger.revoke(caller, id, self.access.admin())
    }

    /// Whether a credential is currently active. Never fails.
    pub fn is_credential_active(&self, id: &CredentialId) -> bool {
        self.ledger.is_active(id)
    }

    /// Verify a membership claim against the recorded image hash.
    /// Never fails; every failure mode collapses to `false`.
    pub fn verify_membership(&self, id: &CredentialId, image_hash: &ImageHash) -> bool {
        self.verifier.verify_membership(id, image_hash)
    }

    /// Add an issuer to the authorized set. Admin-only.
    pub fn authorize_issuer(
        &self,
        caller: &Principal,
        issuer: &Principal,
    ) -> Result<(), RegistryError> {
        let _guard = self.write_lock.lock();
        self.access.authorize_issuer(caller, issuer)
    }

    /// Remove an issuer from the authorized set. Admin-only; the admin
    /// itself can never be removed.
    pub fn revoke_issuer(
        &self,
        caller: &Principal,
        issuer: &Principal,
    ) -> Result<(), RegistryError> {
        let _guard = self.write_lock.lock();
        self.access.revoke_issuer(caller, issuer)
    }

    /// Whether a principal may issue credentials. Never fails.
    pub fn is_authorized_issuer(&self, issuer: &Principal) -> bool {
        self.access.is_authorized_issuer(issuer)
    }

    /// Subscribe to audit events emitted after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<SequencedEvent> {
        self.audit.subscribe()
    }

    /// Replay the full durable audit log in order.
    pub fn audit_log(&self) -> Result<Vec<SequencedEvent>, RegistryError> {
        self.audit.replay()
    }
}
