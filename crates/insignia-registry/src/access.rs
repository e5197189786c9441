//! Access control: the admin identity and the authorized-issuer set.
//!
//! Authorization is a flat single-admin hierarchy. There are no delegation
//! chains: the admin manages the issuer set, issuers issue credentials,
//! and nothing else grants rights.

use std::sync::Arc;

use insignia_core::{Principal, RegistryEvent};
use insignia_storage::CredentialStore;

use crate::audit::AuditLog;
use crate::error::RegistryError;

/// Gates every mutating registry operation.
///
/// The admin identity is fixed at initialization and is implicitly a member
/// of the authorized-issuer set regardless of what the store says.
pub struct AccessControl {
    store: Arc<dyn CredentialStore>,
    admin: Principal,
    audit: AuditLog,
}

impl AccessControl {
    pub(crate) fn new(store: Arc<dyn CredentialStore>, admin: Principal, audit: AuditLog) -> Self {
        Self {
            store,
            admin,
            audit,
        }
    }

    /// The fixed admin identity.
    pub fn admin(&self) -> &Principal {
        &self.admin
    }

    /// Whether a principal may issue credentials. Never fails: a storage
    /// fault reads as "not authorized" and is logged.
    pub fn is_authorized_issuer(&self, issuer: &Principal) -> bool {
        if issuer == &self.admin {
            return true;
        }
        self.store.is_issuer_authorized(issuer).unwrap_or_else(|e| {
            tracing::warn!(issuer = %issuer, error = %e, "issuer lookup failed");
            false
        })
    }

    /// Guard: the caller must be the admin.
    pub(crate) fn require_admin(&self, caller: &Principal) -> Result<(), RegistryError> {
        if caller != &self.admin {
            return Err(RegistryError::Unauthorized(format!(
                "caller {} is not the admin",
                caller
            )));
        }
        Ok(())
    }

    /// Guard: the caller must be an authorized issuer.
    pub(crate) fn require_issuer(&self, caller: &Principal) -> Result<(), RegistryError> {
        if !self.is_authorized_issuer(caller) {
            return Err(RegistryError::Unauthorized(format!(
                "caller {} is not an authorized issuer",
                caller
            )));
        }
        Ok(())
    }

    /// Add an issuer to the authorized set. Admin-only; idempotent.
    pub(crate) fn authorize_issuer(
        &self,
        caller: &Principal,
        issuer: &Principal,
    ) -> Result<(), RegistryError> {
        self.require_admin(caller)?;

        let event = RegistryEvent::IssuerAuthorized {
            issuer: issuer.clone(),
        };
        let seq = self.store.put_issuer_with_event(issuer, &event)?;
        self.audit.notify(seq, event);
        tracing::info!(issuer = %issuer, "issuer authorized");
        Ok(())
    }

    /// Remove an issuer from the authorized set. Admin-only; idempotent.
    /// The admin's own issuer status can never be revoked.
    pub(crate) fn revoke_issuer(
        &self,
        caller: &Principal,
        issuer: &Principal,
    ) -> Result<(), RegistryError> {
        self.require_admin(caller)?;
        if issuer == &self.admin {
            return Err(RegistryError::InvariantViolation(
                "the admin's issuer status cannot be revoked".into(),
            ));
        }

        let event = RegistryEvent::IssuerRevoked {
            issuer: issuer.clone(),
        };
        let seq = self.store.remove_issuer_with_event(issuer, &event)?;
        self.audit.notify(seq, event);
        tracing::info!(issuer = %issuer, "issuer revoked");
        Ok(())
    }
}
