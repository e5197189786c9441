//! The verification engine: stateless membership-validity queries.

use std::sync::Arc;

use insignia_core::{CredentialId, ImageHash};
use insignia_storage::CredentialStore;

use crate::clock::Clock;

/// Read-only evaluator for membership validity.
pub struct VerificationEngine {
    store: Arc<dyn CredentialStore>,
    clock: Arc<dyn Clock>,
}

impl VerificationEngine {
    pub(crate) fn new(store: Arc<dyn CredentialStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Verify a membership claim: the credential exists, is not revoked,
    /// has not expired, and its recorded image hash matches the one
    /// presented.
    ///
    /// Never fails. Absence, revocation, expiry, hash mismatch, and even
    /// internal storage faults all collapse to `false`, so callers cannot
    /// learn whether a given identifier exists.
    pub fn verify_membership(&self, id: &CredentialId, image_hash: &ImageHash) -> bool {
        let record = match self.store.get_credential(id) {
            Ok(Some(record)) => record,
            Ok(None) => return false,
            Err(e) => {
                tracing::warn!(credential = %id, error = %e, "verification lookup failed");
                return false;
            }
        };
        record.is_valid_at(self.clock.now()) && record.image_hash == *image_hash
    }
}
