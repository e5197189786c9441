use insignia_core::CredentialId;
use insignia_storage::StorageError;

/// Registry operation errors.
///
/// Every mutating operation is all-or-nothing: when any of these is
/// returned, stored state is unchanged and no audit event was emitted.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("credential not found: {0}")]
    NotFound(CredentialId),

    #[error("credential already exists: {0}")]
    Conflict(CredentialId),

    #[error("invariant violation: {0}")]
    InvariantViolation(String),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}
