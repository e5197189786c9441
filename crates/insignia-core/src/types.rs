use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::CoreError;

/// Identity of a caller in the registry: the admin, an issuer, or a holder.
///
/// Opaque to the registry itself; the hosting environment's authentication
/// layer is responsible for establishing who the caller actually is.
/// Construction and deserialization both reject the empty identifier, so a
/// `Principal` in hand is always usable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Principal(String);

impl Principal {
    /// Create a new principal. The identifier must be non-empty.
    pub fn new(id: impl Into<String>) -> Result<Self, CoreError> {
        let id = id.into();
        if id.is_empty() {
            return Err(CoreError::InvalidPrincipal(
                "principal identifier must not be empty".into(),
            ));
        }
        Ok(Self(id))
    }

    /// Get the principal identifier string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Principal {
    type Error = CoreError;

    fn try_from(id: String) -> Result<Self, Self::Error> {
        Self::new(id)
    }
}

impl From<Principal> for String {
    fn from(principal: Principal) -> Self {
        principal.0
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 32-byte digest of the image evidence a credential is bound to.
///
/// The registry does not hash images itself; callers supply the digest.
/// The all-zero digest is reserved as "no image" and rejected at issuance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageHash([u8; 32]);

impl ImageHash {
    /// The all-zero digest. Never valid for issuance.
    pub const ZERO: ImageHash = ImageHash([0u8; 32]);

    /// Wrap a raw 32-byte digest.
    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Parse a digest from a 64-character hex string.
    pub fn from_hex(s: &str) -> Result<Self, CoreError> {
        let bytes = hex::decode(s)
            .map_err(|e| CoreError::InvalidDigest(format!("invalid hex: {}", e)))?;
        let bytes: [u8; 32] = bytes
            .try_into()
            .map_err(|_| CoreError::InvalidDigest("digest must be 32 bytes".into()))?;
        Ok(Self(bytes))
    }

    /// Get the raw digest bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Whether this is the reserved all-zero digest.
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }
}

impl fmt::Display for ImageHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

/// Deterministic lookup key for a credential.
///
/// Derived as a BLAKE3 digest over the credential's issuance context:
/// image hash, holder, issuer, and the issuance timestamp. The same inputs
/// always produce the same identifier, which is how duplicate issuance is
/// detected and rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CredentialId([u8; 32]);

/// Domain separator for credential identifier derivation.
const ID_DOMAIN: &[u8] = b"insignia:credential:v1";

impl CredentialId {
    /// Derive the identifier for a credential issued with these inputs.
    ///
    /// Variable-length fields are length-prefixed so that distinct
    /// (holder, issuer) pairs can never produce the same preimage.
    pub fn derive(
        image_hash: &ImageHash,
        holder: &Principal,
        issuer: &Principal,
        issued_at: DateTime<Utc>,
    ) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(ID_DOMAIN);
        hasher.update(image_hash.as_bytes());
        hasher.update(&(holder.as_str().len() as u64).to_be_bytes());
        hasher.update(holder.as_str().as_bytes());
        hasher.update(&(issuer.as_str().len() as u64).to_be_bytes());
        hasher.update(issuer.as_str().as_bytes());
        hasher.update(&issued_at.timestamp_micros().to_be_bytes());
        Self(*hasher.finalize().as_bytes())
    }

    /// Wrap raw identifier bytes (e.g. read back from storage keys).
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Parse an identifier from a 64-character hex string.
    pub fn from_hex(s: &str) -> Result<Self, CoreError> {
        let bytes = hex::decode(s)
            .map_err(|e| CoreError::InvalidDigest(format!("invalid hex: {}", e)))?;
        let bytes: [u8; 32] = bytes
            .try_into()
            .map_err(|_| CoreError::InvalidDigest("identifier must be 32 bytes".into()))?;
        Ok(Self(bytes))
    }

    /// Get the raw identifier bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for CredentialId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}
