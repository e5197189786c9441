use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::{ImageHash, Principal};

/// A stored membership credential.
///
/// Records are never deleted. The only mutation the registry ever performs
/// is the one-way `active` flag clear on revocation; expiry is a derived
/// view computed against the query clock and is never written back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialRecord {
    /// Digest of the image evidence the credential is bound to.
    pub image_hash: ImageHash,
    /// Principal the membership was granted to.
    pub holder: Principal,
    /// Principal that issued the credential.
    pub issuer: Principal,
    /// When the credential was issued.
    pub issued_at: DateTime<Utc>,
    /// When the credential stops being valid.
    pub expires_at: DateTime<Utc>,
    /// Revocation marker. Transitions only true → false.
    pub active: bool,
}

impl CredentialRecord {
    /// Derived lifecycle status at the given instant.
    ///
    /// Revocation takes precedence over expiry: a record that was revoked
    /// and has since also expired still reads as `Revoked`.
    pub fn status(&self, now: DateTime<Utc>) -> CredentialStatus {
        if !self.active {
            CredentialStatus::Revoked
        } else if now >= self.expires_at {
            CredentialStatus::Expired
        } else {
            CredentialStatus::Active
        }
    }

    /// Whether the credential is valid at the given instant:
    /// not revoked and not yet expired.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.active && now < self.expires_at
    }
}

/// Derived view of a credential's lifecycle.
///
/// Only `Active` corresponds to stored state (`active == true`, unexpired).
/// `Revoked` and `Expired` are terminal: a revoked record never reactivates,
/// and an expired record never becomes valid again regardless of later
/// clock readings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CredentialStatus {
    /// Issued, not revoked, not yet expired.
    Active,
    /// Revocation flag cleared by the issuer or the admin. Final.
    Revoked,
    /// Past its expiry instant without having been revoked. Final.
    Expired,
}

impl CredentialStatus {
    /// Whether this is a final (terminal) status.
    pub fn is_final(&self) -> bool {
        matches!(self, Self::Revoked | Self::Expired)
    }
}

impl fmt::Display for CredentialStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Active => write!(f, "Active"),
            Self::Revoked => write!(f, "Revoked"),
            Self::Expired => write!(f, "Expired"),
        }
    }
}
