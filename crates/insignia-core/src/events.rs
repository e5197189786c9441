//! Audit event types emitted by the registry.
//!
//! Every successful mutating operation appends exactly one event to the
//! durable audit log. Events are append-only and never retracted.

use serde::{Deserialize, Serialize};

use crate::types::{CredentialId, Principal};

/// An audit event emitted by a mutating registry operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegistryEvent {
    /// A membership credential was issued.
    MembershipIssued {
        /// Identifier of the new credential.
        id: CredentialId,
        /// Principal the membership was granted to.
        holder: Principal,
        /// Principal that issued it.
        issuer: Principal,
    },
    /// A membership credential was revoked.
    MembershipRevoked {
        /// Identifier of the revoked credential.
        id: CredentialId,
    },
    /// A principal was added to the authorized-issuer set.
    IssuerAuthorized {
        /// The newly authorized issuer.
        issuer: Principal,
    },
    /// A principal was removed from the authorized-issuer set.
    IssuerRevoked {
        /// The issuer that was removed.
        issuer: Principal,
    },
}

impl RegistryEvent {
    /// Short name of the event variant, for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MembershipIssued { .. } => "membership_issued",
            Self::MembershipRevoked { .. } => "membership_revoked",
            Self::IssuerAuthorized { .. } => "issuer_authorized",
            Self::IssuerRevoked { .. } => "issuer_revoked",
        }
    }
}

/// An audit event together with its position in the durable log.
///
/// Sequence numbers are assigned by the store, start at zero, and are
/// strictly increasing with no gaps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequencedEvent {
    /// Position in the append-only log.
    pub seq: u64,
    /// The event payload.
    pub event: RegistryEvent,
}
