//! Integration test: Full membership credential lifecycle.
//!
//! Exercises issuance → verification → revocation across the registry
//! facade, with a manual clock driving expiry.

use chrono::Duration;

use insignia_core::{CredentialStatus, ImageHash};
use insignia_integration_tests::{open_registry, principal, start};
use insignia_registry::{Clock, RegistryError};

// =========================================================================
// Issue → verify → revoke, driven by the admin
// =========================================================================

#[test]
fn test_admin_issue_verify_revoke_lifecycle() {
    let (registry, _clock) = open_registry("admin-a");
    let admin = principal("admin-a");
    let h1 = ImageHash::new([0x11; 32]);
    let h2 = ImageHash::new([0x22; 32]);

    // Admin initializes the system and is the first authorized issuer.
    assert!(registry.is_authorized_issuer(&admin));

    let id1 = registry
        .issue_membership(&admin, h1, &principal("user-1"), start() + Duration::seconds(3600))
        .expect("issuance should succeed");

    assert!(registry.verify_membership(&id1, &h1));
    assert!(!registry.verify_membership(&id1, &h2));

    registry
        .revoke_membership(&admin, &id1)
        .expect("revocation should succeed");

    assert!(!registry.verify_membership(&id1, &h1));
    assert!(!registry.is_credential_active(&id1));
    assert_eq!(
        registry.get_credential(&id1).unwrap().status(start()),
        CredentialStatus::Revoked
    );
}

#[test]
fn test_verification_rejects_every_other_hash() {
    let (registry, _clock) = open_registry("admin");
    let admin = principal("admin");
    let hash = ImageHash::new([0xAA; 32]);

    let id = registry
        .issue_membership(&admin, hash, &principal("alice"), start() + Duration::hours(1))
        .unwrap();

    assert!(registry.verify_membership(&id, &hash));
    for byte in [0x00u8, 0x01, 0xAB, 0xFF] {
        let other = ImageHash::new([byte; 32]);
        if other != hash {
            assert!(!registry.verify_membership(&id, &other));
        }
    }
}

// =========================================================================
// Expiry as a derived view
// =========================================================================

#[test]
fn test_short_lived_credential_expires_without_mutation() {
    let (registry, clock) = open_registry("admin");
    let admin = principal("admin");
    let issuer = principal("issuer-2");
    let h3 = ImageHash::new([0x33; 32]);

    registry.authorize_issuer(&admin, &issuer).unwrap();

    let id2 = registry
        .issue_membership(&issuer, h3, &principal("user-2"), start() + Duration::seconds(10))
        .unwrap();
    assert!(registry.verify_membership(&id2, &h3));
    assert!(registry.is_credential_active(&id2));

    clock.advance(Duration::seconds(11));

    assert!(!registry.verify_membership(&id2, &h3));
    assert!(!registry.is_credential_active(&id2));
    // The stored `active` flag was never cleared.
    let record = registry.get_credential(&id2).unwrap();
    assert!(record.active);
    assert_eq!(record.status(clock.now()), CredentialStatus::Expired);
}

#[test]
fn test_expired_credential_cannot_become_valid_again() {
    let (registry, clock) = open_registry("admin");
    let admin = principal("admin");
    let hash = ImageHash::new([0x44; 32]);

    let id = registry
        .issue_membership(&admin, hash, &principal("bob"), start() + Duration::seconds(5))
        .unwrap();

    clock.advance(Duration::seconds(6));
    assert!(!registry.verify_membership(&id, &hash));

    // Stays invalid at every later instant.
    clock.advance(Duration::seconds(100));
    assert!(!registry.verify_membership(&id, &hash));
    assert!(!registry.is_credential_active(&id));
}

#[test]
fn test_backward_clock_skew_does_not_revive_expired_credential() {
    let (registry, clock) = open_registry("admin");
    let admin = principal("admin");
    let hash = ImageHash::new([0x99; 32]);

    let id = registry
        .issue_membership(&admin, hash, &principal("gail"), start() + Duration::seconds(10))
        .unwrap();

    clock.advance(Duration::seconds(11));
    assert!(!registry.verify_membership(&id, &hash));

    // The underlying clock steps back before the expiry instant. The
    // registry's view of time holds its high-water mark, so the
    // credential stays expired.
    clock.set(start() + Duration::seconds(5));
    assert!(!registry.verify_membership(&id, &hash));
    assert!(!registry.is_credential_active(&id));
}

// =========================================================================
// Duplicate issuance
// =========================================================================

#[test]
fn test_duplicate_issuance_conflicts_under_frozen_clock() {
    let (registry, _clock) = open_registry("admin");
    let admin = principal("admin");
    let hash = ImageHash::new([0x55; 32]);
    let expires = start() + Duration::hours(1);

    let id = registry
        .issue_membership(&admin, hash, &principal("carol"), expires)
        .unwrap();
    let record_before = registry.get_credential(&id).unwrap();
    let log_before = registry.audit_log().unwrap().len();

    // Identical inputs at the identical instant derive the identical id.
    let result = registry.issue_membership(&admin, hash, &principal("carol"), expires);
    assert!(matches!(result, Err(RegistryError::Conflict(dup)) if dup == id));

    // Ledger state after the failed call equals state before it.
    assert_eq!(registry.get_credential(&id).unwrap(), record_before);
    assert_eq!(registry.audit_log().unwrap().len(), log_before);
}

#[test]
fn test_distinct_instants_yield_distinct_credentials() {
    let (registry, clock) = open_registry("admin");
    let admin = principal("admin");
    let hash = ImageHash::new([0x55; 32]);
    let expires = start() + Duration::hours(1);

    let id1 = registry
        .issue_membership(&admin, hash, &principal("carol"), expires)
        .unwrap();
    clock.advance(Duration::microseconds(1));
    let id2 = registry
        .issue_membership(&admin, hash, &principal("carol"), expires)
        .unwrap();

    assert_ne!(id1, id2);
    assert!(registry.is_credential_active(&id1));
    assert!(registry.is_credential_active(&id2));
}

// =========================================================================
// Revocation authority
// =========================================================================

#[test]
fn test_issuer_revokes_own_credential_admin_revokes_any() {
    let (registry, _clock) = open_registry("admin");
    let admin = principal("admin");
    let issuer = principal("issuer-2");
    registry.authorize_issuer(&admin, &issuer).unwrap();

    let hash = ImageHash::new([0x66; 32]);
    let own = registry
        .issue_membership(&issuer, hash, &principal("dave"), start() + Duration::hours(1))
        .unwrap();
    let admins = registry
        .issue_membership(&admin, hash, &principal("dave"), start() + Duration::hours(1))
        .unwrap();

    // Issuer may not touch the admin's credential.
    let result = registry.revoke_membership(&issuer, &admins);
    assert!(matches!(result, Err(RegistryError::Unauthorized(_))));
    assert!(registry.is_credential_active(&admins));

    // Issuer revokes its own; admin revokes the issuer's leftovers too.
    registry.revoke_membership(&issuer, &own).unwrap();
    registry.revoke_membership(&admin, &admins).unwrap();
    assert!(!registry.is_credential_active(&own));
    assert!(!registry.is_credential_active(&admins));
}

#[test]
fn test_revocation_is_terminal_for_every_subsequent_query() {
    let (registry, clock) = open_registry("admin");
    let admin = principal("admin");
    let hash = ImageHash::new([0x77; 32]);

    let id = registry
        .issue_membership(&admin, hash, &principal("erin"), start() + Duration::hours(2))
        .unwrap();
    registry.revoke_membership(&admin, &id).unwrap();

    for _ in 0..3 {
        assert!(!registry.verify_membership(&id, &hash));
        assert!(!registry.verify_membership(&id, &ImageHash::new([0u8; 32])));
        assert!(!registry.is_credential_active(&id));
        clock.advance(Duration::minutes(10));
    }
}

// =========================================================================
// Audit trail
// =========================================================================

#[test]
fn test_lifecycle_produces_ordered_audit_trail() {
    let (registry, _clock) = open_registry("admin");
    let admin = principal("admin");
    let issuer = principal("issuer-2");
    let hash = ImageHash::new([0x88; 32]);

    let mut rx = registry.subscribe();

    registry.authorize_issuer(&admin, &issuer).unwrap();
    let id = registry
        .issue_membership(&issuer, hash, &principal("frank"), start() + Duration::hours(1))
        .unwrap();
    registry.revoke_membership(&issuer, &id).unwrap();

    let log = registry.audit_log().unwrap();
    let kinds: Vec<_> = log.iter().map(|e| e.event.kind()).collect();
    assert_eq!(
        kinds,
        vec!["issuer_authorized", "membership_issued", "membership_revoked"]
    );

    // Live subscribers see the same events in the same order.
    for expected in &kinds {
        let got = rx.try_recv().expect("subscriber should have the event");
        assert_eq!(got.event.kind(), *expected);
    }
}
