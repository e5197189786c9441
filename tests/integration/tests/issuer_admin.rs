//! Integration test: Issuer authorization and admin invariants, plus
//! durability of the registry state across a RocksDB restart.

use chrono::Duration;
use std::path::PathBuf;
use std::sync::Arc;

use insignia_core::{ImageHash, RegistryConfig};
use insignia_integration_tests::{open_registry, principal};
use insignia_registry::{MembershipRegistry, RegistryError};
use insignia_storage::RocksStore;

// =========================================================================
// Admin-gated issuer management
// =========================================================================

#[test]
fn test_only_admin_manages_issuer_set() {
    let (registry, _clock) = open_registry("admin");
    let admin = principal("admin");
    let issuer = principal("issuer-2");
    let outsider = principal("outsider");

    registry.authorize_issuer(&admin, &issuer).unwrap();

    // Neither an issuer nor an outsider may grow the set.
    for caller in [&issuer, &outsider] {
        let result = registry.authorize_issuer(caller, &principal("issuer-3"));
        assert!(matches!(result, Err(RegistryError::Unauthorized(_))));
        assert!(!registry.is_authorized_issuer(&principal("issuer-3")));
    }

    // Nor shrink it.
    let result = registry.revoke_issuer(&issuer, &issuer);
    assert!(matches!(result, Err(RegistryError::Unauthorized(_))));
    assert!(registry.is_authorized_issuer(&issuer));
}

#[test]
fn test_admin_issuer_status_is_permanent() {
    let (registry, _clock) = open_registry("admin");
    let admin = principal("admin");

    let result = registry.revoke_issuer(&admin, &admin);
    assert!(matches!(result, Err(RegistryError::InvariantViolation(_))));
    assert!(registry.is_authorized_issuer(&admin));

    // And no event was recorded for the failed attempt.
    assert!(registry.audit_log().unwrap().is_empty());
}

#[test]
fn test_issuer_revocation_does_not_touch_issued_credentials() {
    let (registry, _clock) = open_registry("admin");
    let admin = principal("admin");
    let issuer = principal("issuer-2");
    let hash = ImageHash::new([0x42; 32]);

    registry.authorize_issuer(&admin, &issuer).unwrap();
    let id = registry
        .issue_membership(
            &issuer,
            hash,
            &principal("alice"),
            insignia_integration_tests::start() + Duration::hours(1),
        )
        .unwrap();

    registry.revoke_issuer(&admin, &issuer).unwrap();

    // The issuer can no longer issue, but the credential stands and the
    // former issuer can still revoke what it issued.
    assert!(registry.verify_membership(&id, &hash));
    registry.revoke_membership(&issuer, &id).unwrap();
    assert!(!registry.is_credential_active(&id));
}

#[test]
fn test_authorization_is_idempotent() {
    let (registry, _clock) = open_registry("admin");
    let admin = principal("admin");
    let issuer = principal("issuer-2");

    registry.authorize_issuer(&admin, &issuer).unwrap();
    registry.authorize_issuer(&admin, &issuer).unwrap();
    assert!(registry.is_authorized_issuer(&issuer));

    registry.revoke_issuer(&admin, &issuer).unwrap();
    registry.revoke_issuer(&admin, &issuer).unwrap();
    assert!(!registry.is_authorized_issuer(&issuer));
}

// =========================================================================
// Durability across restart (RocksDB backend)
// =========================================================================

fn temp_dir() -> PathBuf {
    let dir = std::env::temp_dir().join(format!("insignia-it-{}", rand::random::<u64>()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn test_registry_state_survives_restart() {
    let dir = temp_dir();
    let config = RegistryConfig {
        admin: "admin".into(),
        ..Default::default()
    };
    let admin = principal("admin");
    let issuer = principal("issuer-2");
    let hash = ImageHash::new([0x99; 32]);

    let (id, log_len) = {
        let store = Arc::new(RocksStore::open(&dir).unwrap());
        let registry = MembershipRegistry::open(store, &config).unwrap();

        registry.authorize_issuer(&admin, &issuer).unwrap();
        let id = registry
            .issue_membership(
                &issuer,
                hash,
                &principal("alice"),
                chrono::Utc::now() + Duration::hours(1),
            )
            .unwrap();
        (id, registry.audit_log().unwrap().len())
    };

    // "Restart": reopen the same data directory.
    let store = Arc::new(RocksStore::open(&dir).unwrap());
    let registry = MembershipRegistry::open(
        store,
        &RegistryConfig {
            // Ignored: the persisted admin is immutable.
            admin: "someone-else".into(),
            ..Default::default()
        },
    )
    .unwrap();

    assert_eq!(registry.admin(), &admin);
    assert!(registry.is_authorized_issuer(&issuer));
    assert!(registry.verify_membership(&id, &hash));
    assert_eq!(registry.audit_log().unwrap().len(), log_len);

    // Mutations continue cleanly after restart.
    registry.revoke_membership(&admin, &id).unwrap();
    assert!(!registry.is_credential_active(&id));
    let log = registry.audit_log().unwrap();
    assert_eq!(log.len(), log_len + 1);
    assert_eq!(log.last().unwrap().seq, log_len as u64);

    std::fs::remove_dir_all(&dir).ok();
}
