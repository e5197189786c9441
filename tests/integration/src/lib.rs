//! Shared helpers for the Insignia integration tests.

use chrono::{DateTime, TimeZone, Utc};
use std::sync::Arc;

use insignia_core::{Principal, RegistryConfig};
use insignia_registry::{Clock, ManualClock, MembershipRegistry};
use insignia_storage::MemoryStore;

/// Fixed starting instant for manual-clock tests.
pub fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 6, 1, 12, 0, 0).unwrap()
}

/// Build a principal, panicking on invalid input (test-only).
pub fn principal(s: &str) -> Principal {
    Principal::new(s).expect("valid principal")
}

/// Open an in-memory registry with a manual clock and the given admin.
pub fn open_registry(admin: &str) -> (MembershipRegistry, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(start()));
    let config = RegistryConfig {
        admin: admin.into(),
        event_capacity: 32,
        ..Default::default()
    };
    let registry = MembershipRegistry::open_with_clock(
        Arc::new(MemoryStore::new()),
        &config,
        Arc::clone(&clock) as Arc<dyn Clock>,
    )
    .expect("registry should open");
    (registry, clock)
}
