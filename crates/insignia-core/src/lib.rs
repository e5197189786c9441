//! Insignia Core — Fundamental types, errors, and configuration for the
//! Insignia membership credential registry.

pub mod config;
pub mod error;
pub mod events;
pub mod record;
pub mod types;

pub use config::RegistryConfig;
pub use error::CoreError;
pub use events::{RegistryEvent, SequencedEvent};
pub use record::{CredentialRecord, CredentialStatus};
pub use types::{CredentialId, ImageHash, Principal};
