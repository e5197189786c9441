use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::CoreError;

/// Configuration for an Insignia registry instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Principal that becomes admin (and first authorized issuer) when a
    /// fresh store is initialized. Ignored when the store already holds an
    /// admin identity.
    pub admin: String,
    /// Path to the data directory for durable backends.
    pub data_dir: String,
    /// Capacity of the in-process audit event broadcast channel.
    pub event_capacity: usize,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            admin: "insignia-admin".into(),
            data_dir: "./data".into(),
            event_capacity: 256,
            log_level: "info".into(),
        }
    }
}

impl RegistryConfig {
    /// Load configuration from a TOML file. Missing fields take defaults.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        let raw = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&raw)?)
    }
}
