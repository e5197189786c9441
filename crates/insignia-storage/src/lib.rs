//! Insignia Storage — The credential store abstraction and its backends.
//!
//! The registry is written against the [`CredentialStore`] trait so the
//! same logic runs over an in-memory map in tests and over RocksDB in a
//! durable deployment.

pub mod error;
pub mod memory;
pub mod rocks;
pub mod store;

pub use error::StorageError;
pub use memory::MemoryStore;
pub use rocks::RocksStore;
pub use store::CredentialStore;
