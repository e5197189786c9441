//! RocksDB credential store for durable deployments.

use parking_lot::Mutex;
use rocksdb::{ColumnFamilyDescriptor, IteratorMode, Options, WriteBatch, DB};
use std::path::Path;

use insignia_core::{CredentialId, CredentialRecord, Principal, RegistryEvent, SequencedEvent};

use crate::error::StorageError;
use crate::store::CredentialStore;

/// Column family names for the registry's tables.
const CF_CREDENTIALS: &str = "credentials";
const CF_ISSUERS: &str = "issuers";
const CF_META: &str = "meta";
const CF_EVENTS: &str = "events";

/// Metadata key holding the admin identity.
const META_ADMIN: &[u8] = b"admin";

/// RocksDB-backed [`CredentialStore`].
///
/// Records and events are stored as JSON. Event keys are big-endian
/// sequence numbers so the default iterator order is log order. Each
/// combined mutation-plus-event call goes through a single `WriteBatch`,
/// so the state write and the log append land or fail together.
///
/// The sequence counter sits behind a mutex and advances only after its
/// batch is durably written, so a failed write never burns a sequence
/// number. `insert_credential_with_event` reads before writing; the
/// registry's writer lock is what makes the read-then-write pair safe
/// against concurrent issuance, the same way it guards every other
/// mutation.
pub struct RocksStore {
    db: DB,
    next_seq: Mutex<u64>,
}

impl RocksStore {
    /// Open or create a database at the given path.
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        std::fs::create_dir_all(path)?;

        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_descriptors = vec![
            ColumnFamilyDescriptor::new(CF_CREDENTIALS, Options::default()),
            ColumnFamilyDescriptor::new(CF_ISSUERS, Options::default()),
            ColumnFamilyDescriptor::new(CF_META, Options::default()),
            ColumnFamilyDescriptor::new(CF_EVENTS, Options::default()),
        ];

        let db = DB::open_cf_descriptors(&opts, path, cf_descriptors)?;
        let next_seq = Mutex::new(last_event_seq(&db)?.map_or(0, |s| s + 1));

        Ok(Self { db, next_seq })
    }

    fn cf(&self, name: &str) -> Result<&rocksdb::ColumnFamily, StorageError> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| StorageError::Backend(format!("column family '{}' not found", name)))
    }

    /// Write a batch that includes one event at the next sequence number,
    /// advancing the counter only once the write has succeeded.
    fn write_with_event(
        &self,
        mut batch: WriteBatch,
        event: &RegistryEvent,
    ) -> Result<u64, StorageError> {
        let cf_events = self.cf(CF_EVENTS)?;
        let event_bytes = serde_json::to_vec(event)?;

        let mut next_seq = self.next_seq.lock();
        let seq = *next_seq;
        batch.put_cf(&cf_events, seq.to_be_bytes(), event_bytes);
        self.db.write(batch)?;
        *next_seq = seq + 1;
        Ok(seq)
    }
}

/// Highest sequence number currently in the event log, if any.
fn last_event_seq(db: &DB) -> Result<Option<u64>, StorageError> {
    let cf = db
        .cf_handle(CF_EVENTS)
        .ok_or_else(|| StorageError::Backend("column family 'events' not found".into()))?;
    match db.iterator_cf(&cf, IteratorMode::End).next() {
        Some(entry) => {
            let (key, _) = entry?;
            let bytes: [u8; 8] = key
                .as_ref()
                .try_into()
                .map_err(|_| StorageError::Corrupt("event log key".into()))?;
            Ok(Some(u64::from_be_bytes(bytes)))
        }
        None => Ok(None),
    }
}

impl CredentialStore for RocksStore {
    fn get_credential(&self, id: &CredentialId) -> Result<Option<CredentialRecord>, StorageError> {
        let cf = self.cf(CF_CREDENTIALS)?;
        match self.db.get_cf(&cf, id.as_bytes())? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    fn insert_credential_with_event(
        &self,
        id: &CredentialId,
        record: &CredentialRecord,
        event: &RegistryEvent,
    ) -> Result<Option<u64>, StorageError> {
        let cf = self.cf(CF_CREDENTIALS)?;
        if self.db.get_cf(&cf, id.as_bytes())?.is_some() {
            return Ok(None);
        }
        let mut batch = WriteBatch::default();
        batch.put_cf(&cf, id.as_bytes(), serde_json::to_vec(record)?);
        Ok(Some(self.write_with_event(batch, event)?))
    }

    fn update_credential_with_event(
        &self,
        id: &CredentialId,
        record: &CredentialRecord,
        event: &RegistryEvent,
    ) -> Result<u64, StorageError> {
        let cf = self.cf(CF_CREDENTIALS)?;
        if self.db.get_cf(&cf, id.as_bytes())?.is_none() {
            return Err(StorageError::Corrupt(id.to_string()));
        }
        let mut batch = WriteBatch::default();
        batch.put_cf(&cf, id.as_bytes(), serde_json::to_vec(record)?);
        self.write_with_event(batch, event)
    }

    fn is_issuer_authorized(&self, issuer: &Principal) -> Result<bool, StorageError> {
        let cf = self.cf(CF_ISSUERS)?;
        Ok(self.db.get_cf(&cf, issuer.as_str().as_bytes())?.is_some())
    }

    fn put_issuer(&self, issuer: &Principal) -> Result<(), StorageError> {
        let cf = self.cf(CF_ISSUERS)?;
        self.db.put_cf(&cf, issuer.as_str().as_bytes(), b"")?;
        Ok(())
    }

    fn put_issuer_with_event(
        &self,
        issuer: &Principal,
        event: &RegistryEvent,
    ) -> Result<u64, StorageError> {
        let cf = self.cf(CF_ISSUERS)?;
        let mut batch = WriteBatch::default();
        batch.put_cf(&cf, issuer.as_str().as_bytes(), b"");
        self.write_with_event(batch, event)
    }

    fn remove_issuer_with_event(
        &self,
        issuer: &Principal,
        event: &RegistryEvent,
    ) -> Result<u64, StorageError> {
        let cf = self.cf(CF_ISSUERS)?;
        let mut batch = WriteBatch::default();
        batch.delete_cf(&cf, issuer.as_str().as_bytes());
        self.write_with_event(batch, event)
    }

    fn admin(&self) -> Result<Option<Principal>, StorageError> {
        let cf = self.cf(CF_META)?;
        match self.db.get_cf(&cf, META_ADMIN)? {
            Some(bytes) => {
                let id = String::from_utf8(bytes)
                    .map_err(|_| StorageError::Corrupt("admin identity".into()))?;
                let admin = Principal::new(id)
                    .map_err(|_| StorageError::Corrupt("admin identity".into()))?;
                Ok(Some(admin))
            }
            None => Ok(None),
        }
    }

    fn put_admin(&self, admin: &Principal) -> Result<(), StorageError> {
        let cf = self.cf(CF_META)?;
        self.db.put_cf(&cf, META_ADMIN, admin.as_str().as_bytes())?;
        Ok(())
    }

    fn append_event(&self, event: &RegistryEvent) -> Result<u64, StorageError> {
        self.write_with_event(WriteBatch::default(), event)
    }

    fn events(&self) -> Result<Vec<SequencedEvent>, StorageError> {
        let cf = self.cf(CF_EVENTS)?;
        let mut out = Vec::new();
        for entry in self.db.iterator_cf(&cf, IteratorMode::Start) {
            let (key, value) = entry?;
            let bytes: [u8; 8] = key
                .as_ref()
                .try_into()
                .map_err(|_| StorageError::Corrupt("event log key".into()))?;
            out.push(SequencedEvent {
                seq: u64::from_be_bytes(bytes),
                event: serde_json::from_slice(&value)?,
            });
        }
        Ok(out)
    }
}
