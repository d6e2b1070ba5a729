use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::StoreError;
use crate::models::{Role, UserRecord};

/// RecordPatch
///
/// A field-scoped mutation of one stored record: only `Some` fields are
/// written, everything else keeps its stored value. The service builds this
/// from a validated request (hashing the password first), so the repository
/// never sees plaintext credentials.
#[derive(Debug, Clone, Default)]
pub struct RecordPatch {
    pub password_hash: Option<String>,
    pub role: Option<Role>,
    pub curp: Option<String>,
    pub cp: Option<String>,
    pub rfc: Option<String>,
    pub phone: Option<String>,
    pub birthdate: Option<String>,
    pub address: Option<String>,
}

impl RecordPatch {
    fn apply(&self, record: &mut UserRecord) {
        if let Some(v) = &self.password_hash {
            record.password_hash = v.clone();
        }
        if let Some(v) = self.role {
            record.role = v;
        }
        if let Some(v) = &self.curp {
            record.curp = v.clone();
        }
        if let Some(v) = &self.cp {
            record.cp = v.clone();
        }
        if let Some(v) = &self.rfc {
            record.rfc = v.clone();
        }
        if let Some(v) = &self.phone {
            record.phone = v.clone();
        }
        if let Some(v) = &self.birthdate {
            record.birthdate = v.clone();
        }
        if let Some(v) = &self.address {
            record.address = v.clone();
        }
    }
}

/// Repository Trait
///
/// The abstract contract for the record store. Handlers and the service
/// interact with persistence through this trait, so tests can substitute an
/// in-memory mock for the file-backed implementation.
///
/// Every mutating method is a single atomic unit: the merge (or overwrite)
/// and the persist happen under one critical section, so two concurrent
/// mutations can never silently discard each other's writes.
#[async_trait]
pub trait Repository: Send + Sync {
    /// Every record, in insertion order.
    async fn list(&self) -> Vec<UserRecord>;
    /// A single record by its identity key.
    async fn find(&self, username: &str) -> Option<UserRecord>;
    /// Appends a record. Returns false (and stores nothing) when the
    /// username is already taken.
    async fn insert(&self, record: UserRecord) -> Result<bool, StoreError>;
    /// Overwrites every field of an existing record. Returns the stored
    /// result, or None when the username is absent.
    async fn replace(
        &self,
        username: &str,
        record: UserRecord,
    ) -> Result<Option<UserRecord>, StoreError>;
    /// Merges a field-scoped patch into an existing record. Returns the
    /// stored result, or None when the username is absent.
    async fn merge(
        &self,
        username: &str,
        patch: RecordPatch,
    ) -> Result<Option<UserRecord>, StoreError>;
    /// Removes a record. Returns false when the username is absent.
    async fn remove(&self, username: &str) -> Result<bool, StoreError>;
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer across the
/// application state.
pub type RepositoryState = Arc<dyn Repository>;

/// JsonFileRepository
///
/// The durable implementation: an in-memory ordered collection guarded by a
/// single RwLock, mirrored to one JSON file. The file is read once at open
/// and rewritten wholesale on every mutation via write-to-temp-then-rename,
/// so readers of the file never observe a partial write and an interrupted
/// process leaves the previous collection intact.
///
/// Lock discipline: mutations hold the write guard across both the in-memory
/// update and the persist, which serializes read-modify-write cycles and
/// closes the lost-update race a bare load-all/write-all scheme has. Reads
/// share the read guard.
pub struct JsonFileRepository {
    path: PathBuf,
    records: RwLock<Vec<UserRecord>>,
}

impl JsonFileRepository {
    /// open
    ///
    /// Loads the collection from `path`, creating an empty one (and the file
    /// itself) when it does not exist yet.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let records: Vec<UserRecord> = if path.exists() {
            let raw = std::fs::read_to_string(&path)?;
            serde_json::from_str(&raw)?
        } else {
            std::fs::write(&path, b"[]")?;
            Vec::new()
        };
        Ok(Self {
            path,
            records: RwLock::new(records),
        })
    }

    /// Writes the full collection next to the target file and renames it
    /// into place. Rename within one directory is atomic on the platforms
    /// this runs on.
    fn persist(&self, records: &[UserRecord]) -> Result<(), StoreError> {
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        let data = serde_json::to_vec(records)?;
        std::fs::write(&tmp, data)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

#[async_trait]
impl Repository for JsonFileRepository {
    async fn list(&self) -> Vec<UserRecord> {
        self.records.read().await.clone()
    }

    async fn find(&self, username: &str) -> Option<UserRecord> {
        self.records
            .read()
            .await
            .iter()
            .find(|r| r.username == username)
            .cloned()
    }

    async fn insert(&self, record: UserRecord) -> Result<bool, StoreError> {
        let mut guard = self.records.write().await;
        if guard.iter().any(|r| r.username == record.username) {
            return Ok(false);
        }
        // Persist a candidate first; memory is only updated once the file
        // write succeeded, keeping both views consistent on failure.
        let mut next = guard.clone();
        next.push(record);
        self.persist(&next)?;
        *guard = next;
        Ok(true)
    }

    async fn replace(
        &self,
        username: &str,
        mut record: UserRecord,
    ) -> Result<Option<UserRecord>, StoreError> {
        let mut guard = self.records.write().await;
        let Some(index) = guard.iter().position(|r| r.username == username) else {
            return Ok(None);
        };
        // The identity key is immutable; the stored name wins.
        record.username = username.to_string();
        let mut next = guard.clone();
        next[index] = record;
        self.persist(&next)?;
        *guard = next;
        Ok(Some(guard[index].clone()))
    }

    async fn merge(
        &self,
        username: &str,
        patch: RecordPatch,
    ) -> Result<Option<UserRecord>, StoreError> {
        let mut guard = self.records.write().await;
        let Some(index) = guard.iter().position(|r| r.username == username) else {
            return Ok(None);
        };
        let mut next = guard.clone();
        patch.apply(&mut next[index]);
        self.persist(&next)?;
        *guard = next;
        Ok(Some(guard[index].clone()))
    }

    async fn remove(&self, username: &str) -> Result<bool, StoreError> {
        let mut guard = self.records.write().await;
        let Some(index) = guard.iter().position(|r| r.username == username) else {
            return Ok(false);
        };
        let mut next = guard.clone();
        next.remove(index);
        self.persist(&next)?;
        *guard = next;
        Ok(true)
    }
}
