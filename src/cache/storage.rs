//! Storage records and the storage collaborator contract
//!
//! The cache core never persists anything itself. It produces and
//! consumes opaque `StorageRecord`s addressed by the key's hex hash
//! string; the persistence engine behind the `Storage` trait decides
//! directory layout, eviction, and I/O scheduling. `MemoryStorage` is
//! the reference implementation of the contract and the instrumented
//! stub the tests count reads through.

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use super::error::StorageError;

/// Opaque persisted record: an encoded header section and an optional
/// body section.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StorageRecord {
    /// Header bytes, exactly what the entry codec produces/consumes
    pub header: Bytes,
    /// Raw body bytes, present only if the entry has a body
    pub body: Option<Bytes>,
}

impl StorageRecord {
    pub fn new(header: Bytes, body: Option<Bytes>) -> Self {
        Self { header, body }
    }

    pub fn is_empty(&self) -> bool {
        self.header.is_empty()
    }
}

/// Contract the persistence engine must satisfy.
///
/// Records are addressed by the key's 40-character hex hash string. The
/// only ordering requirement: a `get` following a successful `put` of
/// the same hash observes that record or a newer one for that hash.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Fetch the record stored under `hash`, if any. Read failures are
    /// indistinguishable from absence; both are a cache miss.
    async fn get(&self, hash: &str) -> Option<StorageRecord>;

    /// Persist `record` under `hash`, replacing any previous record for
    /// that hash.
    async fn put(&self, hash: &str, record: StorageRecord) -> Result<(), StorageError>;
}

/// In-memory storage implementation.
///
/// Counts reads so tests can observe that entry body materialization
/// never touches the record source twice, and can simulate a full
/// store.
#[derive(Default)]
pub struct MemoryStorage {
    records: RwLock<HashMap<String, StorageRecord>>,
    reads: AtomicU64,
    full: AtomicBool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records currently stored
    pub fn record_count(&self) -> usize {
        self.records.read().len()
    }

    /// Number of `get` calls observed so far
    pub fn read_count(&self) -> u64 {
        self.reads.load(Ordering::Relaxed)
    }

    /// Make subsequent `put` calls fail with `StorageFull`
    pub fn set_full(&self, full: bool) {
        self.full.store(full, Ordering::Relaxed);
    }

    /// Drop all stored records
    pub fn clear(&self) {
        self.records.write().clear();
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn get(&self, hash: &str) -> Option<StorageRecord> {
        self.reads.fetch_add(1, Ordering::Relaxed);
        self.records.read().get(hash).cloned()
    }

    async fn put(&self, hash: &str, record: StorageRecord) -> Result<(), StorageError> {
        if self.full.load(Ordering::Relaxed) {
            return Err(StorageError::StorageFull);
        }
        self.records.write().insert(hash.to_string(), record);
        Ok(())
    }
}
