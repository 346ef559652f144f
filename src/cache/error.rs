//! Error types for the cache core
//!
//! These enums exist so the fallible layers can report what went wrong
//! to logs and tests. Every public decode surface resolves them into
//! absence (`None`) before they reach the cache consumer; a failure to
//! read a record is a cache miss, never a fatal condition.

use thiserror::Error;

/// Errors from encoding or decoding a record header section.
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("unsupported record version: {found} (expected {expected})")]
    UnsupportedVersion { found: u8, expected: u8 },

    #[error("record header is inconsistent: {0}")]
    CorruptHeader(&'static str),
}

/// Errors from the storage collaborator.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage full: cannot store record")]
    StorageFull,
}
