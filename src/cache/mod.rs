//! Persistent HTTP response cache core
//!
//! The identity and record model of the cache:
//! - `CacheKey`: deterministic reduction of a request to a stable,
//!   content-addressable identity
//! - `CacheEntry`: the in-memory cache object, with encode/decode to
//!   and from opaque storage records and lazy body materialization
//! - `Storage`/`StorageRecord`: the contract the persistence engine
//!   satisfies; records are addressed by the key's hex hash string
//! - `freshness`/`vary`: the response-directive parsing and
//!   vary-matching helpers the cache consumer drives reuse with
//!
//! Key construction and entry encode/decode are pure and synchronous;
//! they are safe to call from any thread. Storage I/O belongs to the
//! collaborator behind the `Storage` trait and runs wherever the
//! embedding process schedules it.

mod coder;
pub mod config;
pub mod entry;
pub mod error;
pub mod freshness;
pub mod key;
pub mod response;
pub mod storage;
pub mod vary;

#[cfg(all(target_os = "linux", feature = "shareable-resource"))]
pub mod shareable;

pub use config::CacheConfig;
pub use entry::CacheEntry;
pub use error::{CacheError, StorageError};
pub use freshness::{initial_needs_validation, CacheControl};
pub use key::{CacheKey, KeyHash};
pub use response::ResponseMetadata;
pub use storage::{MemoryStorage, Storage, StorageRecord};
pub use vary::{collect_varying_request_headers, varying_request_headers_match};

#[cfg(all(target_os = "linux", feature = "shareable-resource"))]
pub use shareable::{ShareableResourceHandle, SharedMapping};
