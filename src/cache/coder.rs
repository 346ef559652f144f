//! Versioned binary codec for record header sections
//!
//! The header section of a storage record is a MessagePack document
//! with a schema-version marker, encoding in stable order: key method,
//! key partition, key identifier, key hash, timestamp, response
//! metadata, and the varying-request-header snapshot. The decode side
//! validates structure so that any corrupted or truncated header
//! surfaces as an error the entry layer turns into a cache miss.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use super::error::CacheError;
use super::key::{CacheKey, KeyHash};
use super::response::ResponseMetadata;

/// Record format version for schema evolution
pub(crate) const RECORD_FORMAT_VERSION: u8 = 1;

/// Wire layout of the header section. Field order is the serialization
/// contract; the key's range is write-path-only and never stored.
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct RecordHeader {
    pub version: u8,
    pub method: String,
    pub partition: String,
    pub identifier: String,
    pub hash: KeyHash,
    pub timestamp_millis: u64,
    pub response: ResponseMetadata,
    pub varying_request_headers: Vec<(String, String)>,
}

pub(crate) fn encode_header(
    key: &CacheKey,
    time_stamp: SystemTime,
    response: &ResponseMetadata,
    varying_request_headers: &[(String, String)],
) -> Result<Bytes, CacheError> {
    let header = RecordHeader {
        version: RECORD_FORMAT_VERSION,
        method: key.method().to_string(),
        partition: key.partition().to_string(),
        identifier: key.identifier().to_string(),
        hash: key.hash(),
        timestamp_millis: system_time_to_epoch_millis(time_stamp),
        response: response.clone(),
        varying_request_headers: varying_request_headers.to_vec(),
    };

    let encoded = rmp_serde::to_vec(&header)
        .map_err(|e| CacheError::Serialization(format!("header encoding failed: {}", e)))?;
    Ok(Bytes::from(encoded))
}

pub(crate) fn decode_header(bytes: &[u8]) -> Result<RecordHeader, CacheError> {
    let header: RecordHeader = rmp_serde::from_slice(bytes)
        .map_err(|e| CacheError::Serialization(format!("header decoding failed: {}", e)))?;

    if header.version != RECORD_FORMAT_VERSION {
        return Err(CacheError::UnsupportedVersion {
            found: header.version,
            expected: RECORD_FORMAT_VERSION,
        });
    }
    if header.identifier.is_empty() {
        return Err(CacheError::CorruptHeader("empty key identifier"));
    }

    Ok(header)
}

pub(crate) fn system_time_to_epoch_millis(t: SystemTime) -> u64 {
    t.duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

pub(crate) fn epoch_millis_to_system_time(millis: u64) -> SystemTime {
    UNIX_EPOCH + Duration::from_millis(millis)
}

/// Entry timestamps carry millisecond precision; stamping them
/// pre-truncated keeps encode followed by decode an exact inverse.
pub(crate) fn now_truncated_to_millis() -> SystemTime {
    epoch_millis_to_system_time(system_time_to_epoch_millis(SystemTime::now()))
}
