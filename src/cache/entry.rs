//! Cache entry: decoded response metadata, the vary snapshot, and the
//! lazily materialized body.
//!
//! An entry is constructed once per hit/miss resolution and is
//! read-mostly afterwards:
//! - write path: `CacheEntry::new` captures a live response, its body,
//!   and the varying-request-header snapshot
//! - read path: `CacheEntry::decode_storage_record` parses a stored
//!   record's header and defers the body until first access
//!
//! Any structural decode failure is a cache miss (`None`), never an
//! error the consumer has to handle.

use bytes::Bytes;
use std::sync::OnceLock;
use std::time::SystemTime;

use super::coder;
use super::error::CacheError;
use super::key::CacheKey;
use super::response::ResponseMetadata;
use super::storage::StorageRecord;

#[cfg(all(target_os = "linux", feature = "shareable-resource"))]
use super::shareable::ShareableResourceHandle;

/// In-memory cache object for one key.
pub struct CacheEntry {
    key: CacheKey,
    time_stamp: SystemTime,
    response: ResponseMetadata,
    varying_request_headers: Vec<(String, String)>,
    buffer: OnceLock<Option<Bytes>>,
    #[cfg(all(target_os = "linux", feature = "shareable-resource"))]
    shareable_handle: OnceLock<Option<ShareableResourceHandle>>,
    needs_validation: bool,
    source_record: Option<StorageRecord>,
}

impl CacheEntry {
    /// Write path: capture a live response and its body.
    ///
    /// `needs_validation` is the policy decision for the freshly
    /// written response; `freshness::initial_needs_validation` computes
    /// it from the response's cache directives.
    pub fn new(
        key: CacheKey,
        response: ResponseMetadata,
        body: Option<Bytes>,
        varying_request_headers: Vec<(String, String)>,
        needs_validation: bool,
    ) -> Self {
        let buffer = OnceLock::new();
        let _ = buffer.set(body);

        Self {
            key,
            time_stamp: coder::now_truncated_to_millis(),
            response,
            varying_request_headers,
            buffer,
            #[cfg(all(target_os = "linux", feature = "shareable-resource"))]
            shareable_handle: OnceLock::new(),
            needs_validation,
            source_record: None,
        }
    }

    /// Read path: parse a stored record's header section.
    ///
    /// The body section is not decoded here; the record is retained and
    /// the body materializes on first `buffer()` call. Returns `None`
    /// on any structural failure.
    pub fn decode_storage_record(record: &StorageRecord) -> Option<Self> {
        let header = match coder::decode_header(&record.header) {
            Ok(header) => header,
            Err(err) => {
                tracing::debug!("discarding unreadable cache record: {}", err);
                return None;
            }
        };

        let key = CacheKey::new(header.method, header.partition, header.identifier);
        if key.hash() != header.hash {
            tracing::debug!("discarding cache record with mismatched key hash");
            return None;
        }

        Some(Self {
            key,
            time_stamp: coder::epoch_millis_to_system_time(header.timestamp_millis),
            response: header.response,
            varying_request_headers: header.varying_request_headers,
            buffer: OnceLock::new(),
            #[cfg(all(target_os = "linux", feature = "shareable-resource"))]
            shareable_handle: OnceLock::new(),
            needs_validation: false,
            source_record: Some(record.clone()),
        })
    }

    /// Serialize into a storage record: the exact structural inverse of
    /// `decode_storage_record` composed with body materialization.
    pub fn encode_as_storage_record(&self) -> Result<StorageRecord, CacheError> {
        let header = coder::encode_header(
            &self.key,
            self.time_stamp,
            &self.response,
            &self.varying_request_headers,
        )?;
        Ok(StorageRecord::new(header, self.buffer()))
    }

    pub fn key(&self) -> &CacheKey {
        &self.key
    }

    /// Entry creation/write time, millisecond precision
    pub fn time_stamp(&self) -> SystemTime {
        self.time_stamp
    }

    pub fn response(&self) -> &ResponseMetadata {
        &self.response
    }

    /// The request headers named by the response's Vary directive, as
    /// captured at write time. The consumer compares these against a
    /// new request before reuse.
    pub fn varying_request_headers(&self) -> &[(String, String)] {
        &self.varying_request_headers
    }

    /// The response body, materialized from the source record on first
    /// access. Subsequent calls return the same underlying bytes and
    /// never touch the record again. First call may fault in backing
    /// storage; latency-sensitive callers should pre-materialize off
    /// their hot thread.
    pub fn buffer(&self) -> Option<Bytes> {
        self.buffer
            .get_or_init(|| {
                self.source_record
                    .as_ref()
                    .and_then(|record| record.body.clone())
            })
            .clone()
    }

    /// Whether the body has been materialized (or was captured at
    /// construction).
    pub fn has_materialized_buffer(&self) -> bool {
        self.buffer.get().is_some()
    }

    /// Shared-memory capability over the same bytes as `buffer()`,
    /// materialized once. `None` if the entry has no body or the
    /// allocation failed.
    #[cfg(all(target_os = "linux", feature = "shareable-resource"))]
    pub fn shareable_resource_handle(&self) -> Option<&ShareableResourceHandle> {
        self.shareable_handle
            .get_or_init(|| {
                let body = self.buffer()?;
                match ShareableResourceHandle::allocate(&body) {
                    Ok(handle) => Some(handle),
                    Err(err) => {
                        tracing::warn!("failed to allocate shareable body: {}", err);
                        None
                    }
                }
            })
            .as_ref()
    }

    pub fn needs_validation(&self) -> bool {
        self.needs_validation
    }

    /// Mark the entry stale. One-directional: nothing clears the flag;
    /// a revalidated response becomes a new entry.
    pub fn set_needs_validation(&mut self) {
        self.needs_validation = true;
    }

    /// The record this entry was decoded from; `None` for write-path
    /// entries.
    pub fn source_storage_record(&self) -> Option<&StorageRecord> {
        self.source_record.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::freshness;
    use crate::cache::vary;
    use std::time::Duration;

    fn sample_key() -> CacheKey {
        CacheKey::new("GET", "example.com", "https://example.com/a.js")
    }

    fn sample_response() -> ResponseMetadata {
        ResponseMetadata::new(
            200,
            "https://example.com/a.js",
            vec![
                ("Content-Type".to_string(), "text/javascript".to_string()),
                ("Cache-Control".to_string(), "max-age=3600".to_string()),
                ("Vary".to_string(), "Accept-Language".to_string()),
            ],
        )
    }

    fn sample_entry() -> CacheEntry {
        let response = sample_response();
        let request = vec![("Accept-Language".to_string(), "en-US".to_string())];
        let varying = vary::collect_varying_request_headers(&response, &request);
        let needs_validation = freshness::initial_needs_validation(&response, Duration::ZERO);
        CacheEntry::new(
            sample_key(),
            response,
            Some(Bytes::from_static(b"console.log('hi');")),
            varying,
            needs_validation,
        )
    }

    #[test]
    fn test_write_path_captures_response_and_body() {
        let entry = sample_entry();
        assert_eq!(entry.key(), &sample_key());
        assert_eq!(entry.response().status, 200);
        assert_eq!(
            entry.buffer(),
            Some(Bytes::from_static(b"console.log('hi');"))
        );
        assert_eq!(
            entry.varying_request_headers(),
            &[("Accept-Language".to_string(), "en-US".to_string())]
        );
        assert!(!entry.needs_validation());
        assert!(entry.source_storage_record().is_none());
    }

    #[test]
    fn test_round_trip_reproduces_observable_state() {
        let entry = sample_entry();
        let record = entry.encode_as_storage_record().unwrap();
        let decoded = CacheEntry::decode_storage_record(&record).unwrap();

        assert_eq!(decoded.key(), entry.key());
        assert_eq!(decoded.time_stamp(), entry.time_stamp());
        assert_eq!(decoded.response(), entry.response());
        assert_eq!(
            decoded.varying_request_headers(),
            entry.varying_request_headers()
        );
        assert_eq!(decoded.buffer(), entry.buffer());
    }

    #[test]
    fn test_round_trip_without_body() {
        let entry = CacheEntry::new(
            sample_key(),
            sample_response(),
            None,
            Vec::new(),
            true,
        );
        let record = entry.encode_as_storage_record().unwrap();
        assert!(record.body.is_none());

        let decoded = CacheEntry::decode_storage_record(&record).unwrap();
        assert_eq!(decoded.buffer(), None);
    }

    #[test]
    fn test_decode_defers_body_materialization() {
        let record = sample_entry().encode_as_storage_record().unwrap();
        let decoded = CacheEntry::decode_storage_record(&record).unwrap();

        assert!(!decoded.has_materialized_buffer());
        let first = decoded.buffer();
        assert!(decoded.has_materialized_buffer());
        let second = decoded.buffer();
        assert_eq!(first, second);
    }

    #[test]
    fn test_decode_of_corrupted_header_is_a_miss() {
        let record = StorageRecord::new(Bytes::from_static(b"\xff\xff\xff\xff"), None);
        assert!(CacheEntry::decode_storage_record(&record).is_none());
    }

    #[test]
    fn test_decode_of_truncated_header_is_a_miss() {
        let record = sample_entry().encode_as_storage_record().unwrap();
        let truncated = StorageRecord::new(record.header.slice(..record.header.len() / 2), None);
        assert!(CacheEntry::decode_storage_record(&truncated).is_none());
    }

    #[test]
    fn test_decode_of_empty_record_is_a_miss() {
        assert!(CacheEntry::decode_storage_record(&StorageRecord::default()).is_none());
    }

    #[test]
    fn test_decode_rejects_tampered_key_hash() {
        let entry = sample_entry();
        let record = entry.encode_as_storage_record().unwrap();

        // Re-encode the header with a digest that does not match the
        // stored key fields.
        let mut header = crate::cache::coder::decode_header(&record.header).unwrap();
        header.hash[0] ^= 0xff;
        let tampered = StorageRecord::new(
            Bytes::from(rmp_serde::to_vec(&header).unwrap()),
            record.body.clone(),
        );

        assert!(CacheEntry::decode_storage_record(&tampered).is_none());
    }

    #[test]
    fn test_needs_validation_is_monotonic() {
        let mut entry = sample_entry();
        assert!(!entry.needs_validation());

        entry.set_needs_validation();
        assert!(entry.needs_validation());

        // No API exists to clear the flag; calling the setter again
        // keeps it set.
        entry.set_needs_validation();
        assert!(entry.needs_validation());
    }

    #[test]
    fn test_decoded_entry_starts_fresh() {
        let record = sample_entry().encode_as_storage_record().unwrap();
        let decoded = CacheEntry::decode_storage_record(&record).unwrap();
        assert!(!decoded.needs_validation());
    }

    #[test]
    fn test_decoded_entry_retains_source_record() {
        let record = sample_entry().encode_as_storage_record().unwrap();
        let decoded = CacheEntry::decode_storage_record(&record).unwrap();
        assert_eq!(decoded.source_storage_record(), Some(&record));
    }

    #[test]
    fn test_write_path_stores_no_cache_response_as_needing_validation() {
        let response = ResponseMetadata::new(
            200,
            "https://example.com/feed",
            vec![("Cache-Control".to_string(), "no-cache".to_string())],
        );
        let needs_validation = freshness::initial_needs_validation(&response, Duration::ZERO);
        let entry = CacheEntry::new(sample_key(), response, None, Vec::new(), needs_validation);
        assert!(entry.needs_validation());
    }

    #[cfg(all(target_os = "linux", feature = "shareable-resource"))]
    mod shareable {
        use super::*;

        #[test]
        fn test_shareable_handle_covers_buffer_bytes() {
            let entry = sample_entry();
            let handle = entry.shareable_resource_handle().unwrap();
            let mapping = handle.map().unwrap();
            assert_eq!(&mapping[..], &entry.buffer().unwrap()[..]);
        }

        #[test]
        fn test_shareable_handle_materializes_once() {
            let entry = sample_entry();
            let first = entry.shareable_resource_handle().unwrap().as_raw_fd();
            let second = entry.shareable_resource_handle().unwrap().as_raw_fd();
            assert_eq!(first, second);
        }

        #[test]
        fn test_entry_without_body_has_no_shareable_handle() {
            let entry = CacheEntry::new(
                sample_key(),
                sample_response(),
                None,
                Vec::new(),
                false,
            );
            assert!(entry.shareable_resource_handle().is_none());
        }
    }
}
