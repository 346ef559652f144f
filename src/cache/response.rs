//! Response metadata owned by a cache entry
//!
//! Deliberately a plain serializable value rather than a protocol
//! object: the cache core stores it verbatim and round-trips it through
//! the record header without interpreting anything beyond the handful
//! of headers the caching policy reads.

use serde::{Deserialize, Serialize};

use super::freshness::CacheControl;

/// Snapshot of the response-describing fields a cache entry owns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseMetadata {
    /// HTTP status code
    pub status: u16,
    /// URL the response was served for
    pub url: String,
    /// Response headers, in received order
    pub headers: Vec<(String, String)>,
}

impl ResponseMetadata {
    pub fn new(status: u16, url: impl Into<String>, headers: Vec<(String, String)>) -> Self {
        Self {
            status,
            url: url.into(),
            headers,
        }
    }

    /// Case-insensitive single-header lookup; first match wins.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Parsed `Cache-Control` directives; all-default when the header
    /// is absent.
    pub fn cache_control(&self) -> CacheControl {
        self.header("cache-control")
            .map(CacheControl::parse)
            .unwrap_or_default()
    }

    pub fn vary(&self) -> Option<&str> {
        self.header("vary")
    }

    pub fn etag(&self) -> Option<&str> {
        self.header("etag")
    }

    pub fn last_modified(&self) -> Option<&str> {
        self.header("last-modified")
    }
}
