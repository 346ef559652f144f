//! Vary header capture and matching
//!
//! A response whose `Vary` directive names request headers can only
//! answer a later request that carries the same values for those
//! headers. `collect_varying_request_headers` snapshots the relevant
//! request headers at write time (the exact list a `CacheEntry`
//! stores), and `varying_request_headers_match` decides reuse for a new
//! request against that snapshot.

use super::response::ResponseMetadata;

/// Snapshot, at write time, of the request headers named by the
/// response's `Vary` directive.
///
/// Headers the request did not carry are captured with an empty value,
/// so a later request that also omits them still matches. Returns an
/// empty list when the response has no `Vary` header.
pub fn collect_varying_request_headers(
    response: &ResponseMetadata,
    request_headers: &[(String, String)],
) -> Vec<(String, String)> {
    let vary = match response.vary() {
        Some(value) => value,
        None => return Vec::new(),
    };

    let mut collected = Vec::new();
    for name in vary.split(',') {
        let name = name.trim();
        if name.is_empty() {
            continue;
        }
        let value = header_value(request_headers, name).unwrap_or("");
        collected.push((name.to_string(), value.to_string()));
    }
    collected
}

/// Whether a stored snapshot allows reuse for a new request.
///
/// Header names compare case-insensitively, values exactly. A captured
/// `Vary: *` entry never matches any request.
pub fn varying_request_headers_match(
    stored: &[(String, String)],
    request_headers: &[(String, String)],
) -> bool {
    stored.iter().all(|(name, stored_value)| {
        if name == "*" {
            return false;
        }
        header_value(request_headers, name).unwrap_or("") == stored_value
    })
}

fn header_value<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(n, _)| n.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}
