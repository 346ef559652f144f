//! Cache-Control parsing and the initial validation policy.
//!
//! Parses the subset of RFC 7234 directives the cache policy reads:
//! - `no-store` / `private`: response must not be stored by this cache
//! - `no-cache`: response can be stored but must be revalidated first
//! - `max-age` / `s-maxage`: freshness lifetime (s-maxage wins for a
//!   shared cache)
//! - `must-revalidate`: stale responses must not be served without
//!   revalidation
//! - `immutable`: the response never changes while fresh
//!
//! `initial_needs_validation` is the policy decision a writer feeds into
//! `CacheEntry::new`; the entry itself only carries the resulting flag.

use std::time::Duration;

use super::response::ResponseMetadata;

/// Parsed Cache-Control directives.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheControl {
    /// Freshness lifetime (max-age directive)
    pub max_age: Option<Duration>,

    /// Shared-cache freshness lifetime (s-maxage directive); takes
    /// precedence over max-age for a shared cache like this one
    pub s_maxage: Option<Duration>,

    /// Response must not be stored in any cache (no-store directive)
    pub no_store: bool,

    /// Response must be revalidated before use (no-cache directive)
    pub no_cache: bool,

    /// Response is for a single user and must not be stored by shared
    /// caches (private directive)
    pub private: bool,

    /// Response may be cached by any cache (public directive)
    pub public: bool,

    /// Stale responses must be revalidated before use (must-revalidate
    /// directive)
    pub must_revalidate: bool,

    /// Content never changes while fresh (immutable directive)
    pub immutable: bool,
}

impl CacheControl {
    /// Parse a Cache-Control header value into structured directives.
    ///
    /// Handles comma-separated directives with optional values
    /// (`max-age=3600`). Unknown directives are ignored.
    pub fn parse(header_value: &str) -> Self {
        let mut result = Self::default();

        for directive in header_value.split(',') {
            let directive = directive.trim().to_lowercase();
            if directive.is_empty() {
                continue;
            }

            if let Some((name, value)) = directive.split_once('=') {
                let name = name.trim();
                let value = value.trim().trim_matches('"');

                match name {
                    "max-age" => {
                        if let Ok(secs) = value.parse::<u64>() {
                            result.max_age = Some(Duration::from_secs(secs));
                        }
                    }
                    "s-maxage" => {
                        if let Ok(secs) = value.parse::<u64>() {
                            result.s_maxage = Some(Duration::from_secs(secs));
                        }
                    }
                    _ => {}
                }
            } else {
                match directive.as_str() {
                    "no-store" => result.no_store = true,
                    "no-cache" => result.no_cache = true,
                    "private" => result.private = true,
                    "public" => result.public = true,
                    "must-revalidate" => result.must_revalidate = true,
                    "immutable" => result.immutable = true,
                    _ => {}
                }
            }
        }

        result
    }

    /// Freshness lifetime for a shared cache: s-maxage wins over
    /// max-age.
    pub fn freshness_lifetime(&self) -> Option<Duration> {
        self.s_maxage.or(self.max_age)
    }

    /// Whether a shared cache may store the response at all.
    pub fn is_storable_by_shared_cache(&self) -> bool {
        !self.no_store && !self.private
    }
}

/// Initial needs-validation value for an entry written from `response`.
///
/// `age` is how old the response already is at write time (zero for a
/// response fetched just now). A response without an explicit freshness
/// lifetime is marked for revalidation; heuristic freshness from
/// `Expires`/`Last-Modified` belongs to the HTTP stack, not this core.
pub fn initial_needs_validation(response: &ResponseMetadata, age: Duration) -> bool {
    let directives = response.cache_control();
    if directives.no_cache {
        return true;
    }
    if directives.immutable {
        return false;
    }
    match directives.freshness_lifetime() {
        Some(lifetime) => age >= lifetime,
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response_with_cache_control(value: &str) -> ResponseMetadata {
        ResponseMetadata::new(
            200,
            "https://example.com/a.js",
            vec![("Cache-Control".to_string(), value.to_string())],
        )
    }

    #[test]
    fn test_parses_value_directives() {
        let cc = CacheControl::parse("max-age=3600, s-maxage=600");
        assert_eq!(cc.max_age, Some(Duration::from_secs(3600)));
        assert_eq!(cc.s_maxage, Some(Duration::from_secs(600)));
    }

    #[test]
    fn test_parses_boolean_directives() {
        let cc = CacheControl::parse("no-store, no-cache, private, must-revalidate, immutable");
        assert!(cc.no_store);
        assert!(cc.no_cache);
        assert!(cc.private);
        assert!(cc.must_revalidate);
        assert!(cc.immutable);
        assert!(!cc.public);
    }

    #[test]
    fn test_parsing_is_case_insensitive_and_tolerant() {
        let cc = CacheControl::parse("  Max-Age=\"120\" ,, PUBLIC ");
        assert_eq!(cc.max_age, Some(Duration::from_secs(120)));
        assert!(cc.public);
    }

    #[test]
    fn test_unknown_directives_are_ignored() {
        let cc = CacheControl::parse("stale-while-revalidate=60, max-age=30");
        assert_eq!(cc.max_age, Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_malformed_values_are_ignored() {
        let cc = CacheControl::parse("max-age=soon");
        assert_eq!(cc.max_age, None);
    }

    #[test]
    fn test_s_maxage_wins_for_shared_cache() {
        let cc = CacheControl::parse("max-age=3600, s-maxage=60");
        assert_eq!(cc.freshness_lifetime(), Some(Duration::from_secs(60)));
    }

    #[test]
    fn test_storability_for_shared_cache() {
        assert!(CacheControl::parse("max-age=60").is_storable_by_shared_cache());
        assert!(!CacheControl::parse("no-store").is_storable_by_shared_cache());
        assert!(!CacheControl::parse("private").is_storable_by_shared_cache());
    }

    #[test]
    fn test_fresh_response_does_not_need_validation() {
        let response = response_with_cache_control("max-age=3600");
        assert!(!initial_needs_validation(&response, Duration::ZERO));
    }

    #[test]
    fn test_expired_lifetime_needs_validation() {
        let response = response_with_cache_control("max-age=60");
        assert!(initial_needs_validation(
            &response,
            Duration::from_secs(120)
        ));
    }

    #[test]
    fn test_no_cache_always_needs_validation() {
        let response = response_with_cache_control("no-cache, max-age=3600");
        assert!(initial_needs_validation(&response, Duration::ZERO));
    }

    #[test]
    fn test_immutable_never_needs_validation() {
        let response = response_with_cache_control("immutable");
        assert!(!initial_needs_validation(&response, Duration::ZERO));
    }

    #[test]
    fn test_missing_freshness_information_needs_validation() {
        let response = ResponseMetadata::new(200, "https://example.com/", Vec::new());
        assert!(initial_needs_validation(&response, Duration::ZERO));
    }
}
