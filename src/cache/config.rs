//! Cache core configuration

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default)]
    pub enabled: bool,
    /// Partition (top-level site) isolation for key derivation. When
    /// disabled, keys are derived with an empty partition and entries
    /// are shared across sites.
    #[serde(default = "default_partition_isolation")]
    pub partition_isolation: bool,
    /// Bodies at or above this size are handed off through the
    /// shared-memory capability when it is available.
    #[serde(default = "default_min_shareable_body_kb")]
    pub min_shareable_body_kb: u64,
    /// Responses with larger bodies are not cached at all.
    #[serde(default = "default_max_body_size_mb")]
    pub max_body_size_mb: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            partition_isolation: default_partition_isolation(),
            min_shareable_body_kb: default_min_shareable_body_kb(),
            max_body_size_mb: default_max_body_size_mb(),
        }
    }
}

fn default_partition_isolation() -> bool {
    true
}

fn default_min_shareable_body_kb() -> u64 {
    16 // 16KB, roughly the point where mapping beats copying
}

fn default_max_body_size_mb() -> u64 {
    50 // 50MB
}

impl CacheConfig {
    /// Convert min_shareable_body_kb to bytes
    pub fn min_shareable_body_bytes(&self) -> u64 {
        self.min_shareable_body_kb * 1024
    }

    /// Convert max_body_size_mb to bytes
    pub fn max_body_size_bytes(&self) -> u64 {
        self.max_body_size_mb * 1024 * 1024
    }

    /// Validate cache configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.min_shareable_body_bytes() > self.max_body_size_bytes() {
            return Err(format!(
                "min_shareable_body_kb ({}) cannot exceed max_body_size_mb ({})",
                self.min_shareable_body_kb, self.max_body_size_mb
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_disabled_and_isolated() {
        let config = CacheConfig::default();
        assert!(!config.enabled);
        assert!(config.partition_isolation);
        assert_eq!(config.min_shareable_body_kb, 16);
        assert_eq!(config.max_body_size_mb, 50);
    }

    #[test]
    fn test_deserializes_minimal_yaml_with_defaults() {
        let config: CacheConfig = serde_yaml::from_str("enabled: true").unwrap();
        assert!(config.enabled);
        assert!(config.partition_isolation);
        assert_eq!(config.max_body_size_mb, 50);
    }

    #[test]
    fn test_deserializes_full_yaml() {
        let yaml = r#"
enabled: true
partition_isolation: false
min_shareable_body_kb: 64
max_body_size_mb: 200
"#;
        let config: CacheConfig = serde_yaml::from_str(yaml).unwrap();
        assert!(config.enabled);
        assert!(!config.partition_isolation);
        assert_eq!(config.min_shareable_body_kb, 64);
        assert_eq!(config.max_body_size_mb, 200);
    }

    #[test]
    fn test_unit_conversions() {
        let config = CacheConfig::default();
        assert_eq!(config.min_shareable_body_bytes(), 16 * 1024);
        assert_eq!(config.max_body_size_bytes(), 50 * 1024 * 1024);
    }

    #[test]
    fn test_rejects_share_threshold_above_body_limit() {
        let config = CacheConfig {
            enabled: true,
            partition_isolation: true,
            min_shareable_body_kb: 2 * 1024 * 1024, // 2GB in KB
            max_body_size_mb: 50,
        };
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("cannot exceed"));

        assert!(CacheConfig::default().validate().is_ok());
    }
}
