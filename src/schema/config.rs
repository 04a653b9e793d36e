//! Configuration types for dump playback sessions.

use serde::{Deserialize, Serialize};

fn default_max_entries() -> Option<usize> {
    Some(5)
}

/// Bounds for the frame cache.
///
/// At least one bound must be set; when both are set, both are enforced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Maximum number of resident frames.
    #[serde(default = "default_max_entries")]
    pub max_entries: Option<usize>,
    /// Maximum total resident size in bytes (approximate).
    #[serde(default)]
    pub max_bytes: Option<u64>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: Some(5),
            max_bytes: None,
        }
    }
}

impl CacheConfig {
    /// Validate configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_entries.is_none() && self.max_bytes.is_none() {
            return Err(ConfigError::UnboundedCache);
        }
        if self.max_entries == Some(0) {
            return Err(ConfigError::ZeroEntryBound);
        }
        if self.max_bytes == Some(0) {
            return Err(ConfigError::ZeroByteBound);
        }
        Ok(())
    }
}

/// Top-level session configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Frame cache bounds.
    #[serde(default)]
    pub cache: CacheConfig,
}

impl SessionConfig {
    /// Validate configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.cache.validate()
    }
}

/// Configuration validation errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Cache needs an entry bound or a byte bound")]
    UnboundedCache,
    #[error("Cache entry bound must be non-zero")]
    ZeroEntryBound,
    #[error("Cache byte bound must be non-zero")]
    ZeroByteBound,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = SessionConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.cache.max_entries, Some(5));
        assert_eq!(config.cache.max_bytes, None);
    }

    #[test]
    fn test_unbounded_cache_rejected() {
        let config = CacheConfig {
            max_entries: None,
            max_bytes: None,
        };
        assert!(matches!(config.validate(), Err(ConfigError::UnboundedCache)));
    }

    #[test]
    fn test_zero_bounds_rejected() {
        let config = CacheConfig {
            max_entries: Some(0),
            max_bytes: None,
        };
        assert!(matches!(config.validate(), Err(ConfigError::ZeroEntryBound)));

        let config = CacheConfig {
            max_entries: None,
            max_bytes: Some(0),
        };
        assert!(matches!(config.validate(), Err(ConfigError::ZeroByteBound)));
    }

    #[test]
    fn test_byte_bound_alone_is_valid() {
        let config = CacheConfig {
            max_entries: None,
            max_bytes: Some(64 * 1024 * 1024),
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_serde_roundtrip() {
        let config = SessionConfig {
            cache: CacheConfig {
                max_entries: Some(12),
                max_bytes: Some(1 << 20),
            },
        };

        let json = serde_json::to_string(&config).unwrap();
        let back: SessionConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.cache.max_entries, Some(12));
        assert_eq!(back.cache.max_bytes, Some(1 << 20));
    }

    #[test]
    fn test_missing_fields_fall_back_to_defaults() {
        let config: SessionConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.cache.max_entries, Some(5));
        assert_eq!(config.cache.max_bytes, None);
    }
}
