//! Response cache configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Which store backs the response cache
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    #[default]
    Redis,
    Memory,
}

/// Response cache configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// Cache backend
    #[serde(default)]
    pub backend: CacheBackend,

    /// TTL for cached curriculum listings
    #[serde(default = "default_listing_ttl")]
    pub listing_ttl_secs: u64,

    /// TTL for generated theory explanations
    #[serde(default = "default_theory_ttl")]
    pub theory_ttl_secs: u64,

    /// TTL for answers to free-text questions
    #[serde(default = "default_question_ttl")]
    pub question_ttl_secs: u64,
}

impl CacheConfig {
    pub fn listing_ttl(&self) -> Duration {
        Duration::from_secs(self.listing_ttl_secs)
    }

    pub fn theory_ttl(&self) -> Duration {
        Duration::from_secs(self.theory_ttl_secs)
    }

    pub fn question_ttl(&self) -> Duration {
        Duration::from_secs(self.question_ttl_secs)
    }

    /// Validate cache configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.listing_ttl_secs == 0 {
            return Err(ValidationError::InvalidTtl("listings"));
        }
        if self.theory_ttl_secs == 0 {
            return Err(ValidationError::InvalidTtl("theory answers"));
        }
        if self.question_ttl_secs == 0 {
            return Err(ValidationError::InvalidTtl("question answers"));
        }
        Ok(())
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: CacheBackend::default(),
            listing_ttl_secs: default_listing_ttl(),
            theory_ttl_secs: default_theory_ttl(),
            question_ttl_secs: default_question_ttl(),
        }
    }
}

fn default_listing_ttl() -> u64 {
    60 * 60
}

fn default_theory_ttl() -> u64 {
    60 * 60 * 6
}

fn default_question_ttl() -> u64 {
    60
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_config_defaults() {
        let config = CacheConfig::default();
        assert_eq!(config.backend, CacheBackend::Redis);
        assert_eq!(config.listing_ttl(), Duration::from_secs(3600));
        assert_eq!(config.theory_ttl(), Duration::from_secs(21600));
        assert_eq!(config.question_ttl(), Duration::from_secs(60));
    }

    #[test]
    fn test_backend_deserialization() {
        let config: CacheConfig = serde_json::from_str(r#"{"backend": "memory"}"#).unwrap();
        assert_eq!(config.backend, CacheBackend::Memory);
        assert_eq!(config.question_ttl_secs, 60);
    }

    #[test]
    fn test_validation_zero_ttl() {
        let config = CacheConfig {
            question_ttl_secs: 0,
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ValidationError::InvalidTtl("question answers"))
        );
    }
}
