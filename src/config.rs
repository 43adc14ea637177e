//! Engine configuration
//!
//! Loaded from TOML; every field has a default so an empty document is a
//! valid configuration.

use crate::error::Result;
use crate::xpath::cache;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Compiled selectors kept in the process-wide cache
    #[serde(default = "default_selector_cache_capacity")]
    pub selector_cache_capacity: usize,

    /// Reject malformed replies instead of recovering
    #[serde(default)]
    pub strict_parsing: bool,
}

fn default_selector_cache_capacity() -> usize {
    cache::DEFAULT_CAPACITY
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            selector_cache_capacity: default_selector_cache_capacity(),
            strict_parsing: false,
        }
    }
}

impl EngineConfig {
    pub fn from_toml_str(input: &str) -> Result<Self> {
        Ok(toml::from_str(input)?)
    }

    /// Apply process-wide settings
    pub fn apply(&self) {
        cache::set_capacity(self.selector_cache_capacity);
        tracing::debug!(
            selector_cache_capacity = self.selector_cache_capacity,
            strict_parsing = self.strict_parsing,
            "engine configuration applied"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ViewError;

    #[test]
    fn test_empty_is_default() {
        assert_eq!(EngineConfig::from_toml_str("").unwrap(), EngineConfig::default());
    }

    #[test]
    fn test_fields() {
        let config = EngineConfig::from_toml_str(
            "selector_cache_capacity = 64\nstrict_parsing = true\n",
        )
        .unwrap();
        assert_eq!(config.selector_cache_capacity, 64);
        assert!(config.strict_parsing);
    }

    #[test]
    fn test_apply_sizes_selector_cache() {
        let config = EngineConfig {
            selector_cache_capacity: 300,
            ..EngineConfig::default()
        };
        config.apply();
        assert_eq!(cache::capacity_now(), 300);
    }

    #[test]
    fn test_invalid_toml() {
        let err = EngineConfig::from_toml_str("strict_parsing = \"yes\"").unwrap_err();
        assert!(matches!(err, ViewError::Config(_)));
    }
}
