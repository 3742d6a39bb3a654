//! Map Configuration
//!
//! Table sizing settings with sensible defaults and environment variable
//! overrides.

use crate::error::ConfigError;

/// Environment variable for the initial number of shards.
pub const INITIAL_SIZE_VAR: &str = "BUCKETMAP_INITIAL_SIZE";
/// Environment variable for the per-shard overflow threshold.
pub const BUCKET_CAPACITY_VAR: &str = "BUCKETMAP_BUCKET_CAPACITY";

/// Map configuration with sensible defaults
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapConfig {
    /// Number of shards in the primary table at creation (env: BUCKETMAP_INITIAL_SIZE).
    /// Must be a power of two; every resize doubles it.
    pub initial_size: usize,

    /// Entry count at which a shard reports overflow to the coordinator
    /// (env: BUCKETMAP_BUCKET_CAPACITY)
    pub bucket_capacity: usize,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            initial_size: 4,
            bucket_capacity: 4,
        }
    }
}

impl MapConfig {
    /// Create configuration from environment variables with defaults
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(size) = env_usize(INITIAL_SIZE_VAR)? {
            config.initial_size = size;
        }

        if let Some(capacity) = env_usize(BUCKET_CAPACITY_VAR)? {
            config.bucket_capacity = capacity;
        }

        config.validate()?;
        Ok(config)
    }

    /// Check the sizing invariants.
    ///
    /// The initial size must be at least 2 so that the migration batch
    /// (`primary_size / 2`) is never empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.initial_size < 2 || !self.initial_size.is_power_of_two() {
            return Err(ConfigError::InvalidTableSize(self.initial_size));
        }

        if self.bucket_capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }

        Ok(())
    }

    pub fn with_initial_size(mut self, initial_size: usize) -> Self {
        self.initial_size = initial_size;
        self
    }

    pub fn with_bucket_capacity(mut self, bucket_capacity: usize) -> Self {
        self.bucket_capacity = bucket_capacity;
        self
    }
}

fn env_usize(var: &'static str) -> Result<Option<usize>, ConfigError> {
    match std::env::var(var) {
        Ok(value) => value
            .trim()
            .parse::<usize>()
            .map(Some)
            .map_err(|_| ConfigError::Parse { var, value }),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = MapConfig::default();
        assert_eq!(config.initial_size, 4);
        assert_eq!(config.bucket_capacity, 4);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_non_power_of_two() {
        let config = MapConfig::default().with_initial_size(6);
        assert_eq!(config.validate(), Err(ConfigError::InvalidTableSize(6)));
    }

    #[test]
    fn test_rejects_single_shard_table() {
        let config = MapConfig::default().with_initial_size(1);
        assert_eq!(config.validate(), Err(ConfigError::InvalidTableSize(1)));
    }

    #[test]
    fn test_rejects_zero_capacity() {
        let config = MapConfig::default().with_bucket_capacity(0);
        assert_eq!(config.validate(), Err(ConfigError::ZeroCapacity));
    }

    #[test]
    fn test_builder_overrides() {
        let config = MapConfig::default()
            .with_initial_size(16)
            .with_bucket_capacity(8);
        assert_eq!(config.initial_size, 16);
        assert_eq!(config.bucket_capacity, 8);
        assert!(config.validate().is_ok());
    }
}
