//! Error types

use thiserror::Error;

/// Rejected `MapConfig` values.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("initial table size {0} must be a power of two and at least 2")]
    InvalidTableSize(usize),
    #[error("bucket capacity must be at least 1")]
    ZeroCapacity,
    #[error("could not parse {var}={value:?}")]
    Parse { var: &'static str, value: String },
}

/// Errors surfaced by the `ShardedMap` handle.
///
/// A missing key is not an error: lookups return `Ok(None)`.
#[derive(Debug, Error)]
pub enum MapError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("table coordinator is unavailable: {0}")]
    CoordinatorUnavailable(String),
}
