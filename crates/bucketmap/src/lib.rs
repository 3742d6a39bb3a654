//! Bucketmap Library
//!
//! An integer-keyed concurrent map built from cooperating actors: a table
//! coordinator routing operations by hash, and shard actors each owning a
//! disjoint partition of the key space. When shards fill up, the table is
//! doubled incrementally, with migration piggy-backed on ordinary writes.

pub mod bucket;
pub mod config;
pub mod error;
pub mod map;
pub mod models;
pub mod observability;
pub mod table;

pub use config::MapConfig;
pub use error::{ConfigError, MapError};
pub use map::{ShardedMap, TableStats};
pub use models::{Key, Value};
