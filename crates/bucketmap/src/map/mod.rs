//! Table Coordinator Module
//!
//! Routes client operations to shard actors by hash and grows the table
//! incrementally, without stopping traffic.
//!
//! ## Architecture
//!
//! ```text
//! ShardedMap (client handle)
//!        ↓ Lookup / Insert / Remove
//! TableCoordinator
//!        ↓ key % primary_size
//!    ┌───┴──────────────┐
//!    ↓                  ↓ (resizing)
//! primary Shard      secondary Shard ◀── Set{Migration} ── primary Shard
//!    ↓                                                        ↑
//! BucketOverflow ──▶ TableCoordinator.begin_resize()         Move
//! DoneMoving     ──▶ TableCoordinator.commit_resize()
//! ```
//!
//! ## Resize protocol
//!
//! 1. Once more than `primary_size / 2` shards of the current generation
//!    have reported overflow, the coordinator allocates a secondary table of
//!    twice the size, bumps the generation and restarts the overflow count.
//!    Shards of the secondary table carry the new generation, so their
//!    reports count toward the next resize.
//! 2. Every write while resizing goes to the secondary table. The primary
//!    shard at the write's slot drops any superseded copy of the key and
//!    migrates up to `primary_size / 2` of its entries.
//! 3. Reads check the primary table, then the secondary.
//! 4. A draining shard that reaches zero entries reports `DoneMoving`; when
//!    every primary slot has reported, the secondary table becomes primary.
//!    If its shards already reported enough overflow, the next resize starts
//!    immediately.
//!
//! ## Usage
//!
//! ```ignore
//! let map = ShardedMap::spawn(MapConfig::default())?;
//! map.set(3, "Three".to_string()).await?;
//! assert_eq!(map.get(3).await?.as_deref(), Some("Three"));
//! map.delete(3).await?;
//! ```

mod coordinator;
mod handle;
mod messages;


pub use coordinator::{CoordinatorArgs, TableCoordinator};
pub use handle::ShardedMap;
pub use messages::{BucketOverflow, DoneMoving, GetTableStats, Insert, Lookup, Remove, TableStats};
