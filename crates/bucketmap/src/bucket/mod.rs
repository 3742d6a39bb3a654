//! Shard Actor Module
//!
//! Provides the shard ("bucket") actors that own disjoint partitions of the
//! key space. Each table is a fixed array of shards; a key lives in shard
//! `key % table_size`.
//!
//! ## Architecture
//!
//! ```text
//! TableCoordinator
//!        ↓ Get / Set / Delete / Move
//!    Shard (slot i)
//!        ↓                      ↘ BucketOverflow / DoneMoving
//!    (resizing) Set{Migration}   TableCoordinator
//!        ↓
//!    Shard (secondary slot)
//! ```
//!
//! A shard only ever talks to its coordinator and, while draining, to the
//! shards of the secondary table. It never learns about the secondary table
//! except through the `Move` requests that carry it.

mod actor;
mod messages;

pub use actor::Shard;
pub use messages::{Delete, DeleteOutcome, Get, Move, Set};

#[cfg(test)]
pub(crate) use messages::{Inspect, ShardSnapshot};
