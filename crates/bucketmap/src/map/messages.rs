//! TableCoordinator Message Types
//!
//! Client requests routed by hash, notifications from shard actors, and the
//! diagnostic queries used to observe the resize state machine.

use crate::models::Key;
use kameo::Reply;
use serde::{Deserialize, Serialize};

/// Look up a key.
///
/// The coordinator hashes the key into the primary table and, while a
/// resize is in flight and the primary shard lacks it, into the secondary.
#[derive(Debug, Clone)]
pub struct Lookup {
    pub key: Key,
}

/// Insert or update a key. Acknowledged once the write has been dispatched.
#[derive(Debug, Clone)]
pub struct Insert<V> {
    pub key: Key,
    pub value: V,
}

/// Remove a key. Acknowledged once the delete has been dispatched.
#[derive(Debug, Clone)]
pub struct Remove {
    pub key: Key,
}

/// Sent by a shard whose entry count just reached capacity.
#[derive(Debug, Clone)]
pub struct BucketOverflow {
    /// Slot of the reporting shard
    pub shard_id: usize,
    /// Generation the reporting shard was created at
    pub generation: u64,
}

/// Sent by a draining shard once it holds no entries.
#[derive(Debug, Clone)]
pub struct DoneMoving {
    /// Slot of the drained shard in the primary table
    pub shard_id: usize,
    /// Generation the drained shard was created at
    pub generation: u64,
}

/// Start a resize now, regardless of overflow pressure.
#[cfg(test)]
#[derive(Debug, Clone)]
pub(crate) struct TriggerResize;

/// Acknowledgement of a resize trigger.
#[cfg(test)]
#[derive(Debug, Clone, PartialEq, Eq, Reply)]
pub(crate) struct ResizeAck {
    /// False if a resize was already in flight
    pub started: bool,
    /// Size of the primary table
    pub primary_size: usize,
    /// Size of the secondary table being filled
    pub secondary_size: Option<usize>,
}

/// Request a snapshot of the coordinator's table state.
#[derive(Debug, Clone)]
pub struct GetTableStats;

/// Table state snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Reply)]
pub struct TableStats {
    /// Number of shards in the primary table
    pub primary_size: usize,
    /// Number of shards in the secondary table (None when not resizing)
    pub secondary_size: Option<usize>,
    /// Per-shard drain flags of the table being migrated, indexed by primary
    /// slot (None when not resizing)
    pub completion: Option<Vec<bool>>,
    /// Whether a resize is in flight
    pub resizing: bool,
    /// Resize generation; incremented when a resize starts
    pub generation: u64,
    /// Overflow reports counted in the current generation
    pub overflow_count: usize,
}

/// Request a snapshot of every shard in the primary table.
#[cfg(test)]
#[derive(Debug, Clone)]
pub(crate) struct InspectPrimary;

/// Shard snapshots of the primary table, in slot order.
#[cfg(test)]
#[derive(Debug, Clone, Reply)]
pub(crate) struct TableSnapshot {
    pub shards: Vec<crate::bucket::ShardSnapshot>,
}
