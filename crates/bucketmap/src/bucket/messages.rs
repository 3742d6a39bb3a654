//! Shard Message Types
//!
//! Requests the coordinator and draining shards send to a shard actor.

use crate::models::{Key, Value, WriteOrigin};
use crate::table::Table;
use kameo::Reply;
use std::fmt;

/// Look up a key. Replies with the value, or `None` if this shard lacks it.
#[derive(Debug, Clone)]
pub struct Get {
    pub key: Key,
}

/// Insert or update a key.
///
/// New keys go to the front of the shard's entry list.
#[derive(Debug, Clone)]
pub struct Set<V> {
    pub key: Key,
    pub value: V,
    pub origin: WriteOrigin,
}

/// Remove a key.
#[derive(Debug, Clone)]
pub struct Delete {
    pub key: Key,
    /// Whether the coordinator has a secondary table in flight. When set and
    /// the key is absent here, the reply tells the coordinator to look there.
    pub resizing: bool,
}

/// Result of a `Delete`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Reply)]
pub enum DeleteOutcome {
    /// The key was present and has been removed
    Removed,
    /// The key was not here and no resize is in flight
    Absent,
    /// The key was not here; the coordinator should forward the delete to the
    /// secondary table
    CheckSecondary,
}

/// Migrate a batch of entries into the secondary table.
#[derive(Clone)]
pub struct Move<V: Value> {
    /// Maximum number of entries to take from the front of the list
    pub count: usize,
    /// Slot of the draining shard, echoed back in its drain report
    pub shard_id: usize,
    /// The table being migrated into
    pub secondary: Table<V>,
}

impl<V: Value> fmt::Debug for Move<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Move")
            .field("count", &self.count)
            .field("shard_id", &self.shard_id)
            .field("secondary_size", &self.secondary.size())
            .finish()
    }
}

/// Request a snapshot of the shard's state.
#[cfg(test)]
#[derive(Debug, Clone)]
pub(crate) struct Inspect;

/// Shard state snapshot.
#[cfg(test)]
#[derive(Debug, Clone, PartialEq, Eq, Reply)]
pub(crate) struct ShardSnapshot {
    /// Slot of this shard in its table
    pub id: usize,
    /// Generation the shard was created at
    pub generation: u64,
    /// Keys in list order, most recently inserted first
    pub keys: Vec<Key>,
}
