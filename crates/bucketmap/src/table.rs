//! Shard Tables and Slot Hashing
//!
//! A table is a fixed-length array of shard handles indexed by
//! `key % table_size`. Tables never grow in place: a resize allocates a fresh
//! table of twice the size, so the old table stays valid until it is retired
//! at commit.

use crate::bucket::Shard;
use crate::map::TableCoordinator;
use crate::models::{Key, Value};
use kameo::actor::{ActorRef, WeakActorRef};
use std::sync::Arc;
use tracing::debug;

/// Slot of `key` in a table with `size` shards.
pub fn slot(key: Key, size: usize) -> usize {
    debug_assert!(size > 0, "table size must be non-zero");
    (key % size as u64) as usize
}

/// Size of the table that replaces one of `size` shards.
pub fn grown_size(size: usize) -> usize {
    size * 2
}

/// Fixed-size collection of shard handles created at one generation.
///
/// Cloning is cheap: clones share the same shard handles.
#[derive(Clone)]
pub struct Table<V: Value> {
    generation: u64,
    shards: Arc<[ActorRef<Shard<V>>]>,
}

impl<V: Value> Table<V> {
    /// Spawn `size` fresh shards tagged with `generation`.
    pub fn allocate(
        size: usize,
        generation: u64,
        capacity: usize,
        coordinator: &WeakActorRef<TableCoordinator<V>>,
    ) -> Self {
        let shards: Vec<_> = (0..size)
            .map(|id| Shard::spawn_for(id, generation, capacity, coordinator.clone()))
            .collect();

        debug!(size, generation, "Allocated shard table");

        Self {
            generation,
            shards: shards.into(),
        }
    }

    /// Number of shards.
    pub fn size(&self) -> usize {
        self.shards.len()
    }

    /// Generation the shards were created at.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Slot of `key` in this table.
    pub fn slot(&self, key: Key) -> usize {
        slot(key, self.size())
    }

    /// Shard at slot `id`.
    #[cfg(test)]
    pub(crate) fn shard(&self, id: usize) -> &ActorRef<Shard<V>> {
        &self.shards[id]
    }

    /// Slot and shard owning `key`.
    pub fn route(&self, key: Key) -> (usize, &ActorRef<Shard<V>>) {
        let id = self.slot(key);
        (id, &self.shards[id])
    }

    /// Stop every shard once its mailbox has drained.
    pub async fn retire(self) {
        for shard in self.shards.iter() {
            shard.stop_gracefully().await.ok();
        }
        debug!(
            size = self.size(),
            generation = self.generation,
            "Retired shard table"
        );
    }
}
