//! Shard Actor Implementation
//!
//! Each shard owns one partition of the key space: the keys whose slot in its
//! table equals the shard's id. Shards are spawned when their table is
//! allocated and stopped when the table is retired.

use super::messages::{Delete, DeleteOutcome, Get, Move, Set};
#[cfg(test)]
use super::messages::{Inspect, ShardSnapshot};
use crate::map::{BucketOverflow, DoneMoving, TableCoordinator};
use crate::models::{Entry, Key, Value, WriteOrigin};
use kameo::actor::{ActorRef, WeakActorRef};
use kameo::{
    mailbox,
    message::{Context, Message},
    Actor,
};
use std::collections::VecDeque;
use std::convert::Infallible;
use tracing::{debug, trace, warn};

/// Actor owning the entries of a single slot.
///
/// Responsible for:
/// - Answering lookups for its keys
/// - Inserting, updating and removing entries
/// - Reporting overflow when its entry count reaches capacity
/// - Handing entries over to the secondary table during a resize, and
///   reporting once it has drained
pub struct Shard<V: Value> {
    /// Slot of this shard in its table
    id: usize,
    /// Generation of the table this shard belongs to
    generation: u64,
    /// Entry count that triggers an overflow report
    capacity: usize,
    /// Entries, most recently inserted first
    entries: VecDeque<Entry<V>>,
    /// Owning coordinator. Weak so that dropping the map handle stops the
    /// whole actor tree.
    coordinator: WeakActorRef<TableCoordinator<V>>,
}

impl<V: Value> Actor for Shard<V> {
    type Args = Self;
    type Error = Infallible;

    async fn on_start(state: Self::Args, _actor_ref: ActorRef<Self>) -> Result<Self, Self::Error> {
        trace!(
            shard_id = state.id,
            generation = state.generation,
            "Shard started"
        );
        Ok(state)
    }
}

impl<V: Value> Shard<V> {
    /// Create a new, empty shard.
    pub fn new(
        id: usize,
        generation: u64,
        capacity: usize,
        coordinator: WeakActorRef<TableCoordinator<V>>,
    ) -> Self {
        Self {
            id,
            generation,
            capacity,
            entries: VecDeque::with_capacity(capacity),
            coordinator,
        }
    }

    /// Spawn a new, empty shard on an unbounded mailbox.
    pub fn spawn_for(
        id: usize,
        generation: u64,
        capacity: usize,
        coordinator: WeakActorRef<TableCoordinator<V>>,
    ) -> ActorRef<Self> {
        Self::spawn_with_mailbox(
            Self::new(id, generation, capacity, coordinator),
            mailbox::unbounded(),
        )
    }

    fn position(&self, key: Key) -> Option<usize> {
        self.entries.iter().position(|entry| entry.key == key)
    }

    /// Tell the coordinator a shard just reached capacity.
    ///
    /// Takes owned arguments so that no borrow of the shard (and hence of
    /// its values) is held across the send.
    async fn report_overflow(
        coordinator: Option<ActorRef<TableCoordinator<V>>>,
        overflow: BucketOverflow,
    ) {
        let Some(coordinator) = coordinator else {
            return;
        };

        let shard_id = overflow.shard_id;
        if let Err(e) = coordinator.tell(overflow).send().await {
            warn!(shard_id, error = %e, "Failed to report overflow");
        }
    }

    /// Tell the coordinator a draining shard has nothing left to migrate.
    async fn report_drained(coordinator: Option<ActorRef<TableCoordinator<V>>>, done: DoneMoving) {
        let Some(coordinator) = coordinator else {
            return;
        };

        let shard_id = done.shard_id;
        if let Err(e) = coordinator.tell(done).send().await {
            warn!(shard_id, error = %e, "Failed to report drained shard");
        }
    }
}

impl<V: Value> Message<Get> for Shard<V> {
    type Reply = Option<V>;

    async fn handle(&mut self, msg: Get, _ctx: &mut Context<Self, Self::Reply>) -> Self::Reply {
        self.entries
            .iter()
            .find(|entry| entry.key == msg.key)
            .map(|entry| entry.value.clone())
    }
}

impl<V: Value> Message<Set<V>> for Shard<V> {
    type Reply = ();

    async fn handle(&mut self, msg: Set<V>, _ctx: &mut Context<Self, Self::Reply>) -> Self::Reply {
        match (self.position(msg.key), msg.origin) {
            (Some(index), WriteOrigin::Client) => {
                self.entries[index].value = msg.value;
                trace!(shard_id = self.id, key = msg.key, "Updated entry in place");
            }
            (Some(_), WriteOrigin::Migration) => {
                trace!(
                    shard_id = self.id,
                    key = msg.key,
                    "Kept resident value over migrated entry"
                );
            }
            (None, _) => {
                self.entries.push_front(Entry::new(msg.key, msg.value));
                trace!(
                    shard_id = self.id,
                    key = msg.key,
                    count = self.entries.len(),
                    "Inserted entry"
                );

                if self.entries.len() == self.capacity {
                    debug!(
                        shard_id = self.id,
                        generation = self.generation,
                        count = self.entries.len(),
                        "Shard reached capacity"
                    );
                    let overflow = BucketOverflow {
                        shard_id: self.id,
                        generation: self.generation,
                    };
                    Self::report_overflow(self.coordinator.upgrade(), overflow).await;
                }
            }
        }
    }
}

impl<V: Value> Message<Delete> for Shard<V> {
    type Reply = DeleteOutcome;

    async fn handle(&mut self, msg: Delete, _ctx: &mut Context<Self, Self::Reply>) -> Self::Reply {
        match self.position(msg.key) {
            Some(index) => {
                self.entries.remove(index);
                trace!(shard_id = self.id, key = msg.key, "Removed entry");
                DeleteOutcome::Removed
            }
            None if msg.resizing => DeleteOutcome::CheckSecondary,
            None => DeleteOutcome::Absent,
        }
    }
}

impl<V: Value> Message<Move<V>> for Shard<V> {
    type Reply = ();

    async fn handle(&mut self, msg: Move<V>, _ctx: &mut Context<Self, Self::Reply>) -> Self::Reply {
        // Front of the list first: the most recently inserted entries migrate
        // before older ones.
        let batch = msg.count.min(self.entries.len());
        let moved: Vec<Entry<V>> = self.entries.drain(..batch).collect();

        for Entry { key, value } in moved {
            let (target_id, target) = msg.secondary.route(key);
            let forward = Set {
                key,
                value,
                origin: WriteOrigin::Migration,
            };
            if let Err(e) = target.tell(forward).send().await {
                warn!(
                    shard_id = self.id,
                    target_id,
                    key,
                    error = %e,
                    "Failed to migrate entry"
                );
            }
        }

        debug!(
            shard_id = self.id,
            moved = batch,
            remaining = self.entries.len(),
            "Migrated batch"
        );

        if self.entries.is_empty() {
            let done = DoneMoving {
                shard_id: msg.shard_id,
                generation: self.generation,
            };
            Self::report_drained(self.coordinator.upgrade(), done).await;
        }
    }
}

#[cfg(test)]
impl<V: Value> Message<Inspect> for Shard<V> {
    type Reply = ShardSnapshot;

    async fn handle(&mut self, _msg: Inspect, _ctx: &mut Context<Self, Self::Reply>) -> Self::Reply {
        ShardSnapshot {
            id: self.id,
            generation: self.generation,
            keys: self.entries.iter().map(|entry| entry.key).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MapConfig;
    use crate::observability::NoopCounter;
    use crate::table::Table;
    use std::sync::Arc;

    // Shards in these tests use a generation the coordinator never reaches,
    // so their overflow and drain reports are ignored as stale.
    const DETACHED: u64 = 99;

    fn coordinator() -> ActorRef<TableCoordinator<String>> {
        TableCoordinator::spawn_for(MapConfig::default(), Arc::new(NoopCounter))
    }

    fn detached_shard(
        coordinator: &ActorRef<TableCoordinator<String>>,
    ) -> ActorRef<Shard<String>> {
        Shard::spawn_for(0, DETACHED, 4, coordinator.downgrade())
    }

    async fn set(shard: &ActorRef<Shard<String>>, key: Key, value: &str, origin: WriteOrigin) {
        shard
            .tell(Set {
                key,
                value: value.to_string(),
                origin,
            })
            .send()
            .await
            .unwrap();
    }

    async fn get(shard: &ActorRef<Shard<String>>, key: Key) -> Option<String> {
        shard.ask(Get { key }).send().await.unwrap()
    }

    async fn keys(shard: &ActorRef<Shard<String>>) -> Vec<Key> {
        shard.ask(Inspect).send().await.unwrap().keys
    }

    #[tokio::test]
    async fn test_get_missing_key_is_none() {
        let coordinator = coordinator();
        let shard = detached_shard(&coordinator);
        assert_eq!(get(&shard, 42).await, None);
    }

    #[tokio::test]
    async fn test_set_inserts_at_front() {
        let coordinator = coordinator();
        let shard = detached_shard(&coordinator);

        set(&shard, 1, "one", WriteOrigin::Client).await;
        set(&shard, 2, "two", WriteOrigin::Client).await;
        set(&shard, 3, "three", WriteOrigin::Client).await;

        assert_eq!(keys(&shard).await, vec![3, 2, 1]);
        assert_eq!(get(&shard, 2).await.as_deref(), Some("two"));
    }

    #[tokio::test]
    async fn test_repeated_set_updates_in_place() {
        let coordinator = coordinator();
        let shard = detached_shard(&coordinator);

        set(&shard, 5, "a", WriteOrigin::Client).await;
        set(&shard, 6, "b", WriteOrigin::Client).await;
        set(&shard, 5, "c", WriteOrigin::Client).await;

        assert_eq!(keys(&shard).await, vec![6, 5]);
        assert_eq!(get(&shard, 5).await.as_deref(), Some("c"));
    }

    #[tokio::test]
    async fn test_migrated_set_keeps_resident_value() {
        let coordinator = coordinator();
        let shard = detached_shard(&coordinator);

        set(&shard, 5, "fresh", WriteOrigin::Client).await;
        set(&shard, 5, "stale", WriteOrigin::Migration).await;
        set(&shard, 6, "moved", WriteOrigin::Migration).await;

        assert_eq!(get(&shard, 5).await.as_deref(), Some("fresh"));
        assert_eq!(get(&shard, 6).await.as_deref(), Some("moved"));
    }

    #[tokio::test]
    async fn test_delete_outcomes() {
        let coordinator = coordinator();
        let shard = detached_shard(&coordinator);
        set(&shard, 7, "seven", WriteOrigin::Client).await;

        let removed = shard
            .ask(Delete { key: 7, resizing: false })
            .send()
            .await
            .unwrap();
        assert_eq!(removed, DeleteOutcome::Removed);
        assert_eq!(get(&shard, 7).await, None);

        let absent = shard
            .ask(Delete { key: 7, resizing: false })
            .send()
            .await
            .unwrap();
        assert_eq!(absent, DeleteOutcome::Absent);

        let forwarded = shard
            .ask(Delete { key: 7, resizing: true })
            .send()
            .await
            .unwrap();
        assert_eq!(forwarded, DeleteOutcome::CheckSecondary);
    }

    #[tokio::test]
    async fn test_move_forwards_front_entries_to_secondary() {
        let coordinator = coordinator();
        let shard = detached_shard(&coordinator);
        let secondary = Table::allocate(8, DETACHED, 4, &coordinator.downgrade());

        for key in [0u64, 4, 8] {
            set(&shard, key, &format!("v{key}"), WriteOrigin::Client).await;
        }

        shard
            .tell(Move {
                count: 2,
                shard_id: 0,
                secondary: secondary.clone(),
            })
            .send()
            .await
            .unwrap();

        // The two most recent inserts (8 and 4) leave; 0 stays behind.
        assert_eq!(keys(&shard).await, vec![0]);
        assert_eq!(get(&shard, 8).await, None);
        assert_eq!(get(secondary.shard(0), 8).await.as_deref(), Some("v8"));
        assert_eq!(get(secondary.shard(4), 4).await.as_deref(), Some("v4"));
        assert_eq!(get(secondary.shard(0), 0).await, None);
    }

    #[tokio::test]
    async fn test_move_clamps_to_entry_count() {
        let coordinator = coordinator();
        let shard = detached_shard(&coordinator);
        let secondary = Table::allocate(8, DETACHED, 4, &coordinator.downgrade());

        set(&shard, 3, "three", WriteOrigin::Client).await;
        shard
            .tell(Move {
                count: 10,
                shard_id: 0,
                secondary: secondary.clone(),
            })
            .send()
            .await
            .unwrap();

        assert!(keys(&shard).await.is_empty());
        assert_eq!(get(secondary.shard(3), 3).await.as_deref(), Some("three"));
    }
}
