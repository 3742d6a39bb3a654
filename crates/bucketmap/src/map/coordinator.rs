//! TableCoordinator Actor
//!
//! Owns the routing tables and drives the resize state machine:
//!
//! ```text
//! STABLE ──(overflow_count > primary_size / 2)──▶ RESIZING
//!    ▲                                              │
//!    └────────(every draining shard reported)───────┘
//!                 secondary becomes primary
//! ```

use super::messages::{
    BucketOverflow, DoneMoving, GetTableStats, Insert, Lookup, Remove, TableStats,
};
#[cfg(test)]
use super::messages::{InspectPrimary, ResizeAck, TableSnapshot, TriggerResize};
#[cfg(test)]
use crate::bucket::Inspect;
use crate::bucket::{Delete, DeleteOutcome, Get, Move, Set, Shard};
use crate::config::MapConfig;
use crate::models::{Key, Value, WriteOrigin};
use crate::observability::{events, metrics, Operation, OperationCounter};
use crate::table::{grown_size, Table};
use kameo::actor::{ActorRef, WeakActorRef};
use kameo::{
    mailbox,
    message::{Context, Message},
    Actor,
};
use std::convert::Infallible;
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// Arguments for spawning a `TableCoordinator`.
pub struct CoordinatorArgs {
    pub config: MapConfig,
    pub counter: Arc<dyn OperationCounter>,
}

/// An in-flight resize: the table being filled and which primary shards have
/// drained into it.
struct Migration<V: Value> {
    secondary: Table<V>,
    /// One flag per primary slot
    done: Vec<bool>,
}

/// Routes operations to shard actors by `key % table_size`.
///
/// While a resize is in flight, writes land in the secondary table and each
/// one also makes the matching primary shard migrate a batch of its entries.
/// The swap is committed once every primary shard has drained.
pub struct TableCoordinator<V: Value> {
    /// Sizing settings
    config: MapConfig,
    /// Table serving reads; also the table being drained during a resize
    primary: Table<V>,
    /// Present iff a resize is in flight
    migration: Option<Migration<V>>,
    /// Overflow reports accepted since the last resize started
    overflow_count: usize,
    /// Incremented each time a resize starts
    generation: u64,
    /// Operation telemetry sink
    counter: Arc<dyn OperationCounter>,
    /// Handle given to newly allocated shards
    myself: WeakActorRef<Self>,
}

impl<V: Value> Actor for TableCoordinator<V> {
    type Args = CoordinatorArgs;
    type Error = Infallible;

    async fn on_start(args: Self::Args, actor_ref: ActorRef<Self>) -> Result<Self, Self::Error> {
        let myself = actor_ref.downgrade();
        let primary = Table::allocate(
            args.config.initial_size,
            0,
            args.config.bucket_capacity,
            &myself,
        );

        events::table_created(primary.size(), args.config.bucket_capacity);
        metrics::set_table_size(primary.size());

        Ok(Self {
            config: args.config,
            primary,
            migration: None,
            overflow_count: 0,
            generation: 0,
            counter: args.counter,
            myself,
        })
    }
}

impl<V: Value> TableCoordinator<V> {
    /// Spawn a coordinator and its initial table on an unbounded mailbox.
    pub(crate) fn spawn_for(
        config: MapConfig,
        counter: Arc<dyn OperationCounter>,
    ) -> ActorRef<Self> {
        Self::spawn_with_mailbox(CoordinatorArgs { config, counter }, mailbox::unbounded())
    }

    fn is_resizing(&self) -> bool {
        self.migration.is_some()
    }

    /// Ask one shard for a key, treating an unreachable shard as a miss.
    async fn query(shard_id: usize, shard: &ActorRef<Shard<V>>, key: Key) -> Option<V> {
        match shard.ask(Get { key }).send().await {
            Ok(value) => value,
            Err(e) => {
                warn!(shard_id, key, error = %e, "Failed to query shard");
                None
            }
        }
    }

    /// Allocate the secondary table and enter RESIZING.
    ///
    /// Called in-line from the overflow handler and from `commit_resize`: a
    /// request to our own mailbox would not be processed until the running
    /// handler returned.
    fn begin_resize(&mut self) -> bool {
        if self.is_resizing() {
            return false;
        }

        let from_size = self.primary.size();
        let to_size = grown_size(from_size);
        let secondary = Table::allocate(
            to_size,
            self.generation + 1,
            self.config.bucket_capacity,
            &self.myself,
        );

        self.generation += 1;
        self.overflow_count = 0;
        self.migration = Some(Migration {
            secondary,
            done: vec![false; from_size],
        });

        events::resize_started(from_size, to_size, self.generation);
        metrics::record_resize_started();
        true
    }

    /// Swap the secondary table in and retire the drained primary.
    ///
    /// Overflow reports from the new primary's shards were counted while it
    /// filled; a shard reports only once, so if they already exceed the
    /// threshold the next resize starts here.
    async fn commit_resize(&mut self) {
        let Some(migration) = self.migration.take() else {
            return;
        };

        let retired = std::mem::replace(&mut self.primary, migration.secondary);

        events::resize_committed(retired.size(), self.primary.size(), self.generation);
        metrics::record_resize_committed();
        metrics::set_table_size(self.primary.size());

        retired.retire().await;

        if self.overflow_exceeded() {
            self.begin_resize();
        }
    }

    fn overflow_exceeded(&self) -> bool {
        self.overflow_count > self.primary.size() / 2
    }

    /// Forward a delete the primary shard could not satisfy.
    ///
    /// The resizing hint is cleared so the secondary shard never bounces the
    /// request back.
    async fn forward_secondary_delete(&self, key: Key) {
        let Some(migration) = &self.migration else {
            return;
        };

        let (shard_id, shard) = migration.secondary.route(key);
        trace!(key, shard_id, "Forwarding delete to secondary table");

        let delete = Delete {
            key,
            resizing: false,
        };
        if let Err(e) = shard.tell(delete).send().await {
            warn!(shard_id, key, error = %e, "Failed to forward delete");
        }
    }

    fn stats(&self) -> TableStats {
        TableStats {
            primary_size: self.primary.size(),
            secondary_size: self.migration.as_ref().map(|m| m.secondary.size()),
            completion: self.migration.as_ref().map(|m| m.done.clone()),
            resizing: self.is_resizing(),
            generation: self.generation,
            overflow_count: self.overflow_count,
        }
    }
}

impl<V: Value> Message<Lookup> for TableCoordinator<V> {
    type Reply = Option<V>;

    async fn handle(&mut self, msg: Lookup, _ctx: &mut Context<Self, Self::Reply>) -> Self::Reply {
        self.counter.increment(Operation::Get);

        let (shard_id, shard) = self.primary.route(msg.key);
        if let Some(value) = Self::query(shard_id, shard, msg.key).await {
            return Some(value);
        }

        match &self.migration {
            Some(migration) => {
                let (shard_id, shard) = migration.secondary.route(msg.key);
                Self::query(shard_id, shard, msg.key).await
            }
            None => None,
        }
    }
}

impl<V: Value> Message<Insert<V>> for TableCoordinator<V> {
    type Reply = ();

    async fn handle(&mut self, msg: Insert<V>, _ctx: &mut Context<Self, Self::Reply>) -> Self::Reply {
        self.counter.increment(Operation::Set);

        let Insert { key, value } = msg;
        let (source_id, source) = self.primary.route(key);

        let Some(migration) = &self.migration else {
            let set = Set {
                key,
                value,
                origin: WriteOrigin::Client,
            };
            if let Err(e) = source.tell(set).send().await {
                warn!(shard_id = source_id, key, error = %e, "Failed to dispatch set");
            }
            return;
        };

        // Writes during a resize land in the secondary table.
        let (target_id, target) = migration.secondary.route(key);
        let set = Set {
            key,
            value,
            origin: WriteOrigin::Client,
        };
        if let Err(e) = target.tell(set).send().await {
            warn!(shard_id = target_id, key, error = %e, "Failed to dispatch set");
        }

        // The primary shard must not keep serving the superseded value.
        let evict = Delete {
            key,
            resizing: false,
        };
        if let Err(e) = source.tell(evict).send().await {
            warn!(shard_id = source_id, key, error = %e, "Failed to evict superseded entry");
        }

        let batch = Move {
            count: self.primary.size() / 2,
            shard_id: source_id,
            secondary: migration.secondary.clone(),
        };
        debug!(
            key,
            source_id,
            target_id,
            count = batch.count,
            "Write during resize; migrating batch"
        );
        if let Err(e) = source.tell(batch).send().await {
            warn!(shard_id = source_id, error = %e, "Failed to request migration batch");
        }
    }
}

impl<V: Value> Message<Remove> for TableCoordinator<V> {
    type Reply = ();

    async fn handle(&mut self, msg: Remove, _ctx: &mut Context<Self, Self::Reply>) -> Self::Reply {
        self.counter.increment(Operation::Delete);

        let (shard_id, shard) = self.primary.route(msg.key);
        let delete = Delete {
            key: msg.key,
            resizing: self.is_resizing(),
        };

        if !delete.resizing {
            if let Err(e) = shard.tell(delete).send().await {
                warn!(shard_id, key = msg.key, error = %e, "Failed to dispatch delete");
            }
            return;
        }

        // Wait for the primary shard's verdict so the forwarded delete cannot
        // overtake a later write to the same key.
        match shard.ask(delete).send().await {
            Ok(DeleteOutcome::CheckSecondary) => self.forward_secondary_delete(msg.key).await,
            Ok(_) => {}
            Err(e) => {
                warn!(shard_id, key = msg.key, error = %e, "Failed to dispatch delete");
            }
        }
    }
}

impl<V: Value> Message<BucketOverflow> for TableCoordinator<V> {
    type Reply = ();

    async fn handle(
        &mut self,
        msg: BucketOverflow,
        _ctx: &mut Context<Self, Self::Reply>,
    ) -> Self::Reply {
        if msg.generation != self.generation {
            events::stale_signal_ignored(
                "bucket_overflow",
                msg.shard_id,
                msg.generation,
                self.generation,
            );
            return;
        }

        self.overflow_count += 1;
        let threshold = self.primary.size() / 2;

        events::bucket_overflow(msg.shard_id, msg.generation, self.overflow_count, threshold);
        metrics::record_bucket_overflow();

        if self.overflow_exceeded() && !self.is_resizing() {
            self.begin_resize();
        }
    }
}

impl<V: Value> Message<DoneMoving> for TableCoordinator<V> {
    type Reply = ();

    async fn handle(&mut self, msg: DoneMoving, _ctx: &mut Context<Self, Self::Reply>) -> Self::Reply {
        let draining_generation = self.primary.generation();

        let Some(migration) = self.migration.as_mut() else {
            events::stale_signal_ignored("done_moving", msg.shard_id, msg.generation, self.generation);
            return;
        };

        if msg.generation != draining_generation || msg.shard_id >= migration.done.len() {
            events::stale_signal_ignored("done_moving", msg.shard_id, msg.generation, self.generation);
            return;
        }

        migration.done[msg.shard_id] = true;
        let remaining = migration.done.iter().filter(|done| !**done).count();
        events::shard_drained(msg.shard_id, msg.generation, remaining);

        if remaining == 0 {
            self.commit_resize().await;
        }
    }
}

#[cfg(test)]
impl<V: Value> Message<TriggerResize> for TableCoordinator<V> {
    type Reply = ResizeAck;

    async fn handle(
        &mut self,
        _msg: TriggerResize,
        _ctx: &mut Context<Self, Self::Reply>,
    ) -> Self::Reply {
        let started = self.begin_resize();
        if !started {
            debug!("Resize already in flight; trigger ignored");
        }

        ResizeAck {
            started,
            primary_size: self.primary.size(),
            secondary_size: self.migration.as_ref().map(|m| m.secondary.size()),
        }
    }
}

impl<V: Value> Message<GetTableStats> for TableCoordinator<V> {
    type Reply = TableStats;

    async fn handle(
        &mut self,
        _msg: GetTableStats,
        _ctx: &mut Context<Self, Self::Reply>,
    ) -> Self::Reply {
        self.stats()
    }
}

#[cfg(test)]
impl<V: Value> Message<InspectPrimary> for TableCoordinator<V> {
    type Reply = TableSnapshot;

    async fn handle(
        &mut self,
        _msg: InspectPrimary,
        _ctx: &mut Context<Self, Self::Reply>,
    ) -> Self::Reply {
        let mut shards = Vec::with_capacity(self.primary.size());
        for id in 0..self.primary.size() {
            if let Ok(snapshot) = self.primary.shard(id).ask(Inspect).send().await {
                shards.push(snapshot);
            }
        }
        TableSnapshot { shards }
    }
}
