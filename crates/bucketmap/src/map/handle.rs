//! ShardedMap
//!
//! Client handle for a running map. Every operation is a request to the
//! table coordinator; the handle itself holds no table state.

use super::coordinator::TableCoordinator;
use super::messages::{GetTableStats, Insert, Lookup, Remove, TableStats};
use crate::config::MapConfig;
use crate::error::MapError;
use crate::models::{Key, Value};
use crate::observability::{MetricsCounter, OperationCounter};
use kameo::actor::ActorRef;
use std::fmt::Display;
use std::sync::Arc;
use tracing::info;

/// Opaque handle to a running map.
///
/// Clones share the same coordinator. The map lives until the last handle is
/// dropped or `shutdown` is called.
pub struct ShardedMap<V: Value> {
    coordinator: ActorRef<TableCoordinator<V>>,
}

impl<V: Value> Clone for ShardedMap<V> {
    fn clone(&self) -> Self {
        Self {
            coordinator: self.coordinator.clone(),
        }
    }
}

impl<V: Value> ShardedMap<V> {
    /// Spawn a map that reports operation counts through the `metrics` facade.
    pub fn spawn(config: MapConfig) -> Result<Self, MapError> {
        Self::spawn_with_counter(config, Arc::new(MetricsCounter))
    }

    /// Spawn a map that reports operation counts to `counter`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn_with_counter(
        config: MapConfig,
        counter: Arc<dyn OperationCounter>,
    ) -> Result<Self, MapError> {
        config.validate()?;

        info!(
            initial_size = config.initial_size,
            bucket_capacity = config.bucket_capacity,
            "Spawning sharded map"
        );

        Ok(Self {
            coordinator: TableCoordinator::spawn_for(config, counter),
        })
    }

    /// Value stored under `key`, or `None`.
    pub async fn get(&self, key: Key) -> Result<Option<V>, MapError> {
        self.coordinator
            .ask(Lookup { key })
            .send()
            .await
            .map_err(unavailable)
    }

    /// Insert or replace the value under `key`.
    pub async fn set(&self, key: Key, value: V) -> Result<(), MapError> {
        self.coordinator
            .ask(Insert { key, value })
            .send()
            .await
            .map_err(unavailable)
    }

    /// Remove `key`. Removing a missing key is not an error.
    pub async fn delete(&self, key: Key) -> Result<(), MapError> {
        self.coordinator
            .ask(Remove { key })
            .send()
            .await
            .map_err(unavailable)
    }

    /// Snapshot of the table sizes and resize progress.
    pub async fn stats(&self) -> Result<TableStats, MapError> {
        self.coordinator
            .ask(GetTableStats)
            .send()
            .await
            .map_err(unavailable)
    }

    /// Stop the coordinator after it has processed its pending requests.
    ///
    /// The shard actors stop once the coordinator's tables are dropped.
    pub async fn shutdown(self) {
        info!("Shutting down sharded map");
        self.coordinator.stop_gracefully().await.ok();
    }

    #[cfg(test)]
    pub(crate) fn coordinator(&self) -> &ActorRef<TableCoordinator<V>> {
        &self.coordinator
    }
}

fn unavailable<E: Display>(e: E) -> MapError {
    MapError::CoordinatorUnavailable(e.to_string())
}
