//! Bucketmap demo workload
//!
//! Writes a batch of keys through several resizes, reads them back, deletes
//! half of them and prints the final table state and metrics.

use anyhow::{anyhow, ensure, Result};
use bucketmap::observability::{init_metrics, init_tracing, TracingConfig};
use bucketmap::{MapConfig, ShardedMap};
use tracing::info;

/// Number of keys written by the workload (env: BUCKETMAP_WORKLOAD_KEYS)
const WORKLOAD_KEYS_VAR: &str = "BUCKETMAP_WORKLOAD_KEYS";
const DEFAULT_WORKLOAD_KEYS: u64 = 1000;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing(TracingConfig::from_env()).map_err(|e| anyhow!(e))?;
    let metrics = init_metrics().map_err(|e| anyhow!(e))?;

    let config = MapConfig::from_env()?;
    let keys = match std::env::var(WORKLOAD_KEYS_VAR) {
        Ok(value) => value.trim().parse::<u64>()?,
        Err(_) => DEFAULT_WORKLOAD_KEYS,
    };

    info!(
        initial_size = config.initial_size,
        bucket_capacity = config.bucket_capacity,
        keys = keys,
        "Starting bucketmap workload"
    );

    let map: ShardedMap<String> = ShardedMap::spawn(config)?;

    for key in 0..keys {
        map.set(key, format!("value-{key}")).await?;
    }

    for key in 0..keys {
        let value = map.get(key).await?;
        ensure!(
            value.as_deref() == Some(format!("value-{key}").as_str()),
            "key {key} read back {value:?}"
        );
    }

    for key in (0..keys).step_by(2) {
        map.delete(key).await?;
    }

    for key in 0..keys {
        let present = map.get(key).await?.is_some();
        ensure!(present == (key % 2 == 1), "key {key} presence is {present}");
    }

    let stats = map.stats().await?;
    info!(
        primary_size = stats.primary_size,
        resizing = stats.resizing,
        generation = stats.generation,
        "Workload complete"
    );

    println!("{}", serde_json::to_string_pretty(&stats)?);
    println!("{}", metrics.render());

    map.shutdown().await;

    Ok(())
}
