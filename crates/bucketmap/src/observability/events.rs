//! Structured Events
//!
//! Provides structured event logging with consistent fields across the
//! coordinator. Each event type has a dedicated function so field names stay
//! the same wherever the event is emitted.
//!
//! Event types:
//! - `table_created` - Initial table allocated
//! - `resize_started` - Secondary table allocated, generation bumped
//! - `resize_committed` - Secondary table swapped in as primary
//! - `bucket_overflow` - A shard reached capacity
//! - `shard_drained` - A draining shard finished migrating
//! - `stale_signal_ignored` - A shard signal from another generation was dropped

use tracing::{debug, info};

/// Emit a table created event
pub fn table_created(size: usize, bucket_capacity: usize) {
    info!(
        event_type = "table_created",
        size = size,
        bucket_capacity = bucket_capacity,
        "Table created"
    );
}

/// Emit a resize started event
pub fn resize_started(from_size: usize, to_size: usize, generation: u64) {
    info!(
        event_type = "resize_started",
        from_size = from_size,
        to_size = to_size,
        generation = generation,
        "Resize started"
    );
}

/// Emit a resize committed event
pub fn resize_committed(retired_size: usize, new_size: usize, generation: u64) {
    info!(
        event_type = "resize_committed",
        retired_size = retired_size,
        new_size = new_size,
        generation = generation,
        "Resize committed"
    );
}

/// Emit a bucket overflow event
pub fn bucket_overflow(shard_id: usize, generation: u64, overflow_count: usize, threshold: usize) {
    debug!(
        event_type = "bucket_overflow",
        shard_id = shard_id,
        generation = generation,
        overflow_count = overflow_count,
        threshold = threshold,
        "Bucket overflow"
    );
}

/// Emit a shard drained event
pub fn shard_drained(shard_id: usize, generation: u64, remaining: usize) {
    debug!(
        event_type = "shard_drained",
        shard_id = shard_id,
        generation = generation,
        remaining = remaining,
        "Shard drained"
    );
}

/// Emit a stale signal event
pub fn stale_signal_ignored(
    signal: &str,
    shard_id: usize,
    reported_generation: u64,
    current_generation: u64,
) {
    debug!(
        event_type = "stale_signal_ignored",
        signal = %signal,
        shard_id = shard_id,
        reported_generation = reported_generation,
        current_generation = current_generation,
        "Ignored stale shard signal"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_functions_dont_panic() {
        table_created(4, 4);
        resize_started(4, 8, 1);
        resize_committed(4, 8, 1);
        bucket_overflow(2, 0, 3, 2);
        shard_drained(2, 0, 3);
        stale_signal_ignored("bucket_overflow", 1, 0, 1);
    }
}
