//! Operation Counter
//!
//! Fire-and-forget tally of client operations. Counters receive one
//! notification per `get`, `set` or `delete` handled by the coordinator and
//! return nothing; they have no say in routing or resizing.

use metrics::counter;
use strum::{Display, EnumString};

/// Client operation kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum Operation {
    Get,
    Set,
    Delete,
}

/// Sink for operation notifications.
pub trait OperationCounter: Send + Sync + 'static {
    fn increment(&self, op: Operation);
}

/// Counts operations in `bucketmap_operations_total`, labelled by operation.
#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsCounter;

impl OperationCounter for MetricsCounter {
    fn increment(&self, op: Operation) {
        counter!("bucketmap_operations_total", "operation" => op.to_string()).increment(1);
    }
}

/// Discards every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopCounter;

impl OperationCounter for NoopCounter {
    fn increment(&self, _op: Operation) {}
}
