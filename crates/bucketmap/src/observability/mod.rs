//! Observability Module
//!
//! Provides observability for the shard actor system:
//! - `counter`: the operation counter collaborator (get/set/delete tallies)
//! - `metrics`: Prometheus metrics for table sizes and resize activity
//! - `events`: Structured event logging with consistent fields
//! - `tracing`: tracing-subscriber setup

pub mod counter;
pub mod events;
pub mod metrics;
pub mod tracing;

pub use counter::{MetricsCounter, NoopCounter, Operation, OperationCounter};
pub use metrics::{init_metrics, MetricsState};
pub use tracing::{init_tracing, TracingConfig};
