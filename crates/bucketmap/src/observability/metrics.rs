//! Prometheus Metrics
//!
//! Defines and initializes the Prometheus metrics for bucketmap.
//!
//! Metrics tracked:
//! - `bucketmap_operations_total` - counter of client operations by kind
//! - `bucketmap_bucket_overflows_total` - counter of accepted overflow reports
//! - `bucketmap_resizes_started_total` - counter of resizes started
//! - `bucketmap_resizes_committed_total` - counter of resizes committed
//! - `bucketmap_table_size` - gauge of shards in the primary table

use metrics::{counter, describe_counter, describe_gauge, gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// State containing the Prometheus handle for metrics export
#[derive(Clone)]
pub struct MetricsState {
    pub prometheus_handle: PrometheusHandle,
}

impl MetricsState {
    /// Render the current metrics in the Prometheus text format.
    pub fn render(&self) -> String {
        self.prometheus_handle.render()
    }
}

/// Initialize Prometheus metrics and return the handle for exporting.
///
/// This function:
/// 1. Sets up the Prometheus recorder
/// 2. Registers all metric descriptions
/// 3. Returns a handle that can be used to render metrics
pub fn init_metrics() -> Result<MetricsState, Box<dyn std::error::Error + Send + Sync>> {
    let handle = PrometheusBuilder::new().install_recorder()?;

    register_metric_descriptions();

    Ok(MetricsState {
        prometheus_handle: handle,
    })
}

/// Register descriptions for all metrics
fn register_metric_descriptions() {
    describe_counter!(
        "bucketmap_operations_total",
        "Total number of client operations by kind"
    );
    describe_counter!(
        "bucketmap_bucket_overflows_total",
        "Total number of shard overflow reports counted toward a resize"
    );
    describe_counter!(
        "bucketmap_resizes_started_total",
        "Total number of resizes started"
    );
    describe_counter!(
        "bucketmap_resizes_committed_total",
        "Total number of resizes committed"
    );
    describe_gauge!(
        "bucketmap_table_size",
        "Number of shards in the primary table"
    );
}

/// Record an accepted overflow report
pub fn record_bucket_overflow() {
    counter!("bucketmap_bucket_overflows_total").increment(1);
}

/// Record that a resize started
pub fn record_resize_started() {
    counter!("bucketmap_resizes_started_total").increment(1);
}

/// Record that a resize committed
pub fn record_resize_committed() {
    counter!("bucketmap_resizes_committed_total").increment(1);
}

/// Update the primary table size gauge
pub fn set_table_size(size: usize) {
    gauge!("bucketmap_table_size").set(size as f64);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_recording() {
        // These functions should not panic without an installed recorder
        record_bucket_overflow();
        record_resize_started();
        record_resize_committed();
        set_table_size(8);
    }
}
