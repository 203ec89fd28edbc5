//! Prometheus metrics for bookkeeping-service.

use once_cell::sync::Lazy;
use prometheus::{
    register_counter, register_counter_vec, register_histogram, Counter, CounterVec, Histogram,
    TextEncoder,
};

/// Payments recorded, by variant.
pub static PAYMENTS_RECORDED: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "bookkeeping_payments_recorded_total",
        "Total number of payments recorded",
        &["kind"] // regular, extra
    )
    .expect("Failed to register payments_recorded_total")
});

/// Full history replays triggered by edits, deletes or config changes.
pub static RECONCILIATIONS_TOTAL: Lazy<Counter> = Lazy::new(|| {
    register_counter!(
        "bookkeeping_reconciliations_total",
        "Total number of full ledger reconciliations"
    )
    .expect("Failed to register reconciliations_total")
});

/// Replay duration; O(history length), so watch the tail.
pub static RECONCILIATION_DURATION: Lazy<Histogram> = Lazy::new(|| {
    register_histogram!(
        "bookkeeping_reconciliation_duration_seconds",
        "Full reconciliation duration in seconds",
        vec![0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0]
    )
    .expect("Failed to register reconciliation_duration")
});

/// Snapshot write duration.
pub static SNAPSHOT_WRITE_DURATION: Lazy<Histogram> = Lazy::new(|| {
    register_histogram!(
        "bookkeeping_snapshot_write_duration_seconds",
        "Ledger snapshot write duration in seconds",
        vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0]
    )
    .expect("Failed to register snapshot_write_duration")
});

/// Initialize all metrics (forces lazy initialization).
pub fn init_metrics() {
    Lazy::force(&PAYMENTS_RECORDED);
    Lazy::force(&RECONCILIATIONS_TOTAL);
    Lazy::force(&RECONCILIATION_DURATION);
    Lazy::force(&SNAPSHOT_WRITE_DURATION);
}

/// Get metrics in Prometheus text format.
pub fn get_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    encoder
        .encode_to_string(&metric_families)
        .unwrap_or_default()
}
