//! Reconciliation gauges.
//!
//! Current-state gauges keyed by table. The controller overwrites them on
//! every pass; there is no history, only the latest observed state (alerting
//! history is the metrics backend's job).
//!
//! The freshness gauges (`offline_segment_delay_ms`, `last_push_delay_ms`)
//! take the raw timestamp found in segment metadata and store the age
//! relative to now; the sentinel `i64::MIN` for "no timestamp found"
//! saturates to a very large age, which pegs the alert rather than hiding
//! the table.

use lazy_static::lazy_static;
use prometheus::{IntCounter, IntCounterVec, IntGaugeVec, Opts, Registry};
use std::sync::Once;

static INIT: Once = Once::new();

lazy_static! {
    /// Global Prometheus metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    // ============================================================================
    // Offline Table Gauges
    // ============================================================================

    /// Missing segments detected by continuity checking
    pub static ref TABLE_MISSING_SEGMENTS: IntGaugeVec = IntGaugeVec::new(
        Opts::new("tablewarden_table_missing_segments", "Missing segments detected in the table's time sequence"),
        &["table"]
    ).expect("metric can be created");

    /// Age of the newest segment end time
    pub static ref TABLE_OFFLINE_SEGMENT_DELAY_MS: IntGaugeVec = IntGaugeVec::new(
        Opts::new("tablewarden_table_offline_segment_delay_ms", "Milliseconds since the latest segment end time"),
        &["table"]
    ).expect("metric can be created");

    /// Age of the newest push or refresh
    pub static ref TABLE_LAST_PUSH_DELAY_MS: IntGaugeVec = IntGaugeVec::new(
        Opts::new("tablewarden_table_last_push_delay_ms", "Milliseconds since the latest segment push or refresh"),
        &["table"]
    ).expect("metric can be created");

    /// Segment count per table
    pub static ref TABLE_SEGMENT_COUNT: IntGaugeVec = IntGaugeVec::new(
        Opts::new("tablewarden_table_segment_count", "Number of segments in the table"),
        &["table"]
    ).expect("metric can be created");

    // ============================================================================
    // Shared Gauges
    // ============================================================================

    /// Total document count per table
    pub static ref TABLE_TOTAL_DOCUMENTS: IntGaugeVec = IntGaugeVec::new(
        Opts::new("tablewarden_table_total_documents", "Total raw documents across the table's segments"),
        &["table"]
    ).expect("metric can be created");

    // ============================================================================
    // Realtime Table Gauges
    // ============================================================================

    /// Stream partitions with no consuming segment
    pub static ref TABLE_NON_CONSUMING_PARTITIONS: IntGaugeVec = IntGaugeVec::new(
        Opts::new("tablewarden_table_non_consuming_partitions", "Stream partitions with no segment in consuming state"),
        &["table"]
    ).expect("metric can be created");

    // ============================================================================
    // Controller Metrics
    // ============================================================================

    /// Completed reconciliation passes
    pub static ref RECONCILIATION_PASSES_TOTAL: IntCounter = IntCounter::new(
        "tablewarden_reconciliation_passes_total",
        "Total completed reconciliation passes"
    ).expect("metric can be created");

    /// Per-table reconciliation failures
    pub static ref TABLE_FAILURES_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("tablewarden_table_failures_total", "Reconciliation failures per table"),
        &["table"]
    ).expect("metric can be created");
}

/// Initialize the metrics registry.
/// Can be called multiple times safely (idempotent).
pub fn init() {
    INIT.call_once(|| {
        REGISTRY
            .register(Box::new(TABLE_MISSING_SEGMENTS.clone()))
            .expect("table_missing_segments can be registered");
        REGISTRY
            .register(Box::new(TABLE_OFFLINE_SEGMENT_DELAY_MS.clone()))
            .expect("table_offline_segment_delay_ms can be registered");
        REGISTRY
            .register(Box::new(TABLE_LAST_PUSH_DELAY_MS.clone()))
            .expect("table_last_push_delay_ms can be registered");
        REGISTRY
            .register(Box::new(TABLE_SEGMENT_COUNT.clone()))
            .expect("table_segment_count can be registered");
        REGISTRY
            .register(Box::new(TABLE_TOTAL_DOCUMENTS.clone()))
            .expect("table_total_documents can be registered");
        REGISTRY
            .register(Box::new(TABLE_NON_CONSUMING_PARTITIONS.clone()))
            .expect("table_non_consuming_partitions can be registered");
        REGISTRY
            .register(Box::new(RECONCILIATION_PASSES_TOTAL.clone()))
            .expect("reconciliation_passes_total can be registered");
        REGISTRY
            .register(Box::new(TABLE_FAILURES_TOTAL.clone()))
            .expect("table_failures_total can be registered");
    });
}

fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Record the missing-segment count for a table.
pub fn record_missing_segments(table: &str, count: usize) {
    TABLE_MISSING_SEGMENTS
        .with_label_values(&[table])
        .set(count as i64);
}

/// Record the offline segment delay from the latest segment end time.
/// The sink computes the age; callers pass the raw timestamp.
pub fn record_offline_segment_delay(table: &str, max_end_time_ms: i64) {
    TABLE_OFFLINE_SEGMENT_DELAY_MS
        .with_label_values(&[table])
        .set(now_ms().saturating_sub(max_end_time_ms));
}

/// Record the push delay from the latest push/refresh time.
pub fn record_last_push_delay(table: &str, max_push_time_ms: i64) {
    TABLE_LAST_PUSH_DELAY_MS
        .with_label_values(&[table])
        .set(now_ms().saturating_sub(max_push_time_ms));
}

/// Record the total raw document count for a table.
pub fn record_total_documents(table: &str, total_docs: i64) {
    TABLE_TOTAL_DOCUMENTS
        .with_label_values(&[table])
        .set(total_docs);
}

/// Record the segment count for a table.
pub fn record_segment_count(table: &str, count: usize) {
    TABLE_SEGMENT_COUNT
        .with_label_values(&[table])
        .set(count as i64);
}

/// Record the number of partitions without a consuming segment.
pub fn record_non_consuming_partitions(table: &str, count: usize) {
    TABLE_NON_CONSUMING_PARTITIONS
        .with_label_values(&[table])
        .set(count as i64);
}

/// Count a completed reconciliation pass.
pub fn count_pass() {
    RECONCILIATION_PASSES_TOTAL.inc();
}

/// Count a per-table reconciliation failure.
pub fn count_table_failure(table: &str) {
    TABLE_FAILURES_TOTAL.with_label_values(&[table]).inc();
}
