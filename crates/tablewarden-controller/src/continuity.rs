//! Offline-table continuity checking.
//!
//! Offline tables are populated by bulk segment pushes and should form a
//! contiguous time-ordered sequence. This validator computes the gaps in
//! that sequence plus the freshness and volume aggregates the gauges are
//! built from. It is a pure function over the table's segment facts; the
//! dispatcher owns logging and gauge emission.

use tablewarden_core::{compute_missing_intervals, is_valid_timestamp, SegmentFacts, TimeInterval};

/// Aggregates produced by one continuity check.
#[derive(Debug, Clone)]
pub struct ContinuityReport {
    /// One synthesized interval per expected-but-absent segment slot.
    pub missing_intervals: Vec<TimeInterval>,
    /// Latest interval end across all segments, `i64::MIN` when none found.
    pub max_end_time_ms: i64,
    /// Latest push/refresh time across all segments, `i64::MIN` when none
    /// found.
    pub max_push_time_ms: i64,
    /// Sum of raw document counts.
    pub total_docs: i64,
    pub segment_count: usize,
}

/// Check one offline table's segment sequence for gaps and compute its
/// freshness and volume aggregates.
///
/// Gap detection only runs with more than two segments, filtered to
/// intervals whose endpoints pass the timestamp sanity bounds, using the
/// first segment's declared granularity as the expected frequency. Tables
/// with two or fewer segments always report zero missing intervals; that is
/// a deliberate floor, not a false negative.
///
/// The freshness scan covers all segments regardless of the sanity filter,
/// so a table whose every interval is bogus still gets delay gauges (pegged
/// via the sentinel).
pub fn check_continuity(segments: &[SegmentFacts]) -> ContinuityReport {
    let missing_intervals = if segments.len() > 2 {
        let candidate_intervals: Vec<TimeInterval> = segments
            .iter()
            .filter_map(|facts| facts.interval)
            .filter(|interval| {
                is_valid_timestamp(interval.start_ms) && is_valid_timestamp(interval.end_ms)
            })
            .collect();

        compute_missing_intervals(&candidate_intervals, segments[0].granularity_ms)
    } else {
        Vec::new()
    };

    let mut max_end_time_ms = i64::MIN;
    let mut max_push_time_ms = i64::MIN;
    let mut total_docs = 0i64;
    for facts in segments {
        if let Some(interval) = facts.interval {
            max_end_time_ms = max_end_time_ms.max(interval.end_ms);
        }
        max_push_time_ms = max_push_time_ms.max(facts.update_time_ms());
        total_docs += facts.total_docs;
    }

    ContinuityReport {
        missing_intervals,
        max_end_time_ms,
        max_push_time_ms,
        total_docs,
        segment_count: segments.len(),
    }
}
