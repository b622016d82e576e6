//! Interval math for segment continuity checking.
//!
//! Offline tables are expected to contain one segment per granularity bucket
//! (daily tables have one segment per day, and so on). This module provides
//! the two gap-detection routines used by the continuity validator:
//!
//! - [`compute_missing_intervals`]: bucket-floor detection over full
//!   `[start, end]` intervals, producing one synthesized interval per missing
//!   bucket
//! - [`count_missing_segments`]: a coarser rounded-to-nearest counter that
//!   operates on start times only, for callers that have no end timestamps
//!
//! The two deliberately round differently and are kept as separate routines;
//! callers rely on their specific rounding behavior.
//!
//! All timestamps are epoch milliseconds.

use serde::{Deserialize, Serialize};

const HOUR_MS: i64 = 60 * 60 * 1000;
const DAY_MS: i64 = 24 * HOUR_MS;

/// Lower bound of the timestamp sanity range: 1971-01-01 UTC.
pub const MIN_VALID_TIME_MS: i64 = 31_536_000_000;

/// Upper bound of the timestamp sanity range: 2071-01-01 UTC.
pub const MAX_VALID_TIME_MS: i64 = 3_187_296_000_000;

/// A time range `[start_ms, end_ms]` attached to one segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeInterval {
    pub start_ms: i64,
    pub end_ms: i64,
}

impl TimeInterval {
    pub fn new(start_ms: i64, end_ms: i64) -> Self {
        Self { start_ms, end_ms }
    }
}

impl std::fmt::Display for TimeInterval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}]", self.start_ms, self.end_ms)
    }
}

/// Whether a timestamp falls within the epoch sanity bounds.
///
/// Segment intervals with an endpoint outside this range are excluded from
/// continuity math (they are almost always unit-confusion artifacts, seconds
/// stored as millis or vice versa) but still count toward volume metrics.
pub fn is_valid_timestamp(time_ms: i64) -> bool {
    (MIN_VALID_TIME_MS..MAX_VALID_TIME_MS).contains(&time_ms)
}

/// Normalize an expected inter-segment frequency.
///
/// Frequencies below one hour are floored up to one day: sub-hourly
/// granularities are noise at reconciliation timescales and would flag a gap
/// for every scheduling hiccup.
pub fn normalize_frequency(frequency_ms: i64) -> i64 {
    if frequency_ms < HOUR_MS {
        DAY_MS
    } else {
        frequency_ms
    }
}

/// Compute the list of missing intervals given the existing segment
/// intervals and their expected frequency.
///
/// Buckets every interval relative to the earliest start time using floor
/// division, then walks the intervals in start order tracking the highest
/// end bucket seen so far. A run of integer buckets strictly between that
/// high-water mark and the next interval's start bucket is a gap, and one
/// missing interval is synthesized per bucket in the run, spanning
/// `[start + freq * bucket, start + freq * (bucket + 1) - 1]`.
///
/// Because the high-water mark only advances, overlapping or contained
/// intervals never produce spurious gaps, and the result is invariant under
/// reordering of the input.
///
/// Returns an empty list when `frequency_ms` is absent or when fewer than
/// two intervals are given (no gap is detectable with 0 or 1 data points).
pub fn compute_missing_intervals(
    intervals: &[TimeInterval],
    frequency_ms: Option<i64>,
) -> Vec<TimeInterval> {
    let frequency_ms = match frequency_ms {
        Some(f) => normalize_frequency(f),
        None => return Vec::new(),
    };

    if intervals.len() < 2 {
        return Vec::new();
    }

    let mut sorted = intervals.to_vec();
    sorted.sort_by_key(|interval| interval.start_ms);

    let start_time = sorted[0].start_ms;

    let mut last_end_bucket: i64 = 0;
    let mut missing = Vec::new();
    for interval in &sorted {
        let start_bucket = (interval.start_ms - start_time) / frequency_ms;
        let end_bucket = (interval.end_ms - start_time) / frequency_ms;

        // At least one complete bucket between the highest end seen so far
        // and this interval's start is a gap.
        if last_end_bucket < start_bucket - 1 {
            for bucket in (last_end_bucket + 1)..start_bucket {
                missing.push(TimeInterval::new(
                    start_time + frequency_ms * bucket,
                    start_time + frequency_ms * (bucket + 1) - 1,
                ));
            }
        }

        last_end_bucket = last_end_bucket.max(end_bucket);
    }

    missing
}

/// Count missing segments given sorted segment start times and their
/// expected frequency.
///
/// Rounds each start time to its nearest bucket (half-frequency offset)
/// rather than flooring, which tolerates segments that start slightly early
/// or late. A timestamp landing below the expected bucket is treated as a
/// duplicate and only advances the input index; one landing above adds the
/// full bucket gap to the missing count.
///
/// Unlike [`compute_missing_intervals`] the frequency is used as given, with
/// no sub-hourly normalization.
///
/// Returns 0 for fewer than two timestamps.
pub fn count_missing_segments(sorted_start_times: &[i64], frequency_ms: i64) -> usize {
    if sorted_start_times.len() < 2 {
        return 0;
    }

    let half_frequency_ms = frequency_ms / 2;
    let first_start_time = sorted_start_times[0];
    let last_start_time = sorted_start_times[sorted_start_times.len() - 1];
    let expected_segment_count =
        (last_start_time + half_frequency_ms - first_start_time) / frequency_ms;

    let mut missing_segments = 0usize;
    let mut current_index = 1usize;
    let mut expected_bucket: i64 = 1;
    while expected_bucket <= expected_segment_count {
        if current_index >= sorted_start_times.len() {
            break;
        }

        let bucket =
            (sorted_start_times[current_index] + half_frequency_ms - first_start_time)
                / frequency_ms;

        if bucket == expected_bucket {
            expected_bucket += 1;
            current_index += 1;
        } else if bucket < expected_bucket {
            // Duplicate segment for an already-seen bucket.
            current_index += 1;
        } else {
            missing_segments += (bucket - expected_bucket) as usize;
            expected_bucket = bucket + 1;
            current_index += 1;
        }
    }

    missing_segments
}
