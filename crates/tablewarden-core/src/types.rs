//! Table and segment domain types.
//!
//! Tables come in two flavors. Offline tables are populated by bulk segment
//! pushes and are expected to form a contiguous time-ordered sequence.
//! Realtime tables are populated by continuous ingestion from a partitioned
//! stream. The table type decides which reconciliation checks apply, and is
//! encoded as a suffix on the table name (`orders_OFFLINE`,
//! `orders_REALTIME`).

use serde::{Deserialize, Serialize};

use crate::interval::TimeInterval;

/// Table name suffix for offline tables.
pub const OFFLINE_SUFFIX: &str = "_OFFLINE";

/// Table name suffix for realtime tables.
pub const REALTIME_SUFFIX: &str = "_REALTIME";

/// The kind of table, determining which validators apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TableType {
    /// Populated by bulk segment pushes; checked for continuity.
    Offline,
    /// Populated by continuous stream ingestion; checked for consumption
    /// liveness.
    Realtime,
}

impl TableType {
    /// Derive the table type from the table name suffix.
    ///
    /// Returns `None` for names that carry neither suffix; the dispatcher
    /// logs and skips those.
    pub fn from_table_name(name: &str) -> Option<TableType> {
        if name.ends_with(OFFLINE_SUFFIX) {
            Some(TableType::Offline)
        } else if name.ends_with(REALTIME_SUFFIX) {
            Some(TableType::Realtime)
        } else {
            None
        }
    }
}

/// Per-segment metadata view used by the validators.
///
/// Reconstructed fresh every reconciliation pass from the metadata store;
/// never persisted by the controller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentFacts {
    /// Segment name. Encodes the consumer kind for realtime segments, see
    /// [`crate::segment_name`].
    pub name: String,
    /// Time bounds of the data in the segment, absent for segments with no
    /// temporal dimension.
    pub interval: Option<TimeInterval>,
    /// When the segment was pushed, epoch millis. Zero when unknown.
    pub push_time_ms: i64,
    /// When the segment was last refreshed, epoch millis. Zero when never
    /// refreshed.
    pub refresh_time_ms: i64,
    /// Raw document count in the segment.
    pub total_docs: i64,
    /// The table's declared inter-segment spacing, carried on each fact.
    pub granularity_ms: Option<i64>,
}

impl SegmentFacts {
    /// Latest of push time and refresh time.
    pub fn update_time_ms(&self) -> i64 {
        self.push_time_ms.max(self.refresh_time_ms)
    }
}
