//! Segment name parsing.
//!
//! Realtime segment names encode how the segment consumes its stream:
//!
//! - **Group-replica consumers** (the older model): one of several redundant
//!   consumers sharing a group identifier,
//!   `{group_id}__{partition_range}__{sequence}`
//! - **Partition-level consumers** (the low-latency model): a segment
//!   assigned to consume exactly one stream partition,
//!   `{table}__{partition_id}__{sequence}__{creation_time}`
//!
//! All knowledge of the convention lives in [`ConsumerSegment::parse`];
//! nothing else in the workspace inspects segment name strings.

use serde::{Deserialize, Serialize};

/// Separator between segment name components.
const SEPARATOR: &str = "__";

/// A segment name parsed into its consumer kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConsumerSegment {
    /// A replica of a redundant consumer group. Only one group's segments
    /// should be counted when aggregating volume, the rest are duplicates.
    GroupReplica { group_id: String },
    /// A segment consuming exactly one stream partition.
    PartitionConsumer { partition_id: u32 },
}

impl ConsumerSegment {
    /// Parse a segment name into its consumer kind.
    ///
    /// Returns `None` for names matching neither convention (offline
    /// segments, malformed names).
    pub fn parse(name: &str) -> Option<ConsumerSegment> {
        let parts: Vec<&str> = name.split(SEPARATOR).collect();
        if parts.iter().any(|part| part.is_empty()) {
            return None;
        }
        match parts.len() {
            3 => Some(ConsumerSegment::GroupReplica {
                group_id: parts[0].to_string(),
            }),
            4 => parts[1]
                .parse::<u32>()
                .ok()
                .map(|partition_id| ConsumerSegment::PartitionConsumer { partition_id }),
            _ => None,
        }
    }

    /// Whether a name follows the partition-level consumer convention.
    pub fn is_partition_consumer(name: &str) -> bool {
        matches!(
            Self::parse(name),
            Some(ConsumerSegment::PartitionConsumer { .. })
        )
    }
}
