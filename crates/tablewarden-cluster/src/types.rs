//! Value types exchanged with the cluster collaborators.
//!
//! All of these are transient views reconstructed every reconciliation pass.
//! The controller never persists them and never mutates cluster state
//! directly; corrective intent is expressed as a [`CorrectiveRequest`]
//! delegated to the assignment layer.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::{Deserialize, Serialize};
use tablewarden_core::TableType;

/// Per-table configuration resolved from the metadata store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableConfig {
    /// Fully qualified table name, including the type suffix.
    pub name: String,
    pub table_type: TableType,
    /// Broker tenant this table is served by.
    pub broker_tenant: String,
    /// Stream configuration; present only for realtime tables.
    pub stream: Option<StreamConfig>,
}

/// Consumption-model flags from a realtime table's stream configuration.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct StreamConfig {
    /// The stream is consumed through partition-level consumer segments.
    pub partition_level: bool,
    /// The stream still runs the older group-replica consumers.
    pub group_level: bool,
}

impl StreamConfig {
    /// Fully migrated to partition-level consumption: volume metrics count
    /// partition-level segments instead of one replica group.
    pub fn partition_level_only(&self) -> bool {
        self.partition_level && !self.group_level
    }
}

/// Partition-to-hosts mapping for a streaming table. Source of truth for
/// which partitions must have a live consumer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionAssignment {
    /// Partition id to the ordered list of assigned host identifiers.
    pub partitions: BTreeMap<u32, Vec<String>>,
}

impl PartitionAssignment {
    pub fn partition_ids(&self) -> BTreeSet<u32> {
        self.partitions.keys().copied().collect()
    }
}

/// Lifecycle state of one segment replica in the live assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SegmentLifecycleState {
    /// Actively ingesting new records for its partition.
    Consuming,
    /// Sealed and serving queries.
    Online,
    Offline,
    Error,
}

/// The cluster coordination layer's declared segment-to-host mapping for one
/// table, with per-replica lifecycle states.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiveTableAssignment {
    /// Administratively disabled tables are skipped by validation.
    pub enabled: bool,
    /// Segment id to replica host to lifecycle state.
    pub segment_states: HashMap<String, HashMap<String, SegmentLifecycleState>>,
}

impl Default for LiveTableAssignment {
    fn default() -> Self {
        Self {
            enabled: true,
            segment_states: HashMap::new(),
        }
    }
}

impl LiveTableAssignment {
    /// Whether any replica of the segment reports the consuming state.
    pub fn has_consuming_replica(&self, segment_id: &str) -> bool {
        self.segment_states
            .get(segment_id)
            .map(|replicas| {
                replicas
                    .values()
                    .any(|state| *state == SegmentLifecycleState::Consuming)
            })
            .unwrap_or(false)
    }
}

/// A corrective action delegated to an external collaborator.
///
/// Fire-and-forget: the controller never awaits a result and never tracks
/// acknowledgment. Runs are at-least-once, so downstream handling of every
/// variant must be idempotent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CorrectiveRequest {
    /// Create replacement consuming segments for a batch of partitions,
    /// given the current partition-level segments as placement context.
    CreateConsumingSegments {
        table: String,
        partitions: BTreeSet<u32>,
        current_segments: Vec<String>,
    },
    /// Recompute or verify the partition-to-host assignment, in case the
    /// underlying stream's partition count changed.
    VerifyPartitionAssignment { table: String },
    /// Rebuild the broker resource for a table from tenant membership.
    RebuildBrokerResource { table: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partition_ids() {
        let mut assignment = PartitionAssignment::default();
        assignment
            .partitions
            .insert(2, vec!["host-b".to_string()]);
        assignment
            .partitions
            .insert(0, vec!["host-a".to_string()]);
        assert_eq!(
            assignment.partition_ids().into_iter().collect::<Vec<_>>(),
            vec![0, 2]
        );
    }

    #[test]
    fn test_has_consuming_replica() {
        let mut live = LiveTableAssignment::default();
        let mut replicas = HashMap::new();
        replicas.insert("host-a".to_string(), SegmentLifecycleState::Online);
        replicas.insert("host-b".to_string(), SegmentLifecycleState::Consuming);
        live.segment_states.insert("seg".to_string(), replicas);

        assert!(live.has_consuming_replica("seg"));
        assert!(!live.has_consuming_replica("other"));
    }

    #[test]
    fn test_no_consuming_replica() {
        let mut live = LiveTableAssignment::default();
        let mut replicas = HashMap::new();
        replicas.insert("host-a".to_string(), SegmentLifecycleState::Online);
        live.segment_states.insert("seg".to_string(), replicas);

        assert!(!live.has_consuming_replica("seg"));
    }

    #[test]
    fn test_partition_level_only() {
        assert!(StreamConfig {
            partition_level: true,
            group_level: false
        }
        .partition_level_only());
        assert!(!StreamConfig {
            partition_level: true,
            group_level: true
        }
        .partition_level_only());
        assert!(!StreamConfig::default().partition_level_only());
    }
}
