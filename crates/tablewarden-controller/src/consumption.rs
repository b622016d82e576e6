//! Streaming-partition consumption liveness checking.
//!
//! Every partition recorded in a streaming table's partition assignment must
//! have at least one segment replica in the consuming state, or ingestion
//! for that partition has silently stopped. This validator reconciles the
//! assignment against the live snapshot, reports partitions that lost their
//! consumer, and (when self-healing is enabled) asks the assignment layer to
//! create replacements in one batch.
//!
//! The gauge and the creation request are gated on having seen at least one
//! partition-level consumer segment in the live snapshot: a table still
//! migrating from group-replica consumption has partitions in its assignment
//! but no partition-level segments yet, and flagging those would be a false
//! alarm.

use std::collections::BTreeSet;

use tablewarden_cluster::{
    CorrectiveActions, LiveTableAssignment, PartitionAssignment, Result,
};
use tablewarden_core::ConsumerSegment;
use tablewarden_observability::metrics;
use tracing::{info, warn};

/// Validate that every assigned partition has a consuming segment, issuing
/// corrective requests for the ones that do not.
///
/// Skips entirely (without touching the assignment layer) when the table has
/// no recorded partition assignment or its live assignment is disabled.
/// Otherwise always finishes by asking the assignment layer to verify the
/// partition assignment; that call is ordered last so a partition-count
/// change is never reconciled against a consumption view computed before
/// this pass's own corrections were requested.
pub async fn validate_partition_consumers(
    table: &str,
    assignment: Option<&PartitionAssignment>,
    live: &LiveTableAssignment,
    self_heal: bool,
    actions: &dyn CorrectiveActions,
) -> Result<()> {
    info!(table = %table, "Validating partition consumers");

    let assignment = match assignment {
        Some(assignment) => assignment,
        None => {
            warn!(table = %table, "No partition assignment found, skipping consumption check");
            return Ok(());
        }
    };

    // Start from every assigned partition; observing a consuming replica
    // clears the partition.
    let mut non_consuming: BTreeSet<u32> = assignment.partition_ids();

    if !live.enabled {
        info!(table = %table, "Live assignment is disabled, skipping consumption check");
        return Ok(());
    }

    let mut consumer_segments: Vec<String> = Vec::new();
    for segment_id in live.segment_states.keys() {
        if let Some(ConsumerSegment::PartitionConsumer { partition_id }) =
            ConsumerSegment::parse(segment_id)
        {
            consumer_segments.push(segment_id.clone());
            if live.has_consuming_replica(segment_id) {
                non_consuming.remove(&partition_id);
            }
        }
    }
    // Stable order for logging and for the downstream creator.
    consumer_segments.sort();

    // A table with no partition-level segments at all may be mid-migration;
    // raising the gauge or creating segments for it would be a false alarm.
    if !consumer_segments.is_empty() {
        metrics::record_non_consuming_partitions(table, non_consuming.len());

        for partition_id in &non_consuming {
            warn!(
                table = %table,
                partition = partition_id,
                consumer_segments = consumer_segments.len(),
                "Partition has no segment in consuming state"
            );
        }

        if self_heal && !non_consuming.is_empty() {
            actions
                .create_consuming_segments(table, &non_consuming, &consumer_segments)
                .await?;
        }
    }

    actions.verify_partition_assignment(table).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tablewarden_cluster::{CorrectiveRequest, InMemoryCluster, SegmentLifecycleState};

    fn assignment(partitions: &[u32]) -> PartitionAssignment {
        let mut assignment = PartitionAssignment::default();
        for p in partitions {
            assignment
                .partitions
                .insert(*p, vec!["host-a".to_string(), "host-b".to_string()]);
        }
        assignment
    }

    fn live_with(segments: &[(&str, SegmentLifecycleState)]) -> LiveTableAssignment {
        let mut live = LiveTableAssignment::default();
        for (name, state) in segments {
            let mut replicas = HashMap::new();
            replicas.insert("host-a".to_string(), *state);
            live.segment_states.insert(name.to_string(), replicas);
        }
        live
    }

    #[tokio::test]
    async fn test_partitions_without_consumer_are_healed_in_one_batch() {
        let cluster = InMemoryCluster::new();
        let live = live_with(&[
            ("orders__0__0__100", SegmentLifecycleState::Online),
            ("orders__1__0__100", SegmentLifecycleState::Consuming),
            ("orders__2__0__100", SegmentLifecycleState::Online),
        ]);

        validate_partition_consumers(
            "orders_REALTIME",
            Some(&assignment(&[0, 1, 2])),
            &live,
            true,
            &cluster,
        )
        .await
        .unwrap();

        let requests = cluster.issued_requests().await;
        assert_eq!(requests.len(), 2);
        assert_eq!(
            requests[0],
            CorrectiveRequest::CreateConsumingSegments {
                table: "orders_REALTIME".to_string(),
                partitions: [0, 2].into_iter().collect(),
                current_segments: vec![
                    "orders__0__0__100".to_string(),
                    "orders__1__0__100".to_string(),
                    "orders__2__0__100".to_string(),
                ],
            }
        );
        assert_eq!(
            requests[1],
            CorrectiveRequest::VerifyPartitionAssignment {
                table: "orders_REALTIME".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_all_consuming_no_creation() {
        let cluster = InMemoryCluster::new();
        let live = live_with(&[
            ("orders__0__0__100", SegmentLifecycleState::Consuming),
            ("orders__1__0__100", SegmentLifecycleState::Consuming),
        ]);

        validate_partition_consumers(
            "orders_REALTIME",
            Some(&assignment(&[0, 1])),
            &live,
            true,
            &cluster,
        )
        .await
        .unwrap();

        let requests = cluster.issued_requests().await;
        assert_eq!(
            requests,
            vec![CorrectiveRequest::VerifyPartitionAssignment {
                table: "orders_REALTIME".to_string()
            }]
        );
    }

    #[tokio::test]
    async fn test_no_partition_level_segments_no_requests() {
        // Only group-replica names in the snapshot: the table has not
        // started partition-level consumption, so nothing is flagged even
        // though the assignment lists partitions.
        let cluster = InMemoryCluster::new();
        let live = live_with(&[("group1__0__0", SegmentLifecycleState::Online)]);

        validate_partition_consumers(
            "orders_REALTIME",
            Some(&assignment(&[0, 1])),
            &live,
            true,
            &cluster,
        )
        .await
        .unwrap();

        // The assignment verification still runs; no creation request does.
        let requests = cluster.issued_requests().await;
        assert_eq!(
            requests,
            vec![CorrectiveRequest::VerifyPartitionAssignment {
                table: "orders_REALTIME".to_string()
            }]
        );
    }

    #[tokio::test]
    async fn test_missing_assignment_skips_everything() {
        let cluster = InMemoryCluster::new();
        let live = live_with(&[("orders__0__0__100", SegmentLifecycleState::Online)]);

        validate_partition_consumers("orders_REALTIME", None, &live, true, &cluster)
            .await
            .unwrap();

        assert!(cluster.issued_requests().await.is_empty());
    }

    #[tokio::test]
    async fn test_disabled_table_skips_everything() {
        let cluster = InMemoryCluster::new();
        let mut live = live_with(&[("orders__0__0__100", SegmentLifecycleState::Online)]);
        live.enabled = false;

        validate_partition_consumers(
            "orders_REALTIME",
            Some(&assignment(&[0])),
            &live,
            true,
            &cluster,
        )
        .await
        .unwrap();

        assert!(cluster.issued_requests().await.is_empty());
    }

    #[tokio::test]
    async fn test_self_heal_disabled_still_verifies_assignment() {
        let cluster = InMemoryCluster::new();
        let live = live_with(&[("orders__0__0__100", SegmentLifecycleState::Online)]);

        validate_partition_consumers(
            "orders_REALTIME",
            Some(&assignment(&[0])),
            &live,
            false,
            &cluster,
        )
        .await
        .unwrap();

        let requests = cluster.issued_requests().await;
        assert_eq!(
            requests,
            vec![CorrectiveRequest::VerifyPartitionAssignment {
                table: "orders_REALTIME".to_string()
            }]
        );
    }
}
