//! Integration tests for full reconciliation passes against the in-memory
//! cluster backend.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tablewarden_cluster::{
    CorrectiveRequest, InMemoryCluster, LiveTableAssignment, PartitionAssignment,
    SegmentLifecycleState, StreamConfig, TableConfig,
};
use tablewarden_core::interval::MIN_VALID_TIME_MS;
use tablewarden_core::{SegmentFacts, TableType, TimeInterval};
use tablewarden_controller::{ControllerConfig, Reconciler};
use tablewarden_observability::metrics;

const HOUR_MS: i64 = 3_600_000;

fn reconciler(cluster: &Arc<InMemoryCluster>, config: ControllerConfig) -> Reconciler {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    Reconciler::new(
        Arc::clone(cluster) as Arc<_>,
        Arc::clone(cluster) as Arc<_>,
        Arc::clone(cluster) as Arc<_>,
        config,
    )
}

fn offline_config(name: &str) -> TableConfig {
    TableConfig {
        name: name.to_string(),
        table_type: TableType::Offline,
        broker_tenant: "default".to_string(),
        stream: None,
    }
}

fn realtime_config(name: &str, stream: Option<StreamConfig>) -> TableConfig {
    TableConfig {
        name: name.to_string(),
        table_type: TableType::Realtime,
        broker_tenant: "default".to_string(),
        stream,
    }
}

fn hourly_segment(bucket: i64, docs: i64) -> SegmentFacts {
    SegmentFacts {
        name: format!("seg_{}", bucket),
        interval: Some(TimeInterval::new(
            MIN_VALID_TIME_MS + bucket * HOUR_MS,
            MIN_VALID_TIME_MS + (bucket + 1) * HOUR_MS - 1,
        )),
        push_time_ms: MIN_VALID_TIME_MS + bucket * HOUR_MS,
        refresh_time_ms: 0,
        total_docs: docs,
        granularity_ms: Some(HOUR_MS),
    }
}

fn brokers(names: &[&str]) -> HashSet<String> {
    names.iter().map(|n| n.to_string()).collect()
}

fn consumer_live(segments: &[(&str, SegmentLifecycleState)]) -> LiveTableAssignment {
    let mut live = LiveTableAssignment::default();
    for (name, state) in segments {
        let mut replicas = HashMap::new();
        replicas.insert("host-a".to_string(), *state);
        live.segment_states.insert(name.to_string(), replicas);
    }
    live
}

fn assignment(partitions: &[u32]) -> PartitionAssignment {
    let mut assignment = PartitionAssignment::default();
    for p in partitions {
        assignment.partitions.insert(*p, vec!["host-a".to_string()]);
    }
    assignment
}

#[tokio::test]
async fn test_offline_pass_detects_gap_and_emits_gauges() {
    metrics::init();
    let table = "it_offline_gap_OFFLINE";
    let cluster = Arc::new(InMemoryCluster::new());
    cluster.add_table(offline_config(table)).await;
    cluster
        .set_segments(
            table,
            vec![
                hourly_segment(0, 100),
                hourly_segment(1, 100),
                hourly_segment(3, 100),
            ],
        )
        .await;
    cluster
        .set_tenant_instances("default", brokers(&["broker-a"]))
        .await;
    cluster.set_broker_resource(table, brokers(&["broker-a"])).await;

    reconciler(&cluster, ControllerConfig::default()).run_pass().await;

    assert_eq!(
        metrics::TABLE_MISSING_SEGMENTS.with_label_values(&[table]).get(),
        1
    );
    assert_eq!(
        metrics::TABLE_SEGMENT_COUNT.with_label_values(&[table]).get(),
        3
    );
    assert_eq!(
        metrics::TABLE_TOTAL_DOCUMENTS.with_label_values(&[table]).get(),
        300
    );
    // Brokers match, no corrective requests at all.
    assert!(cluster.issued_requests().await.is_empty());
}

#[tokio::test]
async fn test_realtime_pass_heals_and_verifies_in_order() {
    metrics::init();
    let table = "it_realtime_heal_REALTIME";
    let cluster = Arc::new(InMemoryCluster::new());
    cluster
        .add_table(realtime_config(
            table,
            Some(StreamConfig {
                partition_level: true,
                group_level: false,
            }),
        ))
        .await;
    cluster
        .set_tenant_instances("default", brokers(&["broker-a", "broker-b"]))
        .await;
    cluster.set_broker_resource(table, brokers(&["broker-a"])).await;
    cluster.set_partition_assignment(table, assignment(&[0, 1, 2])).await;
    cluster
        .set_live_assignment(
            table,
            consumer_live(&[
                ("orders__0__0__100", SegmentLifecycleState::Online),
                ("orders__1__0__100", SegmentLifecycleState::Consuming),
                ("orders__2__0__100", SegmentLifecycleState::Offline),
            ]),
        )
        .await;

    reconciler(&cluster, ControllerConfig::default()).run_pass().await;

    let requests = cluster.issued_requests().await;
    assert_eq!(requests.len(), 3);
    // Drift check runs before the consumption check; assignment
    // verification is always last.
    assert_eq!(
        requests[0],
        CorrectiveRequest::RebuildBrokerResource {
            table: table.to_string()
        }
    );
    match &requests[1] {
        CorrectiveRequest::CreateConsumingSegments { partitions, .. } => {
            assert_eq!(
                partitions.iter().copied().collect::<Vec<_>>(),
                vec![0, 2]
            );
        }
        other => panic!("expected creation request, got {:?}", other),
    }
    assert_eq!(
        requests[2],
        CorrectiveRequest::VerifyPartitionAssignment {
            table: table.to_string()
        }
    );
    assert_eq!(
        metrics::TABLE_NON_CONSUMING_PARTITIONS
            .with_label_values(&[table])
            .get(),
        2
    );
}

#[tokio::test]
async fn test_self_heal_disabled_reports_without_creating() {
    metrics::init();
    let table = "it_realtime_noheal_REALTIME";
    let cluster = Arc::new(InMemoryCluster::new());
    cluster
        .add_table(realtime_config(
            table,
            Some(StreamConfig {
                partition_level: true,
                group_level: false,
            }),
        ))
        .await;
    cluster.set_partition_assignment(table, assignment(&[0])).await;
    cluster
        .set_live_assignment(
            table,
            consumer_live(&[("orders__0__0__100", SegmentLifecycleState::Online)]),
        )
        .await;

    let config = ControllerConfig {
        self_heal: false,
        ..ControllerConfig::default()
    };
    reconciler(&cluster, config).run_pass().await;

    let requests = cluster.issued_requests().await;
    assert!(requests
        .iter()
        .all(|r| !matches!(r, CorrectiveRequest::CreateConsumingSegments { .. })));
    assert_eq!(
        metrics::TABLE_NON_CONSUMING_PARTITIONS
            .with_label_values(&[table])
            .get(),
        1
    );
}

#[tokio::test]
async fn test_non_leader_pass_touches_nothing() {
    let cluster = Arc::new(InMemoryCluster::new());
    cluster.add_table(offline_config("it_leader_OFFLINE")).await;
    cluster.set_leader(false);

    reconciler(&cluster, ControllerConfig::default()).run_pass().await;

    assert_eq!(cluster.read_count(), 0);
    assert!(cluster.issued_requests().await.is_empty());
}

#[tokio::test]
async fn test_one_broken_table_does_not_abort_the_pass() {
    metrics::init();
    let cluster = Arc::new(InMemoryCluster::new());
    // Realtime table with no stream config resolves but fails validation.
    cluster
        .add_table(realtime_config("it_broken_a_REALTIME", None))
        .await;
    let good = "it_broken_z_OFFLINE";
    cluster.add_table(offline_config(good)).await;
    cluster
        .set_segments(good, vec![hourly_segment(0, 10), hourly_segment(1, 10)])
        .await;

    reconciler(&cluster, ControllerConfig::default()).run_pass().await;

    // The broken table was counted as failed and the later table was still
    // processed (its gauges are fresh).
    assert_eq!(
        metrics::TABLE_FAILURES_TOTAL
            .with_label_values(&["it_broken_a_REALTIME"])
            .get(),
        1
    );
    assert_eq!(
        metrics::TABLE_SEGMENT_COUNT.with_label_values(&[good]).get(),
        2
    );
}

#[tokio::test]
async fn test_unknown_table_type_is_skipped() {
    let cluster = Arc::new(InMemoryCluster::new());
    cluster.add_table(offline_config("it_unknown_suffix")).await;

    reconciler(&cluster, ControllerConfig::default()).run_pass().await;

    assert!(cluster.issued_requests().await.is_empty());
}
