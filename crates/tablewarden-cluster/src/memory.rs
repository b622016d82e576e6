//! In-Memory Cluster Backend
//!
//! Implements all three collaborator traits over in-process state behind
//! `tokio::sync::RwLock`. This is the single-node backend and the fixture
//! every integration test drives:
//!
//! - fixture mutators (`add_table`, `set_segments`, …) populate the views
//!   the controller reads
//! - `set_leader` toggles the leadership oracle
//! - every corrective request is appended to an inspectable log
//! - every metadata read increments a counter, so "a pass while not leader
//!   performs zero reads" is directly assertable
//!
//! ## Usage
//!
//! ```ignore
//! use tablewarden_cluster::{InMemoryCluster, TableConfig, StreamConfig};
//!
//! let cluster = InMemoryCluster::new();
//! cluster.add_table(config).await;
//! cluster.set_segments("orders_OFFLINE", segments).await;
//!
//! // ... run a reconciliation pass ...
//!
//! let requests = cluster.issued_requests().await;
//! ```

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use tablewarden_core::SegmentFacts;
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::{ClusterError, Result};
use crate::types::{CorrectiveRequest, LiveTableAssignment, PartitionAssignment, TableConfig};
use crate::{ClusterMetadata, CorrectiveActions, LeadershipOracle};

#[derive(Default)]
struct ClusterState {
    tables: BTreeMap<String, TableConfig>,
    segments: HashMap<String, Vec<SegmentFacts>>,
    partition_assignments: HashMap<String, PartitionAssignment>,
    live_assignments: HashMap<String, LiveTableAssignment>,
    broker_resource: HashMap<String, HashSet<String>>,
    tenants: HashMap<String, HashSet<String>>,
}

/// In-process implementation of the cluster collaborator traits.
#[derive(Default)]
pub struct InMemoryCluster {
    state: RwLock<ClusterState>,
    leader: AtomicBool,
    reads: AtomicU64,
    requests: RwLock<Vec<CorrectiveRequest>>,
}

impl InMemoryCluster {
    /// Create an empty cluster that considers itself leader.
    pub fn new() -> Self {
        Self {
            leader: AtomicBool::new(true),
            ..Default::default()
        }
    }

    /// Register a table. The name comes from the config.
    pub async fn add_table(&self, config: TableConfig) {
        let mut state = self.state.write().await;
        state.tables.insert(config.name.clone(), config);
    }

    /// Replace the segment facts for a table.
    pub async fn set_segments(&self, table: &str, segments: Vec<SegmentFacts>) {
        let mut state = self.state.write().await;
        state.segments.insert(table.to_string(), segments);
    }

    /// Record the partition assignment for a streaming table.
    pub async fn set_partition_assignment(&self, table: &str, assignment: PartitionAssignment) {
        let mut state = self.state.write().await;
        state
            .partition_assignments
            .insert(table.to_string(), assignment);
    }

    /// Replace the live assignment snapshot for a table.
    pub async fn set_live_assignment(&self, table: &str, live: LiveTableAssignment) {
        let mut state = self.state.write().await;
        state.live_assignments.insert(table.to_string(), live);
    }

    /// Set the broker instances currently serving a table.
    pub async fn set_broker_resource(&self, table: &str, instances: HashSet<String>) {
        let mut state = self.state.write().await;
        state.broker_resource.insert(table.to_string(), instances);
    }

    /// Set the instances belonging to a broker tenant.
    pub async fn set_tenant_instances(&self, tenant: &str, instances: HashSet<String>) {
        let mut state = self.state.write().await;
        state.tenants.insert(tenant.to_string(), instances);
    }

    /// Toggle the leadership oracle.
    pub fn set_leader(&self, leader: bool) {
        self.leader.store(leader, Ordering::SeqCst);
    }

    /// Corrective requests received so far, in issue order.
    pub async fn issued_requests(&self) -> Vec<CorrectiveRequest> {
        self.requests.read().await.clone()
    }

    /// Number of metadata reads served so far.
    pub fn read_count(&self) -> u64 {
        self.reads.load(Ordering::SeqCst)
    }

    fn count_read(&self) {
        self.reads.fetch_add(1, Ordering::SeqCst);
    }

    async fn record(&self, request: CorrectiveRequest) {
        debug!(request = ?request, "Recording corrective request");
        self.requests.write().await.push(request);
    }
}

#[async_trait]
impl ClusterMetadata for InMemoryCluster {
    async fn list_tables(&self) -> Result<Vec<String>> {
        self.count_read();
        let state = self.state.read().await;
        Ok(state.tables.keys().cloned().collect())
    }

    async fn table_config(&self, table: &str) -> Result<TableConfig> {
        self.count_read();
        let state = self.state.read().await;
        state
            .tables
            .get(table)
            .cloned()
            .ok_or_else(|| ClusterError::ConfigUnresolvable(table.to_string()))
    }

    async fn segment_facts(&self, table: &str) -> Result<Vec<SegmentFacts>> {
        self.count_read();
        let state = self.state.read().await;
        Ok(state.segments.get(table).cloned().unwrap_or_default())
    }

    async fn partition_assignment(&self, table: &str) -> Result<Option<PartitionAssignment>> {
        self.count_read();
        let state = self.state.read().await;
        Ok(state.partition_assignments.get(table).cloned())
    }

    async fn live_assignment(&self, table: &str) -> Result<LiveTableAssignment> {
        self.count_read();
        let state = self.state.read().await;
        Ok(state
            .live_assignments
            .get(table)
            .cloned()
            .unwrap_or_default())
    }

    async fn broker_resource_instances(&self, table: &str) -> Result<HashSet<String>> {
        self.count_read();
        let state = self.state.read().await;
        Ok(state.broker_resource.get(table).cloned().unwrap_or_default())
    }

    async fn broker_tenant_instances(&self, tenant: &str) -> Result<HashSet<String>> {
        self.count_read();
        let state = self.state.read().await;
        Ok(state.tenants.get(tenant).cloned().unwrap_or_default())
    }
}

impl LeadershipOracle for InMemoryCluster {
    fn is_leader(&self) -> bool {
        self.leader.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CorrectiveActions for InMemoryCluster {
    async fn create_consuming_segments(
        &self,
        table: &str,
        partitions: &BTreeSet<u32>,
        current_segments: &[String],
    ) -> Result<()> {
        self.record(CorrectiveRequest::CreateConsumingSegments {
            table: table.to_string(),
            partitions: partitions.clone(),
            current_segments: current_segments.to_vec(),
        })
        .await;
        Ok(())
    }

    async fn verify_partition_assignment(&self, table: &str) -> Result<()> {
        self.record(CorrectiveRequest::VerifyPartitionAssignment {
            table: table.to_string(),
        })
        .await;
        Ok(())
    }

    async fn rebuild_broker_resource(&self, table: &str) -> Result<()> {
        self.record(CorrectiveRequest::RebuildBrokerResource {
            table: table.to_string(),
        })
        .await;
        Ok(())
    }
}
