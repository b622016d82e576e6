//! Tablewarden Cluster Seam
//!
//! The reconciliation controller reads cluster state and issues corrective
//! requests, but owns neither: both sides live behind the traits in this
//! crate.
//!
//! ## Traits
//!
//! - [`ClusterMetadata`]: read-only view of tables, segment metadata,
//!   partition assignments, live assignment snapshots, and broker membership
//! - [`LeadershipOracle`]: "is this process currently the reconciliation
//!   leader?" Injected as a capability rather than read from ambient shared
//!   state, so passes are gateable and the gate is testable.
//! - [`CorrectiveActions`]: fire-and-forget requests to the assignment
//!   layer. Downstream handling must be idempotent; the controller runs
//!   at-least-once and does not track acknowledgment.
//!
//! ## Thread Safety
//!
//! All implementations must be `Send + Sync` and are shared via
//! `Arc<dyn …>` across async tasks. The controller holds no locks of its
//! own; implementations are assumed safe for concurrent readers.
//!
//! ## Backends
//!
//! [`InMemoryCluster`] implements all three traits over in-process state.
//! It backs single-node deployments and every integration test; it also
//! records the corrective requests it receives, which is what makes
//! "exactly one batched request was issued" assertable.

pub mod error;
pub mod memory;
pub mod types;

pub use error::{ClusterError, Result};
pub use memory::InMemoryCluster;
pub use types::{
    CorrectiveRequest, LiveTableAssignment, PartitionAssignment, SegmentLifecycleState,
    StreamConfig, TableConfig,
};

use std::collections::{BTreeSet, HashSet};

use async_trait::async_trait;
use tablewarden_core::SegmentFacts;

/// Read-only view of cluster metadata and live state.
///
/// All methods take a fully qualified table name (with type suffix). The
/// views returned by different methods are not transactional with each
/// other; the controller tolerates slightly skewed snapshots.
#[async_trait]
pub trait ClusterMetadata: Send + Sync {
    /// All table identifiers known to the cluster.
    async fn list_tables(&self) -> Result<Vec<String>>;

    /// Resolve a table's configuration.
    async fn table_config(&self, table: &str) -> Result<TableConfig>;

    /// All segment facts for a table.
    async fn segment_facts(&self, table: &str) -> Result<Vec<SegmentFacts>>;

    /// The recorded partition assignment for a streaming table, if any.
    async fn partition_assignment(&self, table: &str) -> Result<Option<PartitionAssignment>>;

    /// The live segment assignment snapshot for a table.
    async fn live_assignment(&self, table: &str) -> Result<LiveTableAssignment>;

    /// Broker instances currently serving the table in the broker resource.
    async fn broker_resource_instances(&self, table: &str) -> Result<HashSet<String>>;

    /// All broker instances belonging to a tenant.
    async fn broker_tenant_instances(&self, tenant: &str) -> Result<HashSet<String>>;
}

/// Leadership gate for reconciliation passes.
pub trait LeadershipOracle: Send + Sync {
    /// Whether this process is currently the reconciliation leader. Must be
    /// cheap; it is consulted at the top of every pass.
    fn is_leader(&self) -> bool;
}

/// Corrective requests delegated to the assignment layer.
///
/// Issuing any of these twice for an already-resolved condition must be a
/// safe no-op downstream.
#[async_trait]
pub trait CorrectiveActions: Send + Sync {
    /// Create replacement consuming segments for all listed partitions in
    /// one batch, with the current partition-level segments as placement
    /// context.
    async fn create_consuming_segments(
        &self,
        table: &str,
        partitions: &BTreeSet<u32>,
        current_segments: &[String],
    ) -> Result<()>;

    /// Recompute or verify the partition-to-host assignment for a table.
    async fn verify_partition_assignment(&self, table: &str) -> Result<()>;

    /// Rebuild the broker resource for a table from tenant membership.
    async fn rebuild_broker_resource(&self, table: &str) -> Result<()>;
}
