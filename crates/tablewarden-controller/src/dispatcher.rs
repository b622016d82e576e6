//! Reconciliation Dispatcher
//!
//! Orchestrates one full reconciliation pass: enumerate tables fresh,
//! classify each by type, and run the applicable validators plus the broker
//! drift check.
//!
//! ## Fault Isolation
//!
//! A table whose config cannot be resolved, whose metadata reads time out,
//! or whose validation hits an internal fault is logged and skipped; the
//! pass continues with the next table. Expected failures (resolution,
//! transport) log at warn level, internal faults at error level, and both
//! bump the per-table failure counter. Both table-type branches share the
//! same per-table boundary.
//!
//! ## Ordering
//!
//! Tables are processed in enumeration order with no cross-table isolation:
//! two tables may be reconciled against metadata views taken at slightly
//! different instants. Within a realtime table, the broker drift check runs
//! before the consumption check, and the assignment verification request is
//! always the last thing issued for the table.

use std::sync::Arc;

use tablewarden_cluster::{
    ClusterError, ClusterMetadata, CorrectiveActions, LeadershipOracle, StreamConfig, TableConfig,
};
use tablewarden_core::{ConsumerSegment, SegmentFacts, TableType};
use tablewarden_observability::metrics;
use tracing::{error, info, warn};

use crate::broker_drift;
use crate::config::ControllerConfig;
use crate::consumption;
use crate::continuity;
use crate::error::{ControllerError, Result};

/// Per-table context resolved once at the top of the table's reconciliation
/// and passed by value to each check.
struct TableContext {
    config: TableConfig,
}

/// Runs reconciliation passes over the cluster.
pub struct Reconciler {
    metadata: Arc<dyn ClusterMetadata>,
    actions: Arc<dyn CorrectiveActions>,
    leadership: Arc<dyn LeadershipOracle>,
    config: ControllerConfig,
}

impl Reconciler {
    pub fn new(
        metadata: Arc<dyn ClusterMetadata>,
        actions: Arc<dyn CorrectiveActions>,
        leadership: Arc<dyn LeadershipOracle>,
        config: ControllerConfig,
    ) -> Self {
        Self {
            metadata,
            actions,
            leadership,
            config,
        }
    }

    /// Run one full reconciliation pass.
    ///
    /// Gated on leadership: a pass invoked while this process is not the
    /// leader performs zero metadata reads and issues zero corrective
    /// requests. Per-table failures are logged and counted but never abort
    /// the pass.
    pub async fn run_pass(&self) {
        if !self.leadership.is_leader() {
            info!("Skipping reconciliation pass, not leader");
            return;
        }

        info!("Starting reconciliation pass");

        let tables = match self.metadata.list_tables().await {
            Ok(tables) => tables,
            Err(e) => {
                warn!(error = %e, "Cannot enumerate tables, skipping pass");
                return;
            }
        };

        for table in &tables {
            if let Err(e) = self.reconcile_table(table).await {
                if e.is_expected() {
                    warn!(table = %table, error = %e, "Skipping table this pass");
                } else {
                    error!(table = %table, error = %e, "Table reconciliation failed");
                }
                metrics::count_table_failure(table);
            }
        }

        metrics::count_pass();
        info!(tables = tables.len(), "Reconciliation pass completed");
    }

    async fn reconcile_table(&self, table: &str) -> Result<()> {
        match TableType::from_table_name(table) {
            Some(TableType::Offline) => self.reconcile_offline(table).await,
            Some(TableType::Realtime) => self.reconcile_realtime(table).await,
            None => {
                warn!(table = %table, "Ignoring table with unknown type");
                Ok(())
            }
        }
    }

    async fn resolve_context(&self, table: &str) -> Result<TableContext> {
        let config = self.metadata.table_config(table).await?;
        Ok(TableContext { config })
    }

    async fn reconcile_offline(&self, table: &str) -> Result<()> {
        let segments = self.metadata.segment_facts(table).await?;
        let report = continuity::check_continuity(&segments);

        for missing in &report.missing_intervals {
            warn!(table = %table, interval = %missing, "Missing data for time interval");
        }
        metrics::record_missing_segments(table, report.missing_intervals.len());
        metrics::record_offline_segment_delay(table, report.max_end_time_ms);
        metrics::record_last_push_delay(table, report.max_push_time_ms);
        metrics::record_total_documents(table, report.total_docs);
        metrics::record_segment_count(table, report.segment_count);

        let ctx = self.resolve_context(table).await?;
        broker_drift::check_broker_resource(
            table,
            &ctx.config.broker_tenant,
            self.metadata.as_ref(),
            self.actions.as_ref(),
        )
        .await?;

        Ok(())
    }

    async fn reconcile_realtime(&self, table: &str) -> Result<()> {
        let ctx = self.resolve_context(table).await?;
        let stream = ctx
            .config
            .stream
            .ok_or_else(|| ClusterError::StreamConfigUnresolvable(table.to_string()))
            .map_err(ControllerError::from)?;

        broker_drift::check_broker_resource(
            table,
            &ctx.config.broker_tenant,
            self.metadata.as_ref(),
            self.actions.as_ref(),
        )
        .await?;

        let segments = self.metadata.segment_facts(table).await?;
        metrics::record_total_documents(table, realtime_total_documents(&segments, stream));

        if stream.partition_level {
            let assignment = self.metadata.partition_assignment(table).await?;
            let live = self.metadata.live_assignment(table).await?;
            consumption::validate_partition_consumers(
                table,
                assignment.as_ref(),
                &live,
                self.config.self_heal,
                self.actions.as_ref(),
            )
            .await?;
        }

        Ok(())
    }
}

/// Total raw documents across a realtime table's segments.
///
/// Group-replica consumers produce one copy of the data per replica group,
/// so only the first group id encountered is counted and every other group
/// is discarded. Streams fully migrated to partition-level-only consumption
/// count the partition-level segments instead.
fn realtime_total_documents(segments: &[SegmentFacts], stream: StreamConfig) -> i64 {
    let count_group_replicas = !stream.partition_level_only();

    let mut total_docs = 0i64;
    let mut counted_group: Option<String> = None;
    for facts in segments {
        match ConsumerSegment::parse(&facts.name) {
            Some(ConsumerSegment::GroupReplica { group_id }) => {
                if count_group_replicas {
                    let group = counted_group.get_or_insert_with(|| group_id.clone());
                    if *group == group_id && facts.total_docs >= 0 {
                        total_docs += facts.total_docs;
                    }
                }
            }
            _ => {
                if !count_group_replicas {
                    total_docs += facts.total_docs;
                }
            }
        }
    }
    total_docs
}

#[cfg(test)]
mod tests {
    use super::*;

    fn facts(name: &str, docs: i64) -> SegmentFacts {
        SegmentFacts {
            name: name.to_string(),
            interval: None,
            push_time_ms: 0,
            refresh_time_ms: 0,
            total_docs: docs,
            granularity_ms: None,
        }
    }

    const GROUP_MODE: StreamConfig = StreamConfig {
        partition_level: false,
        group_level: true,
    };
    const PARTITION_ONLY: StreamConfig = StreamConfig {
        partition_level: true,
        group_level: false,
    };

    #[test]
    fn test_group_replicas_deduplicated_by_first_group() {
        let segments = vec![
            facts("group1__0__0", 100),
            facts("group1__1__0", 200),
            facts("group2__0__0", 500),
            facts("group2__1__0", 600),
        ];
        assert_eq!(realtime_total_documents(&segments, GROUP_MODE), 300);
    }

    #[test]
    fn test_partition_only_counts_partition_segments() {
        let segments = vec![
            facts("orders__0__0__100", 100),
            facts("orders__1__0__100", 200),
            facts("group1__0__0", 999),
        ];
        assert_eq!(realtime_total_documents(&segments, PARTITION_ONLY), 300);
    }

    #[test]
    fn test_mixed_mode_counts_group_side() {
        let segments = vec![
            facts("orders__0__0__100", 100),
            facts("group1__0__0", 50),
        ];
        let mixed = StreamConfig {
            partition_level: true,
            group_level: true,
        };
        assert_eq!(realtime_total_documents(&segments, mixed), 50);
    }

    #[test]
    fn test_negative_doc_counts_ignored_for_group_replicas() {
        let segments = vec![facts("group1__0__0", -1), facts("group1__1__0", 10)];
        assert_eq!(realtime_total_documents(&segments, GROUP_MODE), 10);
    }
}
