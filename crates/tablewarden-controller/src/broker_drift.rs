//! Broker-assignment drift detection.
//!
//! A table's broker resource entry should contain exactly the instances of
//! its configured broker tenant. Brokers joining or leaving the tenant make
//! the two sets diverge until the resource is rebuilt; this check compares
//! them and requests the rebuild. Comparison is unordered and exact, and
//! the rebuild request is idempotent downstream, so re-detecting the same
//! drift on the next pass is harmless.

use tablewarden_cluster::{ClusterMetadata, CorrectiveActions, Result};
use tracing::{debug, info};

/// Compare the tenant's instance set against the table's live broker
/// resource entry, requesting a rebuild on any difference.
pub async fn check_broker_resource(
    table: &str,
    broker_tenant: &str,
    metadata: &dyn ClusterMetadata,
    actions: &dyn CorrectiveActions,
) -> Result<()> {
    let tenant_instances = metadata.broker_tenant_instances(broker_tenant).await?;
    let resource_instances = metadata.broker_resource_instances(table).await?;

    if tenant_instances != resource_instances {
        info!(
            table = %table,
            tenant = %broker_tenant,
            tenant_instances = tenant_instances.len(),
            resource_instances = resource_instances.len(),
            "Broker resource out of sync with tenant, requesting rebuild"
        );
        actions.rebuild_broker_resource(table).await?;
    } else {
        debug!(table = %table, "Broker resource matches tenant membership");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use tablewarden_cluster::{CorrectiveRequest, InMemoryCluster};

    fn instances(names: &[&str]) -> HashSet<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[tokio::test]
    async fn test_matching_sets_no_rebuild() {
        let cluster = InMemoryCluster::new();
        cluster
            .set_tenant_instances("default", instances(&["broker-a", "broker-b"]))
            .await;
        cluster
            .set_broker_resource("orders_OFFLINE", instances(&["broker-b", "broker-a"]))
            .await;

        check_broker_resource("orders_OFFLINE", "default", &cluster, &cluster)
            .await
            .unwrap();

        assert!(cluster.issued_requests().await.is_empty());
    }

    #[tokio::test]
    async fn test_missing_instance_triggers_rebuild() {
        let cluster = InMemoryCluster::new();
        cluster
            .set_tenant_instances("default", instances(&["broker-a", "broker-b"]))
            .await;
        cluster
            .set_broker_resource("orders_OFFLINE", instances(&["broker-a"]))
            .await;

        check_broker_resource("orders_OFFLINE", "default", &cluster, &cluster)
            .await
            .unwrap();

        assert_eq!(
            cluster.issued_requests().await,
            vec![CorrectiveRequest::RebuildBrokerResource {
                table: "orders_OFFLINE".to_string()
            }]
        );
    }

    #[tokio::test]
    async fn test_renamed_instance_triggers_rebuild() {
        let cluster = InMemoryCluster::new();
        cluster
            .set_tenant_instances("default", instances(&["broker-a", "broker-c"]))
            .await;
        cluster
            .set_broker_resource("orders_OFFLINE", instances(&["broker-a", "broker-b"]))
            .await;

        check_broker_resource("orders_OFFLINE", "default", &cluster, &cluster)
            .await
            .unwrap();

        assert_eq!(cluster.issued_requests().await.len(), 1);
    }
}
