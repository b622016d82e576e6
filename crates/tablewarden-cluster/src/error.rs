//! Cluster Collaborator Error Types
//!
//! Errors surfaced by the metadata and corrective-action collaborators.
//!
//! ## Error Categories
//!
//! ### Resolution Errors
//! - `TableNotFound`: the table disappeared between enumeration and lookup
//! - `ConfigUnresolvable`: table configuration is missing or malformed
//! - `StreamConfigUnresolvable`: a realtime table carries no stream
//!   configuration
//!
//! ### Transport Errors
//! - `Transient`: timeout or connectivity failure talking to the metadata
//!   store or cluster-state provider
//!
//! The reconciliation dispatcher treats resolution and transient errors the
//! same way: log a warning identifying the table, skip its remaining checks,
//! continue the pass.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ClusterError>;

#[derive(Debug, Error)]
pub enum ClusterError {
    #[error("Table not found: {0}")]
    TableNotFound(String),

    #[error("Cannot resolve table config for {0}")]
    ConfigUnresolvable(String),

    #[error("Cannot resolve stream config for {0}")]
    StreamConfigUnresolvable(String),

    #[error("Transient store error: {0}")]
    Transient(String),
}

impl ClusterError {
    /// Whether this error is an expected resolution/transport failure rather
    /// than an internal fault. Expected failures log at warn level.
    pub fn is_expected(&self) -> bool {
        matches!(
            self,
            ClusterError::TableNotFound(_)
                | ClusterError::ConfigUnresolvable(_)
                | ClusterError::StreamConfigUnresolvable(_)
                | ClusterError::Transient(_)
        )
    }
}
