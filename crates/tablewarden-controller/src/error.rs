//! Error types for the reconciliation controller

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ControllerError>;

#[derive(Debug, Error)]
pub enum ControllerError {
    #[error("Scheduler not started")]
    NotStarted,

    #[error("Scheduler already started")]
    AlreadyStarted,

    #[error("Cluster error: {0}")]
    Cluster(#[from] tablewarden_cluster::ClusterError),

    #[error("Join error: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl ControllerError {
    /// Whether this is an expected resolution/transport failure for one
    /// table, as opposed to an internal fault.
    pub fn is_expected(&self) -> bool {
        match self {
            ControllerError::Cluster(e) => e.is_expected(),
            _ => false,
        }
    }
}
