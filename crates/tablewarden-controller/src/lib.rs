//! Tablewarden Controller
//!
//! The reconciliation controller of the cluster: a leader-gated, fixed-delay
//! audit loop that checks declared metadata against observed state and
//! issues idempotent corrective requests when they drift.
//!
//! ## Checks Per Pass
//!
//! - **Offline tables**: segment continuity (gaps in the time sequence) plus
//!   freshness and volume gauges, then broker drift
//! - **Realtime tables**: broker drift, volume gauges (replica groups
//!   deduplicated), then consumption liveness with batched self-heal
//!
//! ## Guarantees
//!
//! - Runs only on the current leader; a pass on a non-leader touches nothing
//! - Passes never overlap (fixed-delay scheduling)
//! - One table's failure never aborts the pass
//! - Corrective requests are at-least-once; downstream handling must be
//!   idempotent
//!
//! ## Usage
//!
//! ```ignore
//! use std::sync::Arc;
//! use tablewarden_controller::{ControllerConfig, Reconciler, ReconciliationScheduler};
//!
//! let reconciler = Reconciler::new(metadata, actions, leadership, config.clone());
//! let scheduler = ReconciliationScheduler::new(reconciler, config);
//! scheduler.start().await?;
//! ```

pub mod broker_drift;
pub mod config;
pub mod consumption;
pub mod continuity;
pub mod dispatcher;
pub mod error;
pub mod scheduler;

pub use config::ControllerConfig;
pub use continuity::{check_continuity, ContinuityReport};
pub use dispatcher::Reconciler;
pub use error::{ControllerError, Result};
pub use scheduler::ReconciliationScheduler;
