//! Tablewarden Observability
//!
//! Prometheus gauges for reconciliation state and the `/metrics` exporter.
//!
//! # Gauges
//!
//! Offline tables: missing segments, segment delay, push delay, document
//! count, segment count. Realtime tables: document count, non-consuming
//! partitions. All keyed by table and overwritten each pass; failures only
//! surface as log lines and gauge values, there is no synchronous caller to
//! return errors to.
//!
//! # Usage
//!
//! ```no_run
//! use tablewarden_observability::{exporter, metrics};
//!
//! // Initialize metrics
//! metrics::init();
//!
//! // Create metrics router
//! let metrics_router = exporter::create_metrics_router();
//! ```

pub mod exporter;
pub mod metrics;

pub use metrics::{init as init_metrics, REGISTRY};
