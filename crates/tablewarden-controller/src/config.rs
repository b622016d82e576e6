//! Controller configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the reconciliation controller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControllerConfig {
    /// Delay between the end of one pass and the start of the next.
    pub poll_interval_seconds: u64,
    /// Warm-up delay before the first pass, letting cluster membership
    /// stabilize after controller start.
    pub initial_delay_seconds: u64,
    /// When false, gaps and non-consuming partitions are still detected and
    /// reported but no segment-creation request is issued.
    pub self_heal: bool,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            poll_interval_seconds: 3600,
            initial_delay_seconds: 120,
            self_heal: true,
        }
    }
}

impl ControllerConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_seconds)
    }

    pub fn initial_delay(&self) -> Duration {
        Duration::from_secs(self.initial_delay_seconds)
    }
}
