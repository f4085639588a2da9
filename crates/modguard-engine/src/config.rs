//! Engine tunables

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Worker pool and recovery configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Number of background workers
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Bounded queue capacity
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    /// Seconds between recovery sweeps
    #[serde(default = "default_recovery_interval")]
    pub recovery_interval_secs: u64,

    /// Age in seconds after which a pending request is considered stuck
    #[serde(default = "default_stale_after")]
    pub stale_after_secs: u64,

    /// Maximum requests re-enqueued per sweep
    #[serde(default = "default_recovery_batch")]
    pub recovery_batch: u32,

    /// Outer deadline in seconds for one classifier call
    #[serde(default = "default_classifier_deadline")]
    pub classifier_deadline_secs: u64,
}

fn default_workers() -> usize {
    4
}

fn default_queue_capacity() -> usize {
    256
}

fn default_recovery_interval() -> u64 {
    60
}

fn default_stale_after() -> u64 {
    120
}

fn default_recovery_batch() -> u32 {
    100
}

fn default_classifier_deadline() -> u64 {
    60
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            queue_capacity: default_queue_capacity(),
            recovery_interval_secs: default_recovery_interval(),
            stale_after_secs: default_stale_after(),
            recovery_batch: default_recovery_batch(),
            classifier_deadline_secs: default_classifier_deadline(),
        }
    }
}

impl EngineConfig {
    pub fn recovery_interval(&self) -> Duration {
        Duration::from_secs(self.recovery_interval_secs.max(1))
    }

    pub fn stale_after(&self) -> Duration {
        Duration::from_secs(self.stale_after_secs)
    }

    pub fn classifier_deadline(&self) -> Duration {
        Duration::from_secs(self.classifier_deadline_secs.max(1))
    }
}
