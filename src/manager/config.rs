//! Manager configuration

use crate::error::FsmError;
use crate::work::RandomWork;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Manager configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagerConfig {
    /// Capacity of the inbound event queue
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    /// Lower bound of the simulated `complete` work, in milliseconds
    #[serde(default = "default_work_min_ms")]
    pub work_min_ms: u64,

    /// Upper bound of the simulated `complete` work, in milliseconds
    #[serde(default = "default_work_max_ms")]
    pub work_max_ms: u64,

    /// Number of transitions kept in the history log (0 disables it)
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,

    /// How long `stop` waits for each background task before aborting it
    #[serde(default = "default_shutdown_timeout_ms")]
    pub shutdown_timeout_ms: u64,
}

fn default_queue_capacity() -> usize {
    10
}

fn default_work_min_ms() -> u64 {
    100
}

fn default_work_max_ms() -> u64 {
    500
}

fn default_history_limit() -> usize {
    64
}

fn default_shutdown_timeout_ms() -> u64 {
    5_000
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            queue_capacity: default_queue_capacity(),
            work_min_ms: default_work_min_ms(),
            work_max_ms: default_work_max_ms(),
            history_limit: default_history_limit(),
            shutdown_timeout_ms: default_shutdown_timeout_ms(),
        }
    }
}

impl ManagerConfig {
    /// Parse and validate a JSON document. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, FsmError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| FsmError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the runtime cannot work with.
    pub fn validate(&self) -> Result<(), FsmError> {
        if self.queue_capacity == 0 {
            return Err(FsmError::InvalidConfig(
                "queue_capacity must be at least 1".to_string(),
            ));
        }
        if self.work_min_ms > self.work_max_ms {
            return Err(FsmError::InvalidConfig(format!(
                "work_min_ms ({}) exceeds work_max_ms ({})",
                self.work_min_ms, self.work_max_ms
            )));
        }
        Ok(())
    }

    /// Default work simulator for this configuration.
    pub fn random_work(&self) -> RandomWork {
        RandomWork::new(
            Duration::from_millis(self.work_min_ms),
            Duration::from_millis(self.work_max_ms),
        )
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_millis(self.shutdown_timeout_ms)
    }
}
