use crate::{ConfigError, ConfigErrorResult};

use std::time::Duration;

use serde::{Deserialize, Serialize};

// Attempt bound
pub const MIN_MAX_ATTEMPTS: u32 = 1;
pub const MAX_MAX_ATTEMPTS: u32 = 10;
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

pub const MAX_RETRY_BACKOFF_MS: u64 = 60_000;
pub const DEFAULT_RETRY_BACKOFF_MS: u64 = 1_000;

pub const MIN_SHUTDOWN_TIMEOUT_SECS: u64 = 1;
pub const MAX_SHUTDOWN_TIMEOUT_SECS: u64 = 300;
pub const DEFAULT_SHUTDOWN_TIMEOUT_SECS: u64 = 5;

/// Retry and shutdown policy for the supervised server.
///
/// The backoff is fixed: every relaunch waits the same interval.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SupervisorConfig {
    /// Total launch attempts before giving up (including the first)
    pub max_attempts: u32,
    /// Delay between a premature exit and the next launch, in milliseconds
    pub retry_backoff_ms: u64,
    /// Grace window between the terminate signal and the forced kill
    pub shutdown_timeout_secs: u64,
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            retry_backoff_ms: DEFAULT_RETRY_BACKOFF_MS,
            shutdown_timeout_secs: DEFAULT_SHUTDOWN_TIMEOUT_SECS,
        }
    }
}

impl SupervisorConfig {
    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }

    pub fn validate(&self) -> ConfigErrorResult<()> {
        if self.max_attempts < MIN_MAX_ATTEMPTS || self.max_attempts > MAX_MAX_ATTEMPTS {
            return Err(ConfigError::supervisor(format!(
                "supervisor.max_attempts must be {}-{}, got {}",
                MIN_MAX_ATTEMPTS, MAX_MAX_ATTEMPTS, self.max_attempts
            )));
        }

        if self.retry_backoff_ms > MAX_RETRY_BACKOFF_MS {
            return Err(ConfigError::supervisor(format!(
                "supervisor.retry_backoff_ms must be <= {}, got {}",
                MAX_RETRY_BACKOFF_MS, self.retry_backoff_ms
            )));
        }

        if self.shutdown_timeout_secs < MIN_SHUTDOWN_TIMEOUT_SECS
            || self.shutdown_timeout_secs > MAX_SHUTDOWN_TIMEOUT_SECS
        {
            return Err(ConfigError::supervisor(format!(
                "supervisor.shutdown_timeout_secs must be {}-{}, got {}",
                MIN_SHUTDOWN_TIMEOUT_SECS, MAX_SHUTDOWN_TIMEOUT_SECS, self.shutdown_timeout_secs
            )));
        }

        Ok(())
    }
}
