//! Configuration for register lock acquisition.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Retry and backoff policy for acquiring a register's per-key lock.
///
/// Contention on the lock is transient by design (holders release as soon
/// as their attempt finishes), so acquisition retries with jittered
/// exponential backoff: the delay before attempt `n` is drawn uniformly
/// from zero up to `backoff_base * 2^(n-1)`, capped at `backoff_cap`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RegisterConfig {
    /// Maximum lock acquisition attempts before giving up with a
    /// contention error. Must be at least 1 for any operation to run.
    pub max_attempts: u32,
    /// Backoff ceiling for the first retry.
    pub backoff_base: Duration,
    /// Upper bound on any single backoff delay.
    pub backoff_cap: Duration,
}

impl Default for RegisterConfig {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            backoff_base: Duration::from_millis(10),
            backoff_cap: Duration::from_millis(500),
        }
    }
}

impl RegisterConfig {
    /// A policy that never waits: a single attempt, no backoff.
    ///
    /// Useful for callers that treat a held lock as an immediate answer
    /// rather than something to wait out.
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            backoff_base: Duration::ZERO,
            backoff_cap: Duration::ZERO,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_retries_with_bounded_backoff() {
        let config = RegisterConfig::default();
        assert!(config.max_attempts > 1);
        assert!(config.backoff_base <= config.backoff_cap);
    }

    #[test]
    fn no_retry_is_single_shot() {
        let config = RegisterConfig::no_retry();
        assert_eq!(config.max_attempts, 1);
        assert_eq!(config.backoff_cap, Duration::ZERO);
    }
}
