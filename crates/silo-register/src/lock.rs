//! Per-key register locks built on exclusive blob creation.
//!
//! Plain files offer no compare-and-swap, but they do offer atomic
//! exclusive create. A register serializes its attempts by creating a
//! `<key>.lock` marker with create-if-absent semantics: whoever creates it
//! owns the key until they delete it. Blob-name validation reserves the
//! `.lock` suffix, so no ordinary blob can collide with a marker and at
//! most one lock per key can exist at any instant.

use std::thread;
use std::time::Duration;

use rand::Rng;
use tracing::{debug, warn};

use silo_store::BlobContainer;
use silo_types::LOCK_SUFFIX;

use crate::config::RegisterConfig;
use crate::error::{RegisterError, RegisterResult};

/// Name of the lock marker guarding register `key`.
pub fn lock_blob_name(key: &str) -> String {
    format!("{key}{LOCK_SUFFIX}")
}

/// Exclusive ownership of one register key, released on drop.
///
/// Acquisition retries contended creates with jittered exponential
/// backoff up to the configured budget. Release deletes the marker on
/// every exit path, success, error, or unwind; a failed delete is logged
/// and otherwise swallowed, since the error that caused it is already on
/// its way to the caller.
#[derive(Debug)]
pub struct RegisterLock<'a, C: BlobContainer + ?Sized> {
    container: &'a C,
    name: String,
}

impl<'a, C: BlobContainer + ?Sized> RegisterLock<'a, C> {
    /// Acquire the lock for `key`, retrying per `config`.
    pub fn acquire(container: &'a C, key: &str, config: &RegisterConfig) -> RegisterResult<Self> {
        let name = lock_blob_name(key);
        for attempt in 1..=config.max_attempts {
            if container.try_create_exclusive(&name)? {
                debug!(key, attempt, "acquired register lock");
                return Ok(Self { container, name });
            }
            if attempt < config.max_attempts {
                thread::sleep(backoff_delay(config, attempt));
            }
        }
        Err(RegisterError::Contention {
            key: key.to_string(),
            attempts: config.max_attempts,
        })
    }
}

impl<C: BlobContainer + ?Sized> Drop for RegisterLock<'_, C> {
    fn drop(&mut self) {
        if let Err(error) = self.container.delete_blob(&self.name) {
            warn!(lock = %self.name, %error, "failed to release register lock");
        }
    }
}

/// Delay before the retry following attempt `attempt` (1-based): uniform
/// jitter over an exponentially growing, capped window.
fn backoff_delay(config: &RegisterConfig, attempt: u32) -> Duration {
    let shift = attempt.saturating_sub(1).min(16);
    let window = config
        .backoff_base
        .saturating_mul(1u32 << shift)
        .min(config.backoff_cap);
    if window.is_zero() {
        return Duration::ZERO;
    }
    let nanos = u64::try_from(window.as_nanos()).unwrap_or(u64::MAX);
    Duration::from_nanos(rand::thread_rng().gen_range(0..=nanos))
}

#[cfg(test)]
mod tests {
    use super::*;
    use silo_store::InMemoryBlobContainer;

    #[test]
    fn lock_names_use_reserved_suffix() {
        assert_eq!(lock_blob_name("epoch"), "epoch.lock");
        assert!(silo_types::validate_blob_name(&lock_blob_name("epoch")).is_err());
    }

    #[test]
    fn acquire_creates_marker_and_drop_removes_it() {
        let container = InMemoryBlobContainer::default();
        {
            let _lock = RegisterLock::acquire(&container, "k", &RegisterConfig::default()).unwrap();
            assert!(container.blob_exists("k.lock").unwrap());
        }
        assert!(!container.blob_exists("k.lock").unwrap());
    }

    #[test]
    fn held_lock_exhausts_retry_budget() {
        let container = InMemoryBlobContainer::default();
        let _held = RegisterLock::acquire(&container, "k", &RegisterConfig::no_retry()).unwrap();

        let config = RegisterConfig {
            max_attempts: 3,
            backoff_base: Duration::from_micros(10),
            backoff_cap: Duration::from_micros(50),
        };
        let err = RegisterLock::acquire(&container, "k", &config).unwrap_err();
        assert!(matches!(
            err,
            RegisterError::Contention { attempts: 3, .. }
        ));
    }

    #[test]
    fn released_lock_can_be_reacquired() {
        let container = InMemoryBlobContainer::default();
        let lock = RegisterLock::acquire(&container, "k", &RegisterConfig::no_retry()).unwrap();
        drop(lock);
        let _again = RegisterLock::acquire(&container, "k", &RegisterConfig::no_retry()).unwrap();
    }

    #[test]
    fn locks_on_distinct_keys_are_independent() {
        let container = InMemoryBlobContainer::default();
        let _a = RegisterLock::acquire(&container, "a", &RegisterConfig::no_retry()).unwrap();
        let _b = RegisterLock::acquire(&container, "b", &RegisterConfig::no_retry()).unwrap();
    }

    #[test]
    fn backoff_stays_within_cap() {
        let config = RegisterConfig {
            max_attempts: 10,
            backoff_base: Duration::from_millis(10),
            backoff_cap: Duration::from_millis(40),
        };
        for attempt in 1..=9 {
            assert!(backoff_delay(&config, attempt) <= config.backoff_cap);
        }
    }
}
