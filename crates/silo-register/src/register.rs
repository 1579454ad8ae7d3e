//! Compare-and-set registers emulated over a blob container.

use std::io::Read;

use tracing::debug;

use silo_store::{BlobContainer, StoreError};

use crate::config::RegisterConfig;
use crate::error::{RegisterError, RegisterResult};
use crate::lock::RegisterLock;

/// Width of a register value on the medium, in bytes.
pub const REGISTER_WIDTH: usize = 8;

/// Linearizable 8-byte registers addressed by key, stored as blobs.
///
/// Each register key maps to a blob holding exactly eight big-endian
/// bytes; an absent blob reads as zero. The medium offers no atomic
/// read-modify-write, so every operation serializes against the key's
/// [`RegisterLock`]: acquire, read the witness, decide, publish through
/// the container's staged atomic replace, release. Operations on the same
/// key are totally ordered by lock acquisition; operations on different
/// keys are unordered relative to each other.
///
/// A blob of any other width marks the register corrupt: the operation
/// fails loudly and nothing is repaired or retried, so callers never act
/// on an invented witness.
#[derive(Debug)]
pub struct RegisterStore<C: BlobContainer> {
    container: C,
    config: RegisterConfig,
}

impl<C: BlobContainer> RegisterStore<C> {
    /// Wrap a container with the default lock retry policy.
    pub fn new(container: C) -> Self {
        Self::with_config(container, RegisterConfig::default())
    }

    /// Wrap a container with an explicit lock retry policy.
    pub fn with_config(container: C, config: RegisterConfig) -> Self {
        Self { container, config }
    }

    /// The underlying container.
    pub fn container(&self) -> &C {
        &self.container
    }

    /// Read the current value of register `key`; absent registers read 0.
    pub fn get(&self, key: &str) -> RegisterResult<u64> {
        let _lock = RegisterLock::acquire(&self.container, key, &self.config)?;
        self.read_locked(key)
    }

    /// Replace `key` with `updated` iff its current value is `expected`.
    ///
    /// Returns `true` when the witness matched and the replace took
    /// effect, `false` when the register was left unchanged.
    pub fn compare_and_set(&self, key: &str, expected: u64, updated: u64) -> RegisterResult<bool> {
        Ok(self.compare_and_exchange(key, expected, updated)? == expected)
    }

    /// Replace `key` with `updated` iff its current value is `expected`,
    /// returning the witness value observed at attempt time.
    ///
    /// A witness equal to `expected` means `updated` is now stored; any
    /// other witness means nothing changed and the witness is the
    /// evidence of why.
    pub fn compare_and_exchange(
        &self,
        key: &str,
        expected: u64,
        updated: u64,
    ) -> RegisterResult<u64> {
        let _lock = RegisterLock::acquire(&self.container, key, &self.config)?;
        let witness = self.read_locked(key)?;
        if witness == expected {
            self.container
                .write_blob(key, &updated.to_be_bytes(), false)?;
            debug!(key, witness, updated, "register updated");
        } else {
            debug!(key, witness, expected, "register compare failed");
        }
        Ok(witness)
    }

    /// Read and decode the register blob. Callers must hold the key's
    /// lock.
    fn read_locked(&self, key: &str) -> RegisterResult<u64> {
        let mut stream = match self.container.read_blob(key) {
            Ok(stream) => stream,
            Err(StoreError::NotFound { .. }) => return Ok(0),
            Err(e) => return Err(e.into()),
        };
        let mut raw = Vec::with_capacity(REGISTER_WIDTH + 1);
        stream.read_to_end(&mut raw).map_err(StoreError::Io)?;
        let bytes: [u8; REGISTER_WIDTH] =
            raw.as_slice()
                .try_into()
                .map_err(|_| RegisterError::Corrupt {
                    key: key.to_string(),
                    length: raw.len() as u64,
                })?;
        Ok(u64::from_be_bytes(bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use silo_store::{FsBlobStore, InMemoryBlobContainer};
    use silo_types::BlobPath;

    use crate::lock::lock_blob_name;

    fn memory_registers() -> RegisterStore<InMemoryBlobContainer> {
        RegisterStore::new(InMemoryBlobContainer::default())
    }

    fn fs_registers() -> (tempfile::TempDir, RegisterStore<silo_store::FsBlobContainer>) {
        let dir = tempfile::tempdir().unwrap();
        let store = FsBlobStore::new(dir.path().join("store")).unwrap();
        let container = store.container(&BlobPath::root()).unwrap();
        // Generous retry budget so heavily contended tests never trip the
        // contention bound.
        let config = RegisterConfig {
            max_attempts: 100,
            backoff_base: Duration::from_millis(1),
            backoff_cap: Duration::from_millis(20),
        };
        (dir, RegisterStore::with_config(container, config))
    }

    #[test]
    fn unwritten_register_reads_zero() {
        let registers = memory_registers();
        assert_eq!(registers.get("fresh").unwrap(), 0);
        let (_dir, registers) = fs_registers();
        assert_eq!(registers.get("fresh").unwrap(), 0);
    }

    #[test]
    fn cas_chain_with_carried_expected_always_succeeds() {
        let (_dir, registers) = fs_registers();
        let mut current = 0u64;
        for next in [7, 7, 42, u64::MAX, 0, 13] {
            assert!(registers.compare_and_set("epoch", current, next).unwrap());
            current = next;
        }
        assert_eq!(registers.get("epoch").unwrap(), 13);
    }

    #[test]
    fn mismatched_cas_fails_and_leaves_value() {
        let registers = memory_registers();
        assert!(registers.compare_and_set("term", 0, 5).unwrap());
        assert!(!registers.compare_and_set("term", 4, 99).unwrap());
        assert_eq!(registers.get("term").unwrap(), 5);
    }

    #[test]
    fn mismatched_cae_returns_witness_and_leaves_value() {
        let registers = memory_registers();
        assert_eq!(registers.compare_and_exchange("term", 0, 5).unwrap(), 0);
        assert_eq!(registers.compare_and_exchange("term", 3, 99).unwrap(), 5);
        assert_eq!(registers.get("term").unwrap(), 5);
    }

    #[test]
    fn registers_on_distinct_keys_are_independent() {
        let registers = memory_registers();
        assert!(registers.compare_and_set("a", 0, 1).unwrap());
        assert!(registers.compare_and_set("b", 0, 2).unwrap());
        assert_eq!(registers.get("a").unwrap(), 1);
        assert_eq!(registers.get("b").unwrap(), 2);
    }

    #[test]
    fn value_survives_reopening_the_store() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("store");
        {
            let store = FsBlobStore::new(&root).unwrap();
            let registers = RegisterStore::new(store.container(&BlobPath::root()).unwrap());
            assert!(registers.compare_and_set("lease", 0, 77).unwrap());
        }
        let store = FsBlobStore::new(&root).unwrap();
        let registers = RegisterStore::new(store.container(&BlobPath::root()).unwrap());
        assert_eq!(registers.get("lease").unwrap(), 77);
    }

    #[test]
    fn wrong_width_blob_is_corrupt() {
        for width in [1usize, 7, 9] {
            let registers = memory_registers();
            registers
                .container()
                .write_blob("term", &vec![0xab; width], false)
                .unwrap();
            let err = registers.compare_and_exchange("term", 0, 1).unwrap_err();
            match err {
                RegisterError::Corrupt { length, .. } => assert_eq!(length, width as u64),
                other => panic!("expected Corrupt, got: {other}"),
            }
            // Fatal, not repaired: the corrupt bytes are still there.
            let err = registers.get("term").unwrap_err();
            assert!(matches!(err, RegisterError::Corrupt { .. }));
        }
    }

    #[test]
    fn corruption_failure_still_releases_the_lock() {
        let registers = memory_registers();
        registers
            .container()
            .write_blob("term", &[1, 2, 3], false)
            .unwrap();
        assert!(matches!(
            registers.get("term").unwrap_err(),
            RegisterError::Corrupt { .. }
        ));
        assert!(!registers
            .container()
            .blob_exists(&lock_blob_name("term"))
            .unwrap());
    }

    #[test]
    fn held_lock_surfaces_contention_without_touching_the_register() {
        let container = InMemoryBlobContainer::default();
        assert!(container.try_create_exclusive(&lock_blob_name("k")).unwrap());

        let config = RegisterConfig {
            max_attempts: 2,
            backoff_base: Duration::from_micros(10),
            backoff_cap: Duration::from_micros(50),
        };
        let registers = RegisterStore::with_config(container, config);
        let err = registers.compare_and_set("k", 0, 1).unwrap_err();
        assert!(matches!(err, RegisterError::Contention { attempts: 2, .. }));

        // Once the holder releases, the same call goes through.
        registers
            .container()
            .delete_blob(&lock_blob_name("k"))
            .unwrap();
        assert!(registers.compare_and_set("k", 0, 1).unwrap());
    }

    #[test]
    fn concurrent_same_expected_cas_has_exactly_one_winner() {
        let (_dir, registers) = fs_registers();
        let winners: Vec<bool> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8u64)
                .map(|i| {
                    let registers = &registers;
                    scope.spawn(move || registers.compare_and_set("seat", 0, i + 1).unwrap())
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });
        assert_eq!(winners.iter().filter(|won| **won).count(), 1);
        let value = registers.get("seat").unwrap();
        assert!((1..=8).contains(&value));
    }

    #[test]
    fn concurrent_increments_all_land() {
        let (_dir, registers) = fs_registers();
        let threads = 4u64;
        let increments = 8u64;
        std::thread::scope(|scope| {
            for _ in 0..threads {
                let registers = &registers;
                scope.spawn(move || {
                    for _ in 0..increments {
                        loop {
                            let current = registers.get("counter").unwrap();
                            if registers
                                .compare_and_set("counter", current, current + 1)
                                .unwrap()
                            {
                                break;
                            }
                        }
                    }
                });
            }
        });
        assert_eq!(registers.get("counter").unwrap(), threads * increments);
    }
}
