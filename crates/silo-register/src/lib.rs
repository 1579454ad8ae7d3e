//! Emulated compare-and-set registers for silo.
//!
//! Durable coordination (leases, epoch counters, leader terms) needs a
//! linearizable compare-and-set register, but plain files only offer
//! atomic rename and atomic exclusive create. This crate builds the
//! missing primitive out of those two: a per-key lock marker created with
//! exclusive-create semantics serializes all attempts against a key, and
//! the winning attempt publishes the new 8-byte value through the blob
//! container's staged atomic replace.
//!
//! # Key Types
//!
//! - [`RegisterStore`] -- get / compare-and-set / compare-and-exchange
//!   over any [`BlobContainer`](silo_store::BlobContainer)
//! - [`RegisterLock`] -- RAII per-key lock, released on every exit path
//! - [`RegisterConfig`] -- lock retry budget and backoff curve
//! - [`RegisterError`] -- corruption is fatal and loud; contention is
//!   transient and retried
//!
//! Scope is a single shared medium visible to all callers: every process
//! coordinating through a register must see the same underlying storage.

pub mod config;
pub mod error;
pub mod lock;
pub mod register;

pub use config::RegisterConfig;
pub use error::{RegisterError, RegisterResult};
pub use lock::{lock_blob_name, RegisterLock};
pub use register::{RegisterStore, REGISTER_WIDTH};
