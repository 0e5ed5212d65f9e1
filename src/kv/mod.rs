//! Key-value storage abstraction with per-entry expiry.
//!
//! Both the state token manager and the credential store sit on top of this
//! trait. Two backends are provided:
//!
//! - [`MemoryStore`]: concurrent in-process map, used for tests and
//!   single-instance deployments
//! - [`RedisStore`]: shared Redis instance, used when several API processes
//!   must see the same pending states and credentials
//!
//! Implementations must make [`KeyValueStore::take`] atomic: two concurrent
//! callers taking the same key must never both observe the value.

mod memory;
mod redis_store;

pub use self::memory::{run_expiry_sweep, MemoryStore};
pub use self::redis_store::RedisStore;

use crate::error::Result;
use async_trait::async_trait;
use std::time::Duration;

#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Returns the value for `key`, or `None` when absent or expired.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    ///
    /// `ttl = None` keeps the entry until it is deleted.
    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<()>;

    /// Removes `key`. Returns `true` if a live entry was removed.
    async fn delete(&self, key: &str) -> Result<bool>;

    /// Atomically reads and removes `key`.
    async fn take(&self, key: &str) -> Result<Option<String>>;
}
