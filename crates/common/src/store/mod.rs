use std::fmt::Debug;
use std::time::Duration;

use async_trait::async_trait;

mod memory;

pub use memory::MemoryStore;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError<T> {
    /// The backing engine failed
    #[error("unhandled store provider error: {0}")]
    Provider(#[from] T),
    /// Nothing live is stored under the key. Absent and
    ///  expired entries are deliberately not told apart.
    #[error("key not found: {0}")]
    NotFound(String),
}

impl<T> StoreError<T> {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }
}

/// Key/value engine with per-key expiry.
///
/// Implementations must be safe to share between any number of
///  concurrent callers without external locking, and must never hand
///  out an entry whose TTL has elapsed, even if it has not been
///  physically removed yet.
#[async_trait]
pub trait SecretStore: Send + Sync + Debug + Clone + 'static {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Store `value` under `key`, to expire once `ttl` has elapsed
    ///
    /// # Arguments
    /// * `key` - Opaque key, any string
    /// * `value` - Serialized payload
    /// * `ttl` - Lifetime of the entry, counted from now
    async fn set(
        &self,
        key: &str,
        value: Vec<u8>,
        ttl: Duration,
    ) -> Result<(), StoreError<Self::Error>>;

    /// Read the value under `key` without consuming it
    ///
    /// # Returns
    /// * `Ok(Vec<u8>)` - The stored value
    /// * `Err(StoreError::NotFound)` - The key is absent or expired
    async fn get(&self, key: &str) -> Result<Vec<u8>, StoreError<Self::Error>>;

    /// Remove `key`. Removing an absent key is not an error.
    async fn delete(&self, key: &str) -> Result<(), StoreError<Self::Error>>;

    /// Atomically read and remove the value under `key`
    ///
    /// Of any number of concurrent calls for the same key, at most
    ///  one may observe the value; the rest get `NotFound`.
    async fn take(&self, key: &str) -> Result<Vec<u8>, StoreError<Self::Error>>;

    /// Physically drop expired entries, returning how many went.
    ///  Engines that expire on their own can keep the default.
    async fn purge_expired(&self) -> Result<u64, StoreError<Self::Error>> {
        Ok(0)
    }

    /// Cheap round trip used by readiness checks
    async fn ping(&self) -> Result<(), StoreError<Self::Error>> {
        Ok(())
    }
}
