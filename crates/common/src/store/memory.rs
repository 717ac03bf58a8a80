use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::RwLock;
use tokio::time::Instant;

use super::{SecretStore, StoreError};

/// In-memory store using a HashMap.
///
/// Expiry is lazy: entries past their deadline are invisible to
///  readers and only dropped by [`SecretStore::purge_expired`] or
///  when overwritten.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<HashMap<String, Entry>>>,
}

#[derive(Debug)]
struct Entry {
    value: Vec<u8>,
    expires_at: Instant,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries held, expired ones included
    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }
}

#[async_trait]
impl SecretStore for MemoryStore {
    type Error = Infallible;

    async fn set(
        &self,
        key: &str,
        value: Vec<u8>,
        ttl: Duration,
    ) -> Result<(), StoreError<Self::Error>> {
        let expires_at = Instant::now() + ttl;
        self.inner
            .write()
            .insert(key.to_string(), Entry { value, expires_at });
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>, StoreError<Self::Error>> {
        let now = Instant::now();
        self.inner
            .read()
            .get(key)
            .filter(|entry| entry.is_live(now))
            .map(|entry| entry.value.clone())
            .ok_or_else(|| StoreError::NotFound(key.to_string()))
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError<Self::Error>> {
        self.inner.write().remove(key);
        Ok(())
    }

    async fn take(&self, key: &str) -> Result<Vec<u8>, StoreError<Self::Error>> {
        let now = Instant::now();
        // remove under the write lock so only one caller can win
        self.inner
            .write()
            .remove(key)
            .filter(|entry| entry.is_live(now))
            .map(|entry| entry.value)
            .ok_or_else(|| StoreError::NotFound(key.to_string()))
    }

    async fn purge_expired(&self) -> Result<u64, StoreError<Self::Error>> {
        let now = Instant::now();
        let mut inner = self.inner.write();
        let before = inner.len();
        inner.retain(|_, entry| entry.is_live(now));
        Ok((before - inner.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOUR: Duration = Duration::from_secs(60 * 60);

    #[tokio::test]
    async fn test_set_get_delete() {
        let store = MemoryStore::new();
        store.set("a", b"one".to_vec(), HOUR).await.unwrap();

        assert_eq!(store.get("a").await.unwrap(), b"one");
        // reads do not consume
        assert_eq!(store.get("a").await.unwrap(), b"one");

        store.delete("a").await.unwrap();
        assert!(store.get("a").await.unwrap_err().is_not_found());

        // deleting again is fine
        store.delete("a").await.unwrap();
    }

    #[tokio::test]
    async fn test_take_consumes() {
        let store = MemoryStore::new();
        store.set("a", b"one".to_vec(), HOUR).await.unwrap();

        assert_eq!(store.take("a").await.unwrap(), b"one");
        assert!(store.take("a").await.unwrap_err().is_not_found());
        assert!(store.get("a").await.unwrap_err().is_not_found());
    }

    #[tokio::test(start_paused = true)]
    async fn test_entries_expire() {
        let store = MemoryStore::new();
        store.set("short", b"x".to_vec(), HOUR).await.unwrap();
        store.set("long", b"y".to_vec(), HOUR * 2).await.unwrap();

        tokio::time::advance(HOUR + Duration::from_secs(1)).await;

        assert!(store.get("short").await.unwrap_err().is_not_found());
        assert!(store.take("short").await.unwrap_err().is_not_found());
        assert_eq!(store.get("long").await.unwrap(), b"y");
    }

    #[tokio::test(start_paused = true)]
    async fn test_purge_expired() {
        let store = MemoryStore::new();
        store.set("a", b"x".to_vec(), HOUR).await.unwrap();
        store.set("b", b"x".to_vec(), HOUR).await.unwrap();
        store.set("c", b"x".to_vec(), HOUR * 3).await.unwrap();
        assert_eq!(store.len(), 3);

        tokio::time::advance(HOUR * 2).await;

        assert_eq!(store.purge_expired().await.unwrap(), 2);
        assert_eq!(store.len(), 1);
        assert_eq!(store.purge_expired().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_zero_length_value() {
        let store = MemoryStore::new();
        store.set("empty", Vec::new(), HOUR).await.unwrap();
        assert!(store.get("empty").await.unwrap().is_empty());
    }
}
