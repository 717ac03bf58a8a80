//! Shared test utilities for vault integration tests
#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use ::common::prelude::*;

#[derive(Debug, thiserror::Error)]
#[error("injected fault: {0}")]
pub struct InjectedFault(pub &'static str);

/// Switches that make a [`FaultyStore`] misbehave
#[derive(Debug, Default)]
pub struct Faults {
    /// fail any `set` whose key starts with this prefix
    pub fail_set_prefix: Mutex<Option<String>>,
    /// let this many `set` calls through, then fail the rest
    pub sets_allowed: Mutex<Option<usize>>,
    pub sets_seen: AtomicUsize,
    /// keys of every `set` that reached the inner store
    pub written: Mutex<Vec<String>>,
    pub fail_get: AtomicBool,
    pub fail_take: AtomicBool,
    /// never complete a `take`
    pub stall_take: AtomicBool,
}

/// A [`MemoryStore`] with fault injection
#[derive(Debug, Clone, Default)]
pub struct FaultyStore {
    pub inner: MemoryStore,
    pub faults: Arc<Faults>,
}

impl FaultyStore {
    pub fn fail_sets_with_prefix(&self, prefix: &str) {
        *self.faults.fail_set_prefix.lock() = Some(prefix.to_string());
    }

    pub fn fail_sets_after(&self, allowed: usize) {
        *self.faults.sets_allowed.lock() = Some(allowed);
    }

    pub fn fail_gets(&self) {
        self.faults.fail_get.store(true, Ordering::SeqCst);
    }

    pub fn fail_takes(&self) {
        self.faults.fail_take.store(true, Ordering::SeqCst);
    }

    pub fn stall_takes(&self) {
        self.faults.stall_take.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl SecretStore for FaultyStore {
    type Error = InjectedFault;

    async fn set(
        &self,
        key: &str,
        value: Vec<u8>,
        ttl: Duration,
    ) -> Result<(), StoreError<Self::Error>> {
        if let Some(prefix) = self.faults.fail_set_prefix.lock().as_deref() {
            if key.starts_with(prefix) {
                return Err(StoreError::Provider(InjectedFault("set")));
            }
        }
        let seen = self.faults.sets_seen.fetch_add(1, Ordering::SeqCst);
        if let Some(allowed) = *self.faults.sets_allowed.lock() {
            if seen >= allowed {
                return Err(StoreError::Provider(InjectedFault("set")));
            }
        }
        self.faults.written.lock().push(key.to_string());
        self.inner
            .set(key, value, ttl)
            .await
            .map_err(|_| StoreError::Provider(InjectedFault("unreachable")))
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>, StoreError<Self::Error>> {
        if self.faults.fail_get.load(Ordering::SeqCst) {
            return Err(StoreError::Provider(InjectedFault("get")));
        }
        self.inner.get(key).await.map_err(|e| match e {
            StoreError::NotFound(key) => StoreError::NotFound(key),
            StoreError::Provider(never) => match never {},
        })
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError<Self::Error>> {
        self.inner.delete(key).await.map_err(|e| match e {
            StoreError::NotFound(key) => StoreError::NotFound(key),
            StoreError::Provider(never) => match never {},
        })
    }

    async fn take(&self, key: &str) -> Result<Vec<u8>, StoreError<Self::Error>> {
        if self.faults.stall_take.load(Ordering::SeqCst) {
            futures::future::pending::<()>().await;
        }
        if self.faults.fail_take.load(Ordering::SeqCst) {
            return Err(StoreError::Provider(InjectedFault("take")));
        }
        self.inner.take(key).await.map_err(|e| match e {
            StoreError::NotFound(key) => StoreError::NotFound(key),
            StoreError::Provider(never) => match never {},
        })
    }
}

pub fn memory_vault() -> Vault<MemoryStore> {
    Vault::new(MemoryStore::new(), VaultConfig::default())
}

pub fn faulty_vault() -> (Vault<FaultyStore>, FaultyStore) {
    let store = FaultyStore::default();
    (Vault::new(store.clone(), VaultConfig::default()), store)
}
