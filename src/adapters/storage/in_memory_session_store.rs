//! In-Memory Session Store Adapter
//!
//! Holds one tab's session storage in memory. Used by tests and by
//! embedders that keep the store alive for the tab's lifetime.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use tokio::sync::RwLock;

use crate::ports::{SessionStore, SessionStoreError};

/// In-memory session storage
#[derive(Debug, Clone, Default)]
pub struct InMemorySessionStore {
    items: Arc<RwLock<BTreeMap<String, String>>>,
    /// When set, every operation fails with this error (failure injection).
    failure: Arc<Mutex<Option<SessionStoreError>>>,
}

impl InMemorySessionStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent operation fail with `error`
    pub fn fail_with(&self, error: SessionStoreError) {
        if let Ok(mut failure) = self.failure.lock() {
            *failure = Some(error);
        }
    }

    /// Stop injecting failures
    pub fn recover(&self) {
        if let Ok(mut failure) = self.failure.lock() {
            *failure = None;
        }
    }

    /// Number of stored keys
    pub async fn len(&self) -> usize {
        self.items.read().await.len()
    }

    /// True when nothing is stored
    pub async fn is_empty(&self) -> bool {
        self.items.read().await.is_empty()
    }

    /// Whether a key is present, bypassing failure injection
    pub async fn contains_key(&self, key: &str) -> bool {
        self.items.read().await.contains_key(key)
    }

    /// Raw value for a key, bypassing failure injection
    pub async fn raw(&self, key: &str) -> Option<String> {
        self.items.read().await.get(key).cloned()
    }

    /// Write a raw value, bypassing failure injection (useful for seeding corrupt data)
    pub async fn insert_raw(&self, key: impl Into<String>, value: impl Into<String>) {
        self.items.write().await.insert(key.into(), value.into());
    }

    fn check(&self) -> Result<(), SessionStoreError> {
        match self.failure.lock() {
            Ok(failure) => match failure.as_ref() {
                Some(err) => Err(err.clone()),
                None => Ok(()),
            },
            Err(_) => Err(SessionStoreError::Unavailable("store lock poisoned".to_string())),
        }
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get_item(&self, key: &str) -> Result<Option<String>, SessionStoreError> {
        self.check()?;
        Ok(self.items.read().await.get(key).cloned())
    }

    async fn set_item(&self, key: &str, value: String) -> Result<(), SessionStoreError> {
        self.check()?;
        self.items.write().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> Result<(), SessionStoreError> {
        self.check()?;
        self.items.write().await.remove(key);
        Ok(())
    }

    async fn keys(&self) -> Result<Vec<String>, SessionStoreError> {
        self.check()?;
        Ok(self.items.read().await.keys().cloned().collect())
    }
}
