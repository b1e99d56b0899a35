//! Expiring key-value cache over the session store.
//!
//! Per-item entries live under `{item_prefix}{item_type}_{item_id}` and the
//! checkout bundle under its own key outside that prefix. Every entry is
//! stored as `{"timestamp": ..., "payload": ...}`.
//!
//! Expiration is lazy: a read that finds an entry older than the TTL deletes
//! it and reports a miss. There is no background sweeper; `sweep` runs when
//! callers ask for it. Entries that fail to parse are deleted the same way
//! and never reported as errors.

use chrono::Duration;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::CacheConfig;
use crate::domain::coupon::ItemRef;
use crate::domain::foundation::Timestamp;
use crate::ports::{Clock, SessionStore, SessionStoreError};

/// Errors surfaced by the cache. Corrupt or expired data is never one of them.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CacheError {
    #[error("Session store failure: {0}")]
    Store(#[from] SessionStoreError),

    #[error("Failed to serialize cache entry: {0}")]
    Serialization(String),
}

#[derive(Serialize)]
struct EntryRef<'a, T> {
    timestamp: Timestamp,
    payload: &'a T,
}

#[derive(Deserialize)]
struct Entry<T> {
    timestamp: Timestamp,
    payload: T,
}

/// A live per-item entry found by a namespace scan.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedEntry<T> {
    pub key: String,
    /// Parsed from the key, `None` if the suffix is not a known item.
    pub item: Option<ItemRef>,
    pub stored_at: Timestamp,
    pub value: T,
}

pub struct ExpiringCache {
    store: Arc<dyn SessionStore>,
    clock: Arc<dyn Clock>,
    item_prefix: String,
    checkout_key: String,
    ttl: Duration,
}

impl ExpiringCache {
    pub fn new(store: Arc<dyn SessionStore>, clock: Arc<dyn Clock>, config: &CacheConfig) -> Self {
        Self {
            store,
            clock,
            item_prefix: config.item_prefix.clone(),
            checkout_key: config.checkout_key.clone(),
            ttl: config.ttl(),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Current time according to the cache's clock.
    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    pub fn item_key(&self, item: &ItemRef) -> String {
        format!("{}{}", self.item_prefix, item.key_suffix())
    }

    pub fn checkout_key(&self) -> &str {
        &self.checkout_key
    }

    /// Stores `payload` for `item` stamped with the current time.
    pub async fn set<T: Serialize + Sync>(&self, item: &ItemRef, payload: &T) -> Result<(), CacheError> {
        let key = self.item_key(item);
        self.write_key(&key, payload).await
    }

    /// Reads the live payload for `item`.
    pub async fn get<T: DeserializeOwned>(&self, item: &ItemRef) -> Result<Option<T>, CacheError> {
        let key = self.item_key(item);
        Ok(self.read_key(&key).await?.map(|entry| entry.payload))
    }

    /// Deletes the entry for `item`. Absent entries are fine.
    pub async fn clear(&self, item: &ItemRef) -> Result<(), CacheError> {
        let key = self.item_key(item);
        self.store.remove_item(&key).await?;
        Ok(())
    }

    /// Deletes expired and unreadable entries under the item prefix.
    ///
    /// Returns how many were deleted.
    pub async fn sweep(&self) -> Result<usize, CacheError> {
        let before = self.prefixed_keys().await?.len();
        let live = self.live_entries::<serde_json::Value>().await?.len();
        let removed = before.saturating_sub(live);
        if removed > 0 {
            tracing::debug!(removed, "Swept stale coupon entries");
        }
        Ok(removed)
    }

    /// Every live per-item entry whose payload parses as `T`.
    ///
    /// Expired entries and entries that do not parse as `T` are deleted on
    /// the way.
    pub async fn live_entries<T: DeserializeOwned>(&self) -> Result<Vec<CachedEntry<T>>, CacheError> {
        let mut entries = Vec::new();
        for key in self.prefixed_keys().await? {
            if let Some(entry) = self.read_key::<T>(&key).await? {
                let item = ItemRef::parse_key_suffix(&key[self.item_prefix.len()..]);
                entries.push(CachedEntry {
                    key,
                    item,
                    stored_at: entry.timestamp,
                    value: entry.payload,
                });
            }
        }
        Ok(entries)
    }

    /// Deletes every per-item entry and the checkout bundle.
    pub async fn clear_all(&self) -> Result<usize, CacheError> {
        let keys = self.prefixed_keys().await?;
        for key in &keys {
            self.store.remove_item(key).await?;
        }
        self.store.remove_item(&self.checkout_key).await?;
        Ok(keys.len())
    }

    pub async fn set_checkout<T: Serialize + Sync>(&self, payload: &T) -> Result<(), CacheError> {
        let key = self.checkout_key.clone();
        self.write_key(&key, payload).await
    }

    pub async fn get_checkout<T: DeserializeOwned>(&self) -> Result<Option<T>, CacheError> {
        let key = self.checkout_key.clone();
        Ok(self.read_key(&key).await?.map(|entry| entry.payload))
    }

    pub async fn clear_checkout(&self) -> Result<(), CacheError> {
        self.store.remove_item(&self.checkout_key).await?;
        Ok(())
    }

    async fn prefixed_keys(&self) -> Result<Vec<String>, CacheError> {
        Ok(self
            .store
            .keys()
            .await?
            .into_iter()
            .filter(|key| key.starts_with(&self.item_prefix))
            .collect())
    }

    async fn write_key<T: Serialize + Sync>(&self, key: &str, payload: &T) -> Result<(), CacheError> {
        let entry = EntryRef {
            timestamp: self.clock.now(),
            payload,
        };
        let json =
            serde_json::to_string(&entry).map_err(|e| CacheError::Serialization(e.to_string()))?;
        self.store.set_item(key, json).await?;
        Ok(())
    }

    async fn read_key<T: DeserializeOwned>(&self, key: &str) -> Result<Option<Entry<T>>, CacheError> {
        let Some(raw) = self.store.get_item(key).await? else {
            return Ok(None);
        };

        let entry: Entry<T> = match serde_json::from_str(&raw) {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(key, error = %e, "Deleting unreadable cache entry");
                self.store.remove_item(key).await?;
                return Ok(None);
            }
        };

        if entry.timestamp.is_older_than(self.ttl, &self.clock.now()) {
            tracing::debug!(key, "Cache entry expired");
            self.store.remove_item(key).await?;
            return Ok(None);
        }

        Ok(Some(entry))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{InMemorySessionStore, ManualClock};
    use crate::domain::coupon::ItemType;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Note {
        text: String,
    }

    fn note(text: &str) -> Note {
        Note {
            text: text.to_string(),
        }
    }

    fn setup() -> (ExpiringCache, InMemorySessionStore, ManualClock) {
        let store = InMemorySessionStore::new();
        let clock = ManualClock::at_unix_millis(1_700_000_000_000);
        let cache = ExpiringCache::new(
            Arc::new(store.clone()),
            Arc::new(clock.clone()),
            &CacheConfig::default(),
        );
        (cache, store, clock)
    }

    fn course(id: u64) -> ItemRef {
        ItemRef::new(ItemType::Course, id)
    }

    #[test]
    fn item_key_layout() {
        let (cache, _, _) = setup();
        assert_eq!(cache.item_key(&course(12)), "coupon_course_12");
        assert_eq!(cache.checkout_key(), "checkout_coupon");
    }

    #[tokio::test]
    async fn set_then_get() {
        let (cache, _, _) = setup();
        cache.set(&course(1), &note("hi")).await.unwrap();
        assert_eq!(cache.get::<Note>(&course(1)).await.unwrap(), Some(note("hi")));
        assert_eq!(cache.get::<Note>(&course(2)).await.unwrap(), None);
    }

    #[tokio::test]
    async fn entry_is_live_until_ttl_and_gone_after() {
        let (cache, store, clock) = setup();
        let ttl_ms = cache.ttl().num_milliseconds();
        cache.set(&course(1), &note("x")).await.unwrap();

        clock.advance_millis(ttl_ms - 1);
        assert_eq!(cache.get::<Note>(&course(1)).await.unwrap(), Some(note("x")));

        clock.advance_millis(2);
        assert_eq!(cache.get::<Note>(&course(1)).await.unwrap(), None);
        assert!(!store.contains_key("coupon_course_1").await);
    }

    #[tokio::test]
    async fn set_overwrites_previous_entry() {
        let (cache, store, _) = setup();
        cache.set(&course(1), &note("old")).await.unwrap();
        cache.set(&course(1), &note("new")).await.unwrap();

        assert_eq!(cache.get::<Note>(&course(1)).await.unwrap(), Some(note("new")));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn corrupt_entry_reads_as_absent_and_is_deleted() {
        let (cache, store, _) = setup();
        store.insert_raw("coupon_course_1", "{not json").await;

        assert_eq!(cache.get::<Note>(&course(1)).await.unwrap(), None);
        assert!(!store.contains_key("coupon_course_1").await);
    }

    #[tokio::test]
    async fn clear_is_idempotent() {
        let (cache, _, _) = setup();
        cache.set(&course(1), &note("x")).await.unwrap();
        cache.clear(&course(1)).await.unwrap();
        cache.clear(&course(1)).await.unwrap();
        assert_eq!(cache.get::<Note>(&course(1)).await.unwrap(), None);
    }

    #[tokio::test]
    async fn sweep_removes_expired_and_corrupt_only_under_prefix() {
        let (cache, store, clock) = setup();
        cache.set(&course(1), &note("old")).await.unwrap();
        clock.advance(Duration::minutes(31));
        cache.set(&course(2), &note("fresh")).await.unwrap();
        store.insert_raw("coupon_event_9", "garbage").await;
        store.insert_raw("unrelated_key", "garbage").await;

        let removed = cache.sweep().await.unwrap();

        assert_eq!(removed, 2);
        assert!(store.contains_key("coupon_course_2").await);
        assert!(store.contains_key("unrelated_key").await);
        assert!(!store.contains_key("coupon_course_1").await);
        assert!(!store.contains_key("coupon_event_9").await);
    }

    #[tokio::test]
    async fn live_entries_parse_item_from_key() {
        let (cache, store, _) = setup();
        cache.set(&course(4), &note("a")).await.unwrap();
        store
            .insert_raw(
                "coupon_raffle_1",
                serde_json::json!({"timestamp": cache.now(), "payload": {"text": "b"}}).to_string(),
            )
            .await;

        let entries = cache.live_entries::<Note>().await.unwrap();

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].item, Some(course(4)));
        assert_eq!(entries[1].key, "coupon_raffle_1");
        assert_eq!(entries[1].item, None);
    }

    #[tokio::test]
    async fn checkout_bundle_is_separate_from_items() {
        let (cache, store, _) = setup();
        cache.set_checkout(&vec![note("a"), note("b")]).await.unwrap();
        cache.set(&course(1), &note("c")).await.unwrap();

        assert_eq!(cache.live_entries::<Note>().await.unwrap().len(), 1);
        assert_eq!(
            cache.get_checkout::<Vec<Note>>().await.unwrap(),
            Some(vec![note("a"), note("b")])
        );

        cache.clear_checkout().await.unwrap();
        assert!(!store.contains_key("checkout_coupon").await);
        assert!(store.contains_key("coupon_course_1").await);
    }

    #[tokio::test]
    async fn checkout_bundle_expires_too() {
        let (cache, _, clock) = setup();
        cache.set_checkout(&vec![note("a")]).await.unwrap();
        clock.advance(Duration::minutes(30) + Duration::milliseconds(1));
        assert_eq!(cache.get_checkout::<Vec<Note>>().await.unwrap(), None);
    }

    #[tokio::test]
    async fn clear_all_removes_items_and_bundle_only() {
        let (cache, store, _) = setup();
        cache.set(&course(1), &note("a")).await.unwrap();
        cache.set(&ItemRef::new(ItemType::Event, 2), &note("b")).await.unwrap();
        cache.set_checkout(&vec![note("a")]).await.unwrap();
        store.insert_raw("auth_token", "keep me").await;

        assert_eq!(cache.clear_all().await.unwrap(), 2);
        assert_eq!(store.keys().await.unwrap(), vec!["auth_token".to_string()]);
    }

    #[tokio::test]
    async fn store_failures_propagate() {
        let (cache, store, _) = setup();
        store.fail_with(SessionStoreError::Unavailable("disabled".to_string()));

        assert!(matches!(
            cache.get::<Note>(&course(1)).await,
            Err(CacheError::Store(_))
        ));
        assert!(cache.set(&course(1), &note("x")).await.is_err());
    }
}
