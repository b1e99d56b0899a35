//! Session Store Port - tab-scoped string key/value storage.
//!
//! Models the browser's per-tab session storage: values survive reloads
//! within one tab session and are never shared across tabs.

use async_trait::async_trait;

/// Errors that can occur during session store operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionStoreError {
    #[error("Session storage unavailable: {0}")]
    Unavailable(String),

    #[error("Session storage quota exceeded for key: {0}")]
    QuotaExceeded(String),

    #[error("IO error: {0}")]
    IoError(String),
}

/// Port for a flat string key/value store
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Read a value, `None` if the key is absent
    async fn get_item(&self, key: &str) -> Result<Option<String>, SessionStoreError>;

    /// Write a value, replacing any previous one
    async fn set_item(&self, key: &str, value: String) -> Result<(), SessionStoreError>;

    /// Delete a key. Deleting an absent key is not an error.
    async fn remove_item(&self, key: &str) -> Result<(), SessionStoreError>;

    /// All keys currently stored
    async fn keys(&self) -> Result<Vec<String>, SessionStoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quota_error_names_the_key() {
        let err = SessionStoreError::QuotaExceeded("coupon_course_1".to_string());
        assert!(err.to_string().contains("coupon_course_1"));
    }

    #[test]
    fn session_store_is_object_safe() {
        fn _accepts_dyn(_store: &dyn SessionStore) {}
    }
}
