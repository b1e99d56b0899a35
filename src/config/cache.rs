//! Coupon cache configuration

use chrono::Duration;
use serde::Deserialize;
use std::path::PathBuf;

use super::error::ValidationError;

/// Expiring cache configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// Lifetime of cached coupons in minutes
    #[serde(default = "default_ttl_minutes")]
    pub ttl_minutes: i64,

    /// Namespace prefix of per-item keys (`{prefix}{item_type}_{item_id}`)
    #[serde(default = "default_item_prefix")]
    pub item_prefix: String,

    /// Key of the checkout bundle
    #[serde(default = "default_checkout_key")]
    pub checkout_key: String,

    /// Persist the session store to this file instead of memory
    #[serde(default)]
    pub storage_path: Option<PathBuf>,
}

/// Upper bound on the cache TTL (one day)
const MAX_TTL_MINUTES: i64 = 24 * 60;

fn default_ttl_minutes() -> i64 {
    30
}

fn default_item_prefix() -> String {
    "coupon_".to_string()
}

fn default_checkout_key() -> String {
    "checkout_coupon".to_string()
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_minutes: default_ttl_minutes(),
            item_prefix: default_item_prefix(),
            checkout_key: default_checkout_key(),
            storage_path: None,
        }
    }
}

impl CacheConfig {
    /// TTL as a duration, clamped to the range `validate` accepts
    pub fn ttl(&self) -> Duration {
        Duration::minutes(self.ttl_minutes.clamp(1, MAX_TTL_MINUTES))
    }

    /// Validate cache configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(1..=MAX_TTL_MINUTES).contains(&self.ttl_minutes) {
            return Err(ValidationError::InvalidTtl);
        }
        if self.item_prefix.is_empty() {
            return Err(ValidationError::EmptyItemPrefix);
        }
        if self.checkout_key.is_empty() {
            return Err(ValidationError::MissingRequired("CACHE__CHECKOUT_KEY"));
        }
        // A bundle key under the item prefix would be swept as a per-item entry.
        if self.checkout_key.starts_with(&self.item_prefix) {
            return Err(ValidationError::CheckoutKeyCollidesWithPrefix);
        }
        Ok(())
    }
}
