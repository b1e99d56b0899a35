//! Priced item identity.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::domain::foundation::ValidationError;

/// Kind of priced item a coupon can be validated against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    Course,
    Event,
    Product,
}

impl ItemType {
    /// Tag used in storage keys and endpoint paths.
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemType::Course => "course",
            ItemType::Event => "event",
            ItemType::Product => "product",
        }
    }
}

impl std::fmt::Display for ItemType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "course" => Ok(ItemType::Course),
            "event" => Ok(ItemType::Event),
            "product" => Ok(ItemType::Product),
            other => Err(ValidationError::invalid_format(
                "item_type",
                format!("unknown item type '{}'", other),
            )),
        }
    }
}

/// A `(item_type, item_id)` pair.
///
/// An id of `0` means the page has not finished loading the item yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemRef {
    pub item_type: ItemType,
    pub item_id: u64,
}

impl ItemRef {
    pub fn new(item_type: ItemType, item_id: u64) -> Self {
        Self { item_type, item_id }
    }

    /// Placeholder for an item whose id is still loading.
    pub fn pending(item_type: ItemType) -> Self {
        Self::new(item_type, 0)
    }

    /// True once the item id has resolved to a positive value.
    pub fn is_ready(&self) -> bool {
        self.item_id > 0
    }

    /// Returns a copy pointing at another id of the same type.
    pub fn with_id(&self, item_id: u64) -> Self {
        Self::new(self.item_type, item_id)
    }

    /// `{item_type}_{item_id}`, the part of a storage key after the namespace.
    pub fn key_suffix(&self) -> String {
        format!("{}_{}", self.item_type, self.item_id)
    }

    /// Inverse of [`ItemRef::key_suffix`].
    pub fn parse_key_suffix(suffix: &str) -> Option<Self> {
        let (item_type, item_id) = suffix.rsplit_once('_')?;
        let item_type = item_type.parse().ok()?;
        let item_id = item_id.parse().ok()?;
        Some(Self::new(item_type, item_id))
    }
}
