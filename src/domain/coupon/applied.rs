//! Client-held coupon records.

use serde::{Deserialize, Serialize};

use super::{Coupon, ItemRef, Pricing};
use crate::domain::foundation::Timestamp;

/// A coupon the pricing authority accepted for one item.
///
/// Only ever constructed from a valid outcome, so `valid` is always `true`
/// for records this crate writes. Records read back with `valid == false`
/// are treated as corrupt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppliedCoupon {
    pub coupon: Coupon,
    pub pricing: Pricing,
    pub valid: bool,
    pub timestamp: Timestamp,
}

impl AppliedCoupon {
    pub fn new(coupon: Coupon, pricing: Pricing, timestamp: Timestamp) -> Self {
        Self {
            coupon,
            pricing,
            valid: true,
            timestamp,
        }
    }

    pub fn is_recurring(&self) -> bool {
        self.coupon.is_recurring
    }
}

/// Checkout-scoped projection of an applied coupon.
///
/// `item` is the per-item entry it was collected from, or `None` for codes
/// entered directly at checkout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CouponData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item: Option<ItemRef>,
    pub coupon: Coupon,
    pub pricing: Pricing,
    pub valid: bool,
    pub timestamp: Timestamp,
}

impl CouponData {
    pub fn from_applied(item: Option<ItemRef>, applied: AppliedCoupon) -> Self {
        Self {
            item,
            coupon: applied.coupon,
            pricing: applied.pricing,
            valid: applied.valid,
            timestamp: applied.timestamp,
        }
    }

    pub fn code(&self) -> &str {
        &self.coupon.code
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::coupon::{DiscountType, ItemType};

    fn applied(recurring: bool) -> AppliedCoupon {
        AppliedCoupon::new(
            Coupon {
                id: 3,
                code: "MONTHLY".to_string(),
                name: "Monthly".to_string(),
                description: Some("every month".to_string()),
                discount_type: DiscountType::Percentage,
                discount_value: 10.0,
                is_recurring: recurring,
            },
            Pricing {
                discount_amount: 10000.0,
                ..Default::default()
            },
            Timestamp::from_unix_millis(1_000),
        )
    }

    #[test]
    fn new_applied_coupon_is_valid() {
        assert!(applied(false).valid);
    }

    #[test]
    fn projection_keeps_everything() {
        let source = applied(true);
        let item = ItemRef::new(ItemType::Course, 5);
        let data = CouponData::from_applied(Some(item), source.clone());

        assert_eq!(data.item, Some(item));
        assert_eq!(data.coupon, source.coupon);
        assert_eq!(data.pricing, source.pricing);
        assert_eq!(data.timestamp, source.timestamp);
        assert!(data.valid);
        assert!(data.coupon.is_recurring);
        assert_eq!(data.code(), "MONTHLY");
    }

    #[test]
    fn checkout_only_data_omits_item() {
        let data = CouponData::from_applied(None, applied(false));
        let json = serde_json::to_value(&data).unwrap();
        assert!(json.get("item").is_none());
    }
}
