//! Checkout aggregator.
//!
//! Collects every live per-item coupon into one checkout bundle so the
//! checkout page never needs to know which pages produced them. None of the
//! operations here fail: storage errors are logged and the caller gets a
//! safe empty result.

use std::sync::Arc;

use crate::domain::coupon::{AppliedCoupon, CouponData, ItemRef};
use crate::domain::foundation::Timestamp;
use crate::domain::pricing::{calculate_stacked, PriceBreakdown, PricedLineItem};

use super::expiring_cache::ExpiringCache;

pub struct CheckoutCoupons {
    cache: Arc<ExpiringCache>,
}

impl CheckoutCoupons {
    pub fn new(cache: Arc<ExpiringCache>) -> Self {
        Self { cache }
    }

    pub fn now(&self) -> Timestamp {
        self.cache.now()
    }

    /// Gathers live per-item coupons and, when there are any, persists them
    /// as the checkout bundle. Expired, corrupt and invalid entries are
    /// deleted along the way.
    pub async fn transfer_to_checkout(&self) -> Vec<CouponData> {
        let entries = match self.cache.live_entries::<AppliedCoupon>().await {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to scan per-item coupons");
                return Vec::new();
            }
        };

        let mut coupons = Vec::with_capacity(entries.len());
        for entry in entries {
            if entry.value.valid {
                coupons.push(CouponData::from_applied(entry.item, entry.value));
                continue;
            }
            tracing::warn!(key = %entry.key, "Dropping cached coupon stored as invalid");
            if let Some(item) = entry.item {
                if let Err(e) = self.cache.clear(&item).await {
                    tracing::warn!(error = %e, "Failed to clear coupon entry");
                }
            }
        }

        if coupons.is_empty() {
            return coupons;
        }

        match self.cache.set_checkout(&coupons).await {
            Ok(()) => tracing::info!(count = coupons.len(), "Coupons transferred to checkout"),
            Err(e) => tracing::warn!(error = %e, "Failed to persist checkout coupons"),
        }
        coupons
    }

    /// The checkout bundle, or a fresh transfer when there is none.
    pub async fn checkout_coupons(&self) -> Vec<CouponData> {
        match self.cache.get_checkout::<Vec<CouponData>>().await {
            Ok(Some(coupons)) if !coupons.is_empty() => coupons,
            Ok(_) => self.transfer_to_checkout().await,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read checkout coupons");
                Vec::new()
            }
        }
    }

    /// Replaces the bundle. An empty list clears it.
    pub async fn set_checkout_coupons(&self, coupons: &[CouponData]) {
        if coupons.is_empty() {
            self.clear_checkout_coupons().await;
            return;
        }
        if let Err(e) = self.cache.set_checkout(&coupons).await {
            tracing::warn!(error = %e, "Failed to persist checkout coupons");
        }
    }

    pub async fn clear_checkout_coupons(&self) {
        if let Err(e) = self.cache.clear_checkout().await {
            tracing::warn!(error = %e, "Failed to clear checkout coupons");
        }
    }

    /// Adds a coupon to the bundle, replacing the entry for the same item,
    /// or for checkout-only codes the entry with the same code.
    pub async fn add_checkout_coupon(&self, coupon: CouponData) -> Vec<CouponData> {
        let mut coupons = self.checkout_coupons().await;
        coupons.retain(|existing| {
            existing.item != coupon.item
                || (coupon.item.is_none() && !existing.code().eq_ignore_ascii_case(coupon.code()))
        });
        coupons.push(coupon);
        self.set_checkout_coupons(&coupons).await;
        coupons
    }

    /// Drops the member identified by `item` and `code` from the bundle,
    /// together with its per-item entry. `item` is `None` for checkout-only
    /// codes.
    ///
    /// Returns the remaining coupons. The bundle is cleared once empty.
    pub async fn remove_checkout_coupon(
        &self,
        item: Option<ItemRef>,
        code: &str,
    ) -> Vec<CouponData> {
        let code = code.trim();
        let (removed, kept): (Vec<CouponData>, Vec<CouponData>) = self
            .checkout_coupons()
            .await
            .into_iter()
            .partition(|c| c.item == item && c.code().eq_ignore_ascii_case(code));

        for item in removed.iter().filter_map(|c| c.item) {
            if let Err(e) = self.cache.clear(&item).await {
                tracing::warn!(error = %e, "Failed to clear coupon entry");
            }
        }

        self.set_checkout_coupons(&kept).await;
        if !removed.is_empty() {
            tracing::info!(code, remaining = kept.len(), "Checkout coupon removed");
        }
        kept
    }

    /// Purges every per-item entry and the bundle. Called once a payment
    /// is confirmed.
    pub async fn clear_all(&self) {
        match self.cache.clear_all().await {
            Ok(removed) => tracing::info!(removed, "Cleared all coupons after payment"),
            Err(e) => tracing::warn!(error = %e, "Failed to clear coupons"),
        }
    }

    /// Price breakdown of `items` with every checkout coupon stacked.
    pub async fn checkout_breakdown(&self, items: &[PricedLineItem]) -> PriceBreakdown {
        let coupons = self.checkout_coupons().await;
        calculate_stacked(items, coupons.as_slice())
    }
}
