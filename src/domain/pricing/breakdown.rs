//! Price breakdown calculator.
//!
//! `subtotal = Σ price × quantity`, `discount = Σ coupon discount`,
//! `total = subtotal - discount`. Each coupon's discount was already priced
//! server-side against its own item, so stacked coupons are summed and never
//! combined or re-priced against the cart.

use serde::{Deserialize, Serialize};

use super::format_currency;
use crate::domain::coupon::{AppliedCoupon, Coupon, CouponData, ItemRef, Pricing};

/// One priced row of a cart or enrollment summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricedLineItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item: Option<ItemRef>,
    pub name: String,
    pub price: f64,
    pub quantity: u32,
}

impl PricedLineItem {
    pub fn new(name: impl Into<String>, price: f64, quantity: u32) -> Self {
        Self {
            item: None,
            name: name.into(),
            price,
            quantity,
        }
    }

    pub fn for_item(mut self, item: ItemRef) -> Self {
        self.item = Some(item);
        self
    }

    pub fn line_total(&self) -> f64 {
        self.price * f64::from(self.quantity)
    }
}

/// Anything carrying a server-priced coupon.
pub trait DiscountSource {
    fn coupon(&self) -> &Coupon;
    fn pricing(&self) -> &Pricing;
    fn is_valid(&self) -> bool;
}

impl DiscountSource for AppliedCoupon {
    fn coupon(&self) -> &Coupon {
        &self.coupon
    }

    fn pricing(&self) -> &Pricing {
        &self.pricing
    }

    fn is_valid(&self) -> bool {
        self.valid
    }
}

impl DiscountSource for CouponData {
    fn coupon(&self) -> &Coupon {
        &self.coupon
    }

    fn pricing(&self) -> &Pricing {
        &self.pricing
    }

    fn is_valid(&self) -> bool {
        self.valid
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BillingPeriod {
    Monthly,
}

/// Informational note that a discount repeats every billing period.
///
/// Never applied as a multiplier on the total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecurringDiscountNote {
    pub code: String,
    pub amount_per_period: f64,
    pub period: BillingPeriod,
}

impl RecurringDiscountNote {
    pub fn message(&self) -> String {
        match self.period {
            BillingPeriod::Monthly => format!(
                "Coupon {} takes {} off every monthly payment of the course, not just the first.",
                self.code,
                format_currency(self.amount_per_period)
            ),
        }
    }
}

/// Subtotal, discount and total ready for display.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PriceBreakdown {
    pub subtotal: f64,
    pub discount: f64,
    pub total: f64,
    pub applied_codes: Vec<String>,
    pub recurring: Vec<RecurringDiscountNote>,
}

impl PriceBreakdown {
    pub fn has_discount(&self) -> bool {
        self.discount > 0.0
    }

    pub fn has_recurring_discount(&self) -> bool {
        !self.recurring.is_empty()
    }
}

/// Breakdown for zero or one applied coupon.
pub fn calculate(items: &[PricedLineItem], coupon: Option<&AppliedCoupon>) -> PriceBreakdown {
    match coupon {
        Some(applied) => calculate_stacked(items, std::slice::from_ref(applied)),
        None => calculate_stacked::<AppliedCoupon>(items, &[]),
    }
}

/// Breakdown for any number of stacked coupons, one per distinct item.
///
/// Entries not marked valid contribute nothing.
pub fn calculate_stacked<C: DiscountSource>(items: &[PricedLineItem], coupons: &[C]) -> PriceBreakdown {
    let subtotal: f64 = items.iter().map(PricedLineItem::line_total).sum();

    let mut discount = 0.0;
    let mut applied_codes = Vec::new();
    let mut recurring = Vec::new();

    for source in coupons.iter().filter(|c| c.is_valid()) {
        let coupon = source.coupon();
        let pricing = source.pricing();

        discount += displayable(pricing.effective_discount());
        applied_codes.push(coupon.code.clone());

        if coupon.is_recurring {
            recurring.push(RecurringDiscountNote {
                code: coupon.code.clone(),
                amount_per_period: displayable(pricing.recurring_discount()),
                period: BillingPeriod::Monthly,
            });
        }
    }

    let subtotal = displayable(subtotal);

    PriceBreakdown {
        subtotal,
        discount,
        total: displayable(subtotal - discount),
        applied_codes,
        recurring,
    }
}

/// Malformed upstream data never reaches the UI as `NaN` or a negative amount.
fn displayable(amount: f64) -> f64 {
    if amount.is_finite() && amount > 0.0 {
        amount
    } else {
        0.0
    }
}
