//! Coupon and pricing as priced by the remote authority.
//!
//! The client never re-derives discount amounts. Everything here is what the
//! server sent back, plus display helpers.

use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::pricing::format_currency;

/// How the discount value is expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscountType {
    Percentage,
    Fixed,
}

/// A coupon as returned by the pricing authority.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coupon {
    pub id: u64,

    /// Canonical (uppercase) code.
    #[serde(deserialize_with = "uppercase")]
    pub code: String,

    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    pub discount_type: DiscountType,

    pub discount_value: f64,

    /// Discount re-applies every billing cycle instead of once.
    #[serde(default)]
    pub is_recurring: bool,
}

impl Coupon {
    /// `"15%"` for percentage coupons, formatted currency for fixed ones.
    pub fn discount_label(&self) -> String {
        match self.discount_type {
            DiscountType::Percentage => format!("{}%", self.discount_value),
            DiscountType::Fixed => format_currency(self.discount_value),
        }
    }
}

fn uppercase<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Ok(raw.trim().to_uppercase())
}

/// Original, discounted and discount amount for a single fee of a course.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FeeBreakdown {
    #[serde(default)]
    pub original: f64,
    #[serde(default)]
    pub discounted: f64,
    #[serde(default)]
    pub discount_amount: f64,
}

/// Server-computed pricing for one item under one coupon.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Pricing {
    #[serde(default)]
    pub original_price: f64,

    #[serde(default)]
    pub discount_amount: f64,

    #[serde(default)]
    pub final_price: f64,

    #[serde(default)]
    pub discount_percentage: f64,

    /// Course only: one-time enrollment fee.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enrollment_fee: Option<FeeBreakdown>,

    /// Course only: fee charged every billing period.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monthly_fee: Option<FeeBreakdown>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_original: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_final: Option<f64>,
}

impl Pricing {
    /// True when the course fee breakdown is present.
    pub fn has_fee_breakdown(&self) -> bool {
        self.enrollment_fee.is_some() || self.monthly_fee.is_some()
    }

    /// The discount to subtract from a cart total.
    ///
    /// Uses `discount_amount` when the server set it. Course responses that
    /// only carry the fee breakdown contribute the first-period discount
    /// (enrollment plus one monthly fee).
    pub fn effective_discount(&self) -> f64 {
        if self.discount_amount != 0.0 || !self.has_fee_breakdown() {
            return self.discount_amount;
        }
        let fee = |f: &Option<FeeBreakdown>| f.map(|f| f.discount_amount).unwrap_or(0.0);
        fee(&self.enrollment_fee) + fee(&self.monthly_fee)
    }

    /// Discount that repeats each billing period for recurring coupons.
    pub fn recurring_discount(&self) -> f64 {
        match self.monthly_fee {
            Some(monthly) => monthly.discount_amount,
            None => self.discount_amount,
        }
    }
}
