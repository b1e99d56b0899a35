//! Pricing domain module.
//!
//! Pure price math over line items and server-priced coupons. Nothing in
//! here performs I/O or re-prices a discount.

mod breakdown;
mod format;

pub use breakdown::{
    calculate, calculate_stacked, BillingPeriod, DiscountSource, PriceBreakdown,
    PricedLineItem, RecurringDiscountNote,
};
pub use format::format_currency;
