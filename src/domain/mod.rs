//! Domain layer containing coupon and pricing logic.
//!
//! # Module Organization
//!
//! - `foundation` - Shared primitives (timestamps, validation errors)
//! - `coupon` - Coupon codes, priced items, applied coupon records, status machine
//! - `pricing` - Pure price breakdown calculator

pub mod coupon;
pub mod foundation;
pub mod pricing;
