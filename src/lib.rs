//! Storefront Coupons - coupon validation, persistence and pricing.
//!
//! Lets a shopper carry a discount code from an item page to checkout: codes
//! are validated against a remote pricing authority, cached per item with a
//! time-to-live, gathered into a checkout bundle and turned into discounted
//! totals.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
