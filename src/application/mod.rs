//! Application layer - coupon orchestration.
//!
//! Coordinates the domain types with the ports: the expiring cache over the
//! session store, the validation client over the pricing authority, the
//! per-item controller and the checkout aggregator.

pub mod checkout_coupons;
pub mod coupon_controller;
pub mod expiring_cache;
pub mod handlers;
pub mod validation_client;

pub use checkout_coupons::CheckoutCoupons;
pub use coupon_controller::{CouponController, CouponControllerOptions, CouponSnapshot};
pub use expiring_cache::{CacheError, CachedEntry, ExpiringCache};
pub use handlers::{ApplyCheckoutCodeCommand, ApplyCheckoutCodeHandler, CheckoutCodeError};
pub use validation_client::{
    CouponValidationClient, ValidationOutcome, EMPTY_CODE_MESSAGE, INVALID_COUPON_MESSAGE,
    VALIDATION_ERROR_MESSAGE,
};
