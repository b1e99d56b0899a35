//! Application handlers.
//!
//! Command handlers that orchestrate coupon operations.

pub mod apply_checkout_code;

pub use apply_checkout_code::{
    ApplyCheckoutCodeCommand, ApplyCheckoutCodeHandler, CheckoutCodeError,
};
