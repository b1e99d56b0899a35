//! ApplyCheckoutCodeHandler - Command handler for codes entered at checkout.
//!
//! Validates the code against the whole basket and appends the result to the
//! checkout bundle. No per-item entry is written.

use std::sync::Arc;

use thiserror::Error;

use crate::application::checkout_coupons::CheckoutCoupons;
use crate::application::validation_client::{CouponValidationClient, ValidationOutcome};
use crate::domain::coupon::{AppliedCoupon, CouponData};
use crate::ports::BasketLine;

/// Command to apply a checkout-only code.
#[derive(Debug, Clone)]
pub struct ApplyCheckoutCodeCommand {
    pub code: String,
    pub lines: Vec<BasketLine>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckoutCodeError {
    #[error("{0}")]
    Rejected(String),

    #[error("{0}")]
    Failed(String),

    #[error("Cart is still loading")]
    CartNotReady,
}

/// Handler for checkout-only codes.
pub struct ApplyCheckoutCodeHandler {
    client: Arc<CouponValidationClient>,
    checkout: Arc<CheckoutCoupons>,
}

impl ApplyCheckoutCodeHandler {
    pub fn new(client: Arc<CouponValidationClient>, checkout: Arc<CheckoutCoupons>) -> Self {
        Self { client, checkout }
    }

    pub async fn handle(&self, cmd: ApplyCheckoutCodeCommand) -> Result<CouponData, CheckoutCodeError> {
        // 1. Validate against the basket
        let (coupon, pricing) = match self.client.validate_basket(&cmd.code, &cmd.lines).await {
            ValidationOutcome::Valid { coupon, pricing } => (coupon, pricing),
            ValidationOutcome::Invalid { message } => return Err(CheckoutCodeError::Rejected(message)),
            ValidationOutcome::Error { message } => return Err(CheckoutCodeError::Failed(message)),
            ValidationOutcome::NotReady => return Err(CheckoutCodeError::CartNotReady),
        };

        // 2. Add to the bundle
        let data = CouponData::from_applied(
            None,
            AppliedCoupon::new(coupon, pricing, self.checkout.now()),
        );
        let bundle = self.checkout.add_checkout_coupon(data.clone()).await;

        tracing::info!(code = %data.coupon.code, bundle = bundle.len(), "Checkout code applied");
        Ok(data)
    }
}
