//! Coupon validation client.
//!
//! Normalizes the code, guards against items that have not loaded yet and
//! turns whatever the pricing authority answers into a `ValidationOutcome`.

use std::sync::Arc;

use crate::domain::coupon::{Coupon, CouponCode, ItemRef, Pricing};
use crate::domain::foundation::ValidationError;
use crate::ports::{BasketLine, CouponPreview, PricingAuthority, PricingAuthorityError};

/// Shown when the authority rejects a code without saying why.
pub const INVALID_COUPON_MESSAGE: &str = "Coupon is not valid";

/// Shown when the authority could not be reached or failed.
pub const VALIDATION_ERROR_MESSAGE: &str = "Error validating coupon";

/// Shown when the user submits an empty code.
pub const EMPTY_CODE_MESSAGE: &str = "Enter a coupon code";

/// Result of validating a code against an item or basket.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationOutcome {
    /// The authority accepted the code and priced it.
    Valid { coupon: Coupon, pricing: Pricing },
    /// The authority answered but rejected the code.
    Invalid { message: String },
    /// Transport or server failure.
    Error { message: String },
    /// The item id is not resolved yet. No request was made.
    NotReady,
}

impl ValidationOutcome {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationOutcome::Valid { .. })
    }

    /// User-facing message for failures.
    pub fn message(&self) -> Option<&str> {
        match self {
            ValidationOutcome::Invalid { message } | ValidationOutcome::Error { message } => {
                Some(message)
            }
            _ => None,
        }
    }
}

pub struct CouponValidationClient {
    authority: Arc<dyn PricingAuthority>,
}

impl CouponValidationClient {
    pub fn new(authority: Arc<dyn PricingAuthority>) -> Self {
        Self { authority }
    }

    /// Validates `code` for a single item.
    pub async fn validate(&self, item: &ItemRef, code: &str) -> ValidationOutcome {
        if !item.is_ready() {
            tracing::debug!(item_type = %item.item_type, "Item not loaded yet, skipping validation");
            return ValidationOutcome::NotReady;
        }

        let code = match CouponCode::try_new(code) {
            Ok(code) => code,
            Err(e) => return rejected_locally(e),
        };

        tracing::debug!(
            item_type = %item.item_type,
            item_id = item.item_id,
            code = %code,
            "Validating coupon"
        );
        interpret(self.authority.preview(item, &code).await)
    }

    /// Validates `code` against a basket of lines.
    ///
    /// An empty basket, or one with an unresolved line, is `NotReady`.
    pub async fn validate_basket(&self, code: &str, lines: &[BasketLine]) -> ValidationOutcome {
        if lines.is_empty() || lines.iter().any(|line| line.id == 0) {
            return ValidationOutcome::NotReady;
        }

        let code = match CouponCode::try_new(code) {
            Ok(code) => code,
            Err(e) => return rejected_locally(e),
        };

        tracing::debug!(code = %code, lines = lines.len(), "Validating coupon for basket");
        interpret(self.authority.validate_basket(&code, lines).await)
    }
}

fn rejected_locally(error: ValidationError) -> ValidationOutcome {
    let message = match error {
        ValidationError::EmptyField { .. } => EMPTY_CODE_MESSAGE,
        _ => INVALID_COUPON_MESSAGE,
    };
    ValidationOutcome::Invalid {
        message: message.to_string(),
    }
}

fn interpret(response: Result<CouponPreview, PricingAuthorityError>) -> ValidationOutcome {
    match response {
        Ok(CouponPreview {
            valid: true,
            coupon: Some(coupon),
            pricing: Some(pricing),
            ..
        }) => ValidationOutcome::Valid { coupon, pricing },
        Ok(CouponPreview { valid: true, .. }) => {
            tracing::error!("Pricing service accepted a coupon but sent no coupon or pricing");
            ValidationOutcome::Error {
                message: VALIDATION_ERROR_MESSAGE.to_string(),
            }
        }
        Ok(CouponPreview { message, .. }) => ValidationOutcome::Invalid {
            message: non_blank(message).unwrap_or_else(|| INVALID_COUPON_MESSAGE.to_string()),
        },
        Err(e) => {
            // The adapter has already logged the failure.
            tracing::debug!(error = %e, "Coupon validation failed");
            ValidationOutcome::Error {
                message: non_blank(e.remote_message().map(str::to_string))
                    .unwrap_or_else(|| VALIDATION_ERROR_MESSAGE.to_string()),
            }
        }
    }
}

fn non_blank(message: Option<String>) -> Option<String> {
    message.filter(|m| !m.trim().is_empty())
}
