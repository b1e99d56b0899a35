//! Pricing authority port.
//!
//! The remote service that decides whether a coupon code is usable for an
//! item and prices the result.
//!
//! # Endpoints
//!
//! - `GET /coupons/preview/{item_type}/{item_id}/{code}` for a single item
//! - `POST /coupons/validate` with `{code, items: [{type, id, quantity}]}` for a basket
//!
//! Both answer `{valid, coupon?, pricing?, message?}`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::coupon::{Coupon, CouponCode, ItemRef, ItemType, Pricing};

/// Port for the remote coupon pricing service.
#[async_trait]
pub trait PricingAuthority: Send + Sync {
    /// Checks a code against a single item.
    ///
    /// # Returns
    ///
    /// - `Ok(preview)` - The service answered; `preview.valid` says whether the code applies
    /// - `Err(PricingAuthorityError)` - Transport failure or non-success status
    async fn preview(
        &self,
        item: &ItemRef,
        code: &CouponCode,
    ) -> Result<CouponPreview, PricingAuthorityError>;

    /// Checks a code against a whole basket.
    async fn validate_basket(
        &self,
        code: &CouponCode,
        lines: &[BasketLine],
    ) -> Result<CouponPreview, PricingAuthorityError>;
}

/// Response body of both endpoints.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CouponPreview {
    #[serde(default)]
    pub valid: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coupon: Option<Coupon>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pricing: Option<Pricing>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl CouponPreview {
    pub fn accepted(coupon: Coupon, pricing: Pricing) -> Self {
        Self {
            valid: true,
            coupon: Some(coupon),
            pricing: Some(pricing),
            message: None,
        }
    }

    pub fn rejected(message: Option<String>) -> Self {
        Self {
            valid: false,
            coupon: None,
            pricing: None,
            message,
        }
    }
}

/// One row of a basket validation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasketLine {
    #[serde(rename = "type")]
    pub item_type: ItemType,
    pub id: u64,
    pub quantity: u32,
}

impl BasketLine {
    pub fn new(item: ItemRef, quantity: u32) -> Self {
        Self {
            item_type: item.item_type,
            id: item.item_id,
            quantity,
        }
    }
}

/// Request body of `POST /coupons/validate`.
#[derive(Debug, Clone, Serialize)]
pub struct BasketValidationRequest<'a> {
    pub code: &'a str,
    pub items: &'a [BasketLine],
}

/// Errors talking to the pricing authority.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PricingAuthorityError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Pricing service returned status {status}")]
    Server {
        status: u16,
        /// `message` (or `error`) from the response body, when present.
        message: Option<String>,
    },

    #[error("Invalid response from pricing service: {0}")]
    InvalidResponse(String),
}

impl PricingAuthorityError {
    pub fn network(message: impl Into<String>) -> Self {
        PricingAuthorityError::Network(message.into())
    }

    pub fn server(status: u16, message: Option<String>) -> Self {
        PricingAuthorityError::Server { status, message }
    }

    /// Message supplied by the remote body, if any.
    pub fn remote_message(&self) -> Option<&str> {
        match self {
            PricingAuthorityError::Server { message, .. } => message.as_deref(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preview_deserializes_rejection_without_coupon() {
        let json = r#"{"valid": false, "message": "Coupon expired"}"#;
        let preview: CouponPreview = serde_json::from_str(json).unwrap();
        assert!(!preview.valid);
        assert!(preview.coupon.is_none());
        assert_eq!(preview.message.as_deref(), Some("Coupon expired"));
    }

    #[test]
    fn basket_request_uses_type_field() {
        let lines = [BasketLine::new(ItemRef::new(ItemType::Event, 12), 2)];
        let request = BasketValidationRequest {
            code: "FAMILY",
            items: &lines,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["code"], "FAMILY");
        assert_eq!(json["items"][0]["type"], "event");
        assert_eq!(json["items"][0]["id"], 12);
        assert_eq!(json["items"][0]["quantity"], 2);
    }

    #[test]
    fn remote_message_only_for_server_errors() {
        let err = PricingAuthorityError::server(500, Some("boom".to_string()));
        assert_eq!(err.remote_message(), Some("boom"));
        assert_eq!(PricingAuthorityError::network("timeout").remote_message(), None);
    }

    #[test]
    fn pricing_authority_is_object_safe() {
        fn _accepts_dyn(_authority: &dyn PricingAuthority) {}
    }
}
