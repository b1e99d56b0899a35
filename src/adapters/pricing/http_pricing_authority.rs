//! HTTP pricing authority adapter.
//!
//! Implements the `PricingAuthority` port against the storefront REST API
//! using `reqwest`.
//!
//! # Configuration
//!
//! ```ignore
//! let authority = HttpPricingAuthority::new(&config.pricing_api)?;
//! ```

use async_trait::async_trait;
use reqwest::{RequestBuilder, Url};
use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;

use crate::config::PricingApiConfig;
use crate::domain::coupon::{CouponCode, ItemRef};
use crate::ports::{
    BasketLine, BasketValidationRequest, CouponPreview, PricingAuthority, PricingAuthorityError,
};

/// `reqwest`-backed pricing authority.
pub struct HttpPricingAuthority {
    base_url: Url,
    api_token: Option<SecretString>,
    http_client: reqwest::Client,
}

impl HttpPricingAuthority {
    /// Create an adapter from configuration.
    pub fn new(config: &PricingApiConfig) -> Result<Self, PricingAuthorityError> {
        let base_url = Url::parse(&config.base_url).map_err(|e| {
            PricingAuthorityError::InvalidResponse(format!("invalid base URL: {}", e))
        })?;

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| PricingAuthorityError::network(e.to_string()))?;

        Ok(Self {
            base_url,
            api_token: config.api_token.clone(),
            http_client,
        })
    }

    /// Base URL joined with path segments, each percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, PricingAuthorityError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                PricingAuthorityError::InvalidResponse("base URL cannot have a path".to_string())
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send(&self, request: RequestBuilder) -> Result<CouponPreview, PricingAuthorityError> {
        let request = match &self.api_token {
            Some(token) => request.bearer_auth(token.expose_secret()),
            None => request,
        };

        let response = request.send().await.map_err(|e| {
            tracing::error!(error = %e, "Pricing service request failed");
            PricingAuthorityError::network(e.to_string())
        })?;

        let status = response.status();
        if status.is_success() {
            return response.json::<CouponPreview>().await.map_err(|e| {
                tracing::error!(error = %e, "Pricing service sent an unreadable body");
                PricingAuthorityError::InvalidResponse(e.to_string())
            });
        }

        let body = response.text().await.unwrap_or_default();
        let message = error_message_from_body(&body);
        tracing::error!(
            status = status.as_u16(),
            message = message.as_deref().unwrap_or(""),
            "Pricing service returned an error status"
        );
        Err(PricingAuthorityError::server(status.as_u16(), message))
    }
}

/// `message`, falling back to `error`, from a JSON error body.
fn error_message_from_body(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    ["message", "error"]
        .iter()
        .find_map(|field| value.get(*field).and_then(|v| v.as_str()))
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
}

#[async_trait]
impl PricingAuthority for HttpPricingAuthority {
    async fn preview(
        &self,
        item: &ItemRef,
        code: &CouponCode,
    ) -> Result<CouponPreview, PricingAuthorityError> {
        let item_id = item.item_id.to_string();
        let url = self.endpoint(&[
            "coupons",
            "preview",
            item.item_type.as_str(),
            &item_id,
            code.as_str(),
        ])?;

        tracing::debug!(%url, "Previewing coupon");
        self.send(self.http_client.get(url)).await
    }

    async fn validate_basket(
        &self,
        code: &CouponCode,
        lines: &[BasketLine],
    ) -> Result<CouponPreview, PricingAuthorityError> {
        let url = self.endpoint(&["coupons", "validate"])?;
        let body = BasketValidationRequest {
            code: code.as_str(),
            items: lines,
        };

        tracing::debug!(%url, lines = lines.len(), "Validating coupon against basket");
        self.send(self.http_client.post(url).json(&body)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::coupon::ItemType;

    fn config(base_url: &str) -> PricingApiConfig {
        PricingApiConfig {
            base_url: base_url.to_string(),
            api_token: None,
            timeout_secs: 5,
        }
    }

    #[test]
    fn preview_endpoint_encodes_segments() {
        let authority = HttpPricingAuthority::new(&config("https://api.example.com/api/")).unwrap();
        let url = authority
            .endpoint(&["coupons", "preview", "course", "12", "A/B C"])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.example.com/api/coupons/preview/course/12/A%2FB%20C"
        );
    }

    #[test]
    fn endpoint_without_trailing_slash() {
        let authority = HttpPricingAuthority::new(&config("https://api.example.com/api")).unwrap();
        let url = authority.endpoint(&["coupons", "validate"]).unwrap();
        assert_eq!(url.as_str(), "https://api.example.com/api/coupons/validate");
    }

    #[test]
    fn rejects_unparseable_base_url() {
        assert!(HttpPricingAuthority::new(&config("not a url")).is_err());
    }

    #[test]
    fn error_message_prefers_message_then_error() {
        assert_eq!(
            error_message_from_body(r#"{"message":"Cupón vencido","error":"x"}"#),
            Some("Cupón vencido".to_string())
        );
        assert_eq!(
            error_message_from_body(r#"{"error":"Internal"}"#),
            Some("Internal".to_string())
        );
        assert_eq!(error_message_from_body(r#"{"message":"  "}"#), None);
        assert_eq!(error_message_from_body("<html>502</html>"), None);
    }

    #[tokio::test]
    async fn unreachable_service_is_a_network_error() {
        let authority = HttpPricingAuthority::new(&config("http://127.0.0.1:9")).unwrap();
        let code = CouponCode::try_new("SAVE10").unwrap();
        let result = authority
            .preview(&ItemRef::new(ItemType::Course, 1), &code)
            .await;
        assert!(matches!(result, Err(PricingAuthorityError::Network(_))));
    }
}
