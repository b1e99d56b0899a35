//! Pricing API configuration

use secrecy::SecretString;
use serde::Deserialize;

use super::error::ValidationError;

/// Remote pricing authority configuration
#[derive(Debug, Clone, Deserialize)]
pub struct PricingApiConfig {
    /// Base URL of the storefront API (e.g. `https://api.example.com/api`)
    pub base_url: String,

    /// Bearer token from the signed-in session, if any
    #[serde(default)]
    pub api_token: Option<SecretString>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    10
}

impl PricingApiConfig {
    /// Validate pricing API configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.base_url.is_empty() {
            return Err(ValidationError::MissingRequired("PRICING_API__BASE_URL"));
        }
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ValidationError::InvalidPricingApiUrl);
        }
        if self.timeout_secs == 0 || self.timeout_secs > 120 {
            return Err(ValidationError::InvalidTimeout);
        }
        Ok(())
    }
}
