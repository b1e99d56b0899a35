//! Pricing authority adapters.
//!
//! - **HttpPricingAuthority** - Storefront REST API over `reqwest`
//! - **MockPricingAuthority** - Configurable in-process double for tests

mod http_pricing_authority;
mod mock_pricing_authority;

pub use http_pricing_authority::HttpPricingAuthority;
pub use mock_pricing_authority::{MockPricingAuthority, RecordedCall};
