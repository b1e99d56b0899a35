//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the coupon core and the outside world. Adapters implement these ports.
//!
//! - `SessionStore` - Tab-scoped key/value storage
//! - `Clock` - Source of the current time
//! - `PricingAuthority` - Remote coupon validation and pricing
//! - `PageLocation` - Current URL query and history replace

mod clock;
mod page_location;
mod pricing_authority;
mod session_store;

pub use clock::Clock;
pub use page_location::{PageLocation, COUPON_QUERY_PARAM};
pub use pricing_authority::{
    BasketLine, BasketValidationRequest, CouponPreview, PricingAuthority, PricingAuthorityError,
};
pub use session_store::{SessionStore, SessionStoreError};
