//! Coupon domain module.
//!
//! Value objects for discount codes and the server-priced results the
//! storefront caches per item.
//!
//! # Module Structure
//!
//! - `code` - Normalized coupon code
//! - `item` - Priced item identity (`course`, `event`, `product`)
//! - `coupon` - Coupon and pricing as returned by the pricing authority
//! - `applied` - Client-held applied coupon records
//! - `status` - Per-item controller status state machine

mod applied;
mod code;
mod coupon;
mod item;
mod status;

pub use applied::{AppliedCoupon, CouponData};
pub use code::CouponCode;
pub use coupon::{Coupon, DiscountType, FeeBreakdown, Pricing};
pub use item::{ItemRef, ItemType};
pub use status::CouponStatus;
