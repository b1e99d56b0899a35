//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the coupon core to external systems:
//! - `storage` - Session store implementations (in-memory, file)
//! - `clock` - System and manual clocks
//! - `pricing` - Pricing authority clients (HTTP, mock)
//! - `location` - Address bar implementations

pub mod clock;
pub mod location;
pub mod pricing;
pub mod storage;

pub use clock::{ManualClock, SystemClock};
pub use location::InMemoryLocation;
pub use pricing::{HttpPricingAuthority, MockPricingAuthority, RecordedCall};
pub use storage::{FileSessionStore, InMemorySessionStore};
