//! Clock port.
//!
//! Expiration decisions read time through this trait so tests can drive it.

use crate::domain::foundation::Timestamp;

pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}
