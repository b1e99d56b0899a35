//! Per-item coupon status state machine.
//!
//! ```text
//! none ──► loading ──► valid | invalid | error
//!  ▲          │                 │
//!  └──────────┴──── remove ─────┘
//! ```
//!
//! `none → valid` is also allowed when a cached coupon is adopted without a
//! network round trip.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CouponStatus {
    #[default]
    None,
    Loading,
    Valid,
    Invalid,
    Error,
}

impl CouponStatus {
    /// Returns true if transition from self to target is valid.
    pub fn can_transition_to(&self, target: &Self) -> bool {
        use CouponStatus::*;
        matches!(
            (self, target),
            (_, None)
                | (_, Loading)
                | (None, Valid)
                | (Valid, Valid)
                | (Loading, Valid)
                | (Loading, Invalid)
                | (Loading, Error)
        )
    }

    /// Performs transition with validation, returning error if invalid.
    pub fn transition_to(&self, target: Self) -> Result<Self, ValidationError> {
        if self.can_transition_to(&target) {
            Ok(target)
        } else {
            Err(ValidationError::invalid_transition(self, target))
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CouponStatus::None => "none",
            CouponStatus::Loading => "loading",
            CouponStatus::Valid => "valid",
            CouponStatus::Invalid => "invalid",
            CouponStatus::Error => "error",
        }
    }
}

impl std::fmt::Display for CouponStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
