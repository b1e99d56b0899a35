//! Coupon code value object.
//!
//! Codes are case-insensitive. The canonical form is trimmed and uppercased,
//! and that form is what gets transmitted to the pricing authority.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::ValidationError;

/// Longest code the storefront will send upstream.
const MAX_CODE_LEN: usize = 64;

/// A normalized coupon code.
///
/// # Example
///
/// ```ignore
/// let code = CouponCode::try_new("  save10 ")?;
/// assert_eq!(code.as_str(), "SAVE10");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CouponCode(String);

impl CouponCode {
    /// Creates a new CouponCode, trimming and uppercasing the input.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if:
    /// - Code is empty after trimming
    /// - Code is longer than 64 characters
    /// - Code contains inner whitespace
    pub fn try_new(code: &str) -> Result<Self, ValidationError> {
        let normalized = code.trim().to_uppercase();

        if normalized.is_empty() {
            return Err(ValidationError::empty_field("coupon_code"));
        }

        let len = normalized.chars().count();
        if len > MAX_CODE_LEN {
            return Err(ValidationError::too_long("coupon_code", MAX_CODE_LEN, len));
        }

        if normalized.chars().any(char::is_whitespace) {
            return Err(ValidationError::invalid_format(
                "coupon_code",
                "whitespace is not allowed inside a code",
            ));
        }

        Ok(Self(normalized))
    }

    /// Returns the canonical code string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Case-insensitive comparison against raw user input.
    pub fn matches(&self, raw: &str) -> bool {
        raw.trim().to_uppercase() == self.0
    }
}

impl std::fmt::Display for CouponCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<&str> for CouponCode {
    type Error = ValidationError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::try_new(value)
    }
}

impl TryFrom<String> for CouponCode {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::try_new(&value)
    }
}

impl From<CouponCode> for String {
    fn from(code: CouponCode) -> Self {
        code.0
    }
}
