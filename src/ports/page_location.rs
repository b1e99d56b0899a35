//! Page location port - the address bar of the current page.
//!
//! Coupons can arrive as a `?coupon=CODE` query parameter. The parameter is
//! read-only input: it is stripped on removal and never written on apply.

/// Query parameter that carries a coupon code into a page.
pub const COUPON_QUERY_PARAM: &str = "coupon";

pub trait PageLocation: Send + Sync {
    /// Value of a query parameter on the current URL, if present.
    fn query_param(&self, name: &str) -> Option<String>;

    /// Drop a query parameter by replacing the current history entry.
    ///
    /// Must not push a new history entry or trigger a navigation.
    fn replace_without_param(&self, name: &str);
}
