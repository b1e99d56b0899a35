//! Mock pricing authority for testing.
//!
//! Provides a configurable mock implementation of `PricingAuthority` for unit
//! and integration tests. Supports:
//! - Per-code accept/reject responses
//! - Error injection
//! - Per-code response delays
//! - Call tracking

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::coupon::{Coupon, CouponCode, ItemRef, Pricing};
use crate::ports::{BasketLine, CouponPreview, PricingAuthority, PricingAuthorityError};

/// Mock pricing authority.
///
/// Unknown codes are rejected with no message.
///
/// # Example
///
/// ```ignore
/// let mock = MockPricingAuthority::new();
/// mock.accept("SAVE10", coupon, pricing);
/// mock.reject("OLD", "Coupon expired");
/// mock.fail("BROKEN", PricingAuthorityError::network("timeout"));
/// ```
#[derive(Default, Clone)]
pub struct MockPricingAuthority {
    inner: Arc<Mutex<MockState>>,
}

#[derive(Default)]
struct MockState {
    replies: HashMap<String, Result<CouponPreview, PricingAuthorityError>>,
    delays: HashMap<String, Duration>,
    calls: Vec<RecordedCall>,
}

/// A request the mock received.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedCall {
    Preview { item: ItemRef, code: String },
    Basket { code: String, lines: Vec<BasketLine> },
}

impl RecordedCall {
    pub fn code(&self) -> &str {
        match self {
            RecordedCall::Preview { code, .. } | RecordedCall::Basket { code, .. } => code,
        }
    }
}

impl MockPricingAuthority {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept `code` with the given coupon and pricing.
    pub fn accept(&self, code: &str, coupon: Coupon, pricing: Pricing) {
        self.set_reply(code, Ok(CouponPreview::accepted(coupon, pricing)));
    }

    /// Reject `code` with a remote message.
    pub fn reject(&self, code: &str, message: &str) {
        self.set_reply(code, Ok(CouponPreview::rejected(Some(message.to_string()))));
    }

    /// Answer `code` with a raw preview body.
    pub fn respond(&self, code: &str, preview: CouponPreview) {
        self.set_reply(code, Ok(preview));
    }

    /// Fail requests for `code` with a transport/server error.
    pub fn fail(&self, code: &str, error: PricingAuthorityError) {
        self.set_reply(code, Err(error));
    }

    /// Hold responses for `code` for `delay` before answering.
    pub fn delay(&self, code: &str, delay: Duration) {
        self.with_state(|s| {
            s.delays.insert(code.to_uppercase(), delay);
        });
    }

    /// All calls received so far.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.with_state(|s| s.calls.clone())
    }

    pub fn call_count(&self) -> usize {
        self.with_state(|s| s.calls.len())
    }

    fn set_reply(&self, code: &str, reply: Result<CouponPreview, PricingAuthorityError>) {
        self.with_state(|s| {
            s.replies.insert(code.to_uppercase(), reply);
        });
    }

    fn with_state<R>(&self, f: impl FnOnce(&mut MockState) -> R) -> R {
        match self.inner.lock() {
            Ok(mut state) => f(&mut state),
            Err(poisoned) => f(&mut poisoned.into_inner()),
        }
    }

    async fn answer(&self, call: RecordedCall) -> Result<CouponPreview, PricingAuthorityError> {
        let code = call.code().to_string();
        let (reply, delay) = self.with_state(|s| {
            s.calls.push(call);
            (
                s.replies
                    .get(&code)
                    .cloned()
                    .unwrap_or_else(|| Ok(CouponPreview::rejected(None))),
                s.delays.get(&code).copied(),
            )
        });

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        reply
    }
}

#[async_trait]
impl PricingAuthority for MockPricingAuthority {
    async fn preview(
        &self,
        item: &ItemRef,
        code: &CouponCode,
    ) -> Result<CouponPreview, PricingAuthorityError> {
        self.answer(RecordedCall::Preview {
            item: *item,
            code: code.as_str().to_string(),
        })
        .await
    }

    async fn validate_basket(
        &self,
        code: &CouponCode,
        lines: &[BasketLine],
    ) -> Result<CouponPreview, PricingAuthorityError> {
        self.answer(RecordedCall::Basket {
            code: code.as_str().to_string(),
            lines: lines.to_vec(),
        })
        .await
    }
}
