//! Per-item coupon controller.
//!
//! Owns the coupon state of one priced item on one page. Every transition is
//! driven by an explicit call: `initialize` on mount, `set_item_id` when the
//! item finishes loading, `apply` and `remove` from user input.
//!
//! Each `apply` and `remove` bumps a request generation. A validation response
//! that comes back after its generation was superseded is dropped, so state
//! always reflects the most recent user action.

use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::coupon::{AppliedCoupon, CouponStatus, ItemRef};
use crate::ports::{PageLocation, COUPON_QUERY_PARAM};

use super::expiring_cache::ExpiringCache;
use super::validation_client::{CouponValidationClient, ValidationOutcome, EMPTY_CODE_MESSAGE};

/// Caller flags for a controller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CouponControllerOptions {
    /// Validate a `?coupon=` code found on mount without user action.
    pub auto_apply: bool,
}

impl CouponControllerOptions {
    pub fn auto_apply() -> Self {
        Self { auto_apply: true }
    }
}

/// Read-only view of the controller for rendering.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CouponSnapshot {
    pub status: CouponStatus,
    pub error: Option<String>,
    pub applied: Option<AppliedCoupon>,
}

impl CouponSnapshot {
    pub fn is_loading(&self) -> bool {
        self.status == CouponStatus::Loading
    }

    /// `"15%"` or a formatted currency amount.
    pub fn discount_label(&self) -> Option<String> {
        self.applied.as_ref().map(|a| a.coupon.discount_label())
    }

    /// Server-computed discount for the applied coupon.
    pub fn discount_amount(&self) -> f64 {
        self.applied
            .as_ref()
            .map(|a| a.pricing.effective_discount())
            .unwrap_or(0.0)
    }
}

#[derive(Debug)]
struct ControllerState {
    item: ItemRef,
    status: CouponStatus,
    error: Option<String>,
    applied: Option<AppliedCoupon>,
    url_code: Option<String>,
    /// Code captured while the item id was unresolved. Retried once on
    /// every change to a resolved id until it is applied.
    pending_code: Option<String>,
    generation: u64,
}

impl ControllerState {
    fn new(item: ItemRef) -> Self {
        Self {
            item,
            status: CouponStatus::None,
            error: None,
            applied: None,
            url_code: None,
            pending_code: None,
            generation: 0,
        }
    }

    /// Applies a status transition, refusing ones the state machine forbids.
    fn move_to(&mut self, target: CouponStatus) -> bool {
        match self.status.transition_to(target) {
            Ok(next) => {
                self.status = next;
                true
            }
            Err(e) => {
                tracing::warn!(
                    item_type = %self.item.item_type,
                    item_id = self.item.item_id,
                    error = %e,
                    "Ignoring coupon status transition"
                );
                false
            }
        }
    }

    fn snapshot(&self) -> CouponSnapshot {
        CouponSnapshot {
            status: self.status,
            error: self.error.clone(),
            applied: self.applied.clone(),
        }
    }
}

pub struct CouponController {
    client: Arc<CouponValidationClient>,
    cache: Arc<ExpiringCache>,
    location: Arc<dyn PageLocation>,
    options: CouponControllerOptions,
    state: RwLock<ControllerState>,
}

impl CouponController {
    pub fn new(
        item: ItemRef,
        client: Arc<CouponValidationClient>,
        cache: Arc<ExpiringCache>,
        location: Arc<dyn PageLocation>,
        options: CouponControllerOptions,
    ) -> Self {
        Self {
            client,
            cache,
            location,
            options,
            state: RwLock::new(ControllerState::new(item)),
        }
    }

    /// Mount: picks up a `?coupon=` code, otherwise adopts a cached coupon.
    pub async fn initialize(&self) {
        if let Err(e) = self.cache.sweep().await {
            tracing::warn!(error = %e, "Coupon cache sweep failed");
        }

        let Some(code) = self.location.query_param(COUPON_QUERY_PARAM) else {
            self.adopt_cached().await;
            return;
        };

        let ready = {
            let mut state = self.state.write().await;
            state.url_code = Some(code.clone());
            state.item.is_ready()
        };

        if !self.options.auto_apply {
            return;
        }

        if ready {
            self.apply(&code).await;
        } else {
            tracing::debug!("Item not loaded yet, deferring coupon from URL");
            self.state.write().await.pending_code = Some(code);
        }
    }

    /// Validates `code` for this item. Returns true when it was applied.
    ///
    /// While the item id is unresolved the code is kept and retried once the
    /// id arrives; nothing is reported to the user.
    pub async fn apply(&self, code: &str) -> bool {
        if code.trim().is_empty() {
            self.state.write().await.error = Some(EMPTY_CODE_MESSAGE.to_string());
            return false;
        }

        let (item, generation) = {
            let mut state = self.state.write().await;
            if !state.item.is_ready() {
                state.pending_code = Some(code.trim().to_string());
                return false;
            }
            // A different code from the user supersedes the deferred one.
            if state
                .pending_code
                .as_deref()
                .is_some_and(|pending| !pending.eq_ignore_ascii_case(code.trim()))
            {
                state.pending_code = None;
            }
            state.generation += 1;
            state.move_to(CouponStatus::Loading);
            state.error = None;
            (state.item, state.generation)
        };

        let outcome = self.client.validate(&item, code).await;

        let mut state = self.state.write().await;
        if state.generation != generation {
            tracing::debug!(
                item_type = %item.item_type,
                item_id = item.item_id,
                "Discarding superseded coupon response"
            );
            return false;
        }

        match outcome {
            ValidationOutcome::Valid { coupon, pricing } => {
                let applied = AppliedCoupon::new(coupon, pricing, self.cache.now());
                if let Err(e) = self.cache.set(&item, &applied).await {
                    tracing::warn!(error = %e, "Failed to persist applied coupon");
                }
                tracing::info!(
                    item_type = %item.item_type,
                    item_id = item.item_id,
                    code = %applied.coupon.code,
                    recurring = applied.is_recurring(),
                    "Coupon applied"
                );
                state.move_to(CouponStatus::Valid);
                state.applied = Some(applied);
                state.pending_code = None;
                true
            }
            ValidationOutcome::Invalid { message } => {
                tracing::warn!(
                    item_type = %item.item_type,
                    item_id = item.item_id,
                    reason = %message,
                    "Coupon rejected"
                );
                state.move_to(CouponStatus::Invalid);
                self.discard(&mut state, message).await;
                false
            }
            ValidationOutcome::Error { message } => {
                state.move_to(CouponStatus::Error);
                self.discard(&mut state, message).await;
                false
            }
            ValidationOutcome::NotReady => {
                state.move_to(CouponStatus::None);
                state.pending_code = Some(code.trim().to_string());
                false
            }
        }
    }

    /// Drops the applied coupon and strips `?coupon=` from the address bar.
    pub async fn remove(&self) {
        let item = {
            let mut state = self.state.write().await;
            state.generation += 1;
            state.move_to(CouponStatus::None);
            state.error = None;
            state.applied = None;
            state.pending_code = None;
            state.item
        };

        if let Err(e) = self.cache.clear(&item).await {
            tracing::warn!(error = %e, "Failed to clear coupon entry");
        }
        self.location.replace_without_param(COUPON_QUERY_PARAM);

        tracing::info!(
            item_type = %item.item_type,
            item_id = item.item_id,
            "Coupon removed"
        );
    }

    /// The priced item resolved (or changed) its id.
    pub async fn set_item_id(&self, item_id: u64) {
        let retry = {
            let mut state = self.state.write().await;
            if state.item.item_id == item_id {
                return;
            }
            state.item = state.item.with_id(item_id);
            state.generation += 1;
            state.move_to(CouponStatus::None);
            state.error = None;
            state.applied = None;

            if !state.item.is_ready() {
                return;
            }

            state.pending_code.clone()
        };

        match retry {
            Some(code) => {
                tracing::debug!(item_id, "Item ready, retrying deferred coupon");
                self.apply(&code).await;
            }
            None => {
                self.adopt_cached().await;
            }
        }
    }

    pub async fn snapshot(&self) -> CouponSnapshot {
        self.state.read().await.snapshot()
    }

    pub async fn status(&self) -> CouponStatus {
        self.state.read().await.status
    }

    pub async fn error_message(&self) -> Option<String> {
        self.state.read().await.error.clone()
    }

    pub async fn applied_coupon(&self) -> Option<AppliedCoupon> {
        self.state.read().await.applied.clone()
    }

    pub async fn is_loading(&self) -> bool {
        self.state.read().await.status == CouponStatus::Loading
    }

    pub async fn item(&self) -> ItemRef {
        self.state.read().await.item
    }

    /// Code read from the URL on mount, for prefilling an input.
    pub async fn url_code(&self) -> Option<String> {
        self.state.read().await.url_code.clone()
    }

    async fn discard(&self, state: &mut ControllerState, message: String) {
        state.error = Some(message);
        state.applied = None;
        if let Err(e) = self.cache.clear(&state.item).await {
            tracing::warn!(error = %e, "Failed to clear coupon entry");
        }
    }

    /// Adopts a live cached coupon without a network round trip.
    async fn adopt_cached(&self) -> bool {
        let (item, generation) = {
            let state = self.state.read().await;
            (state.item, state.generation)
        };
        if !item.is_ready() {
            return false;
        }

        let cached = match self.cache.get::<AppliedCoupon>(&item).await {
            Ok(cached) => cached,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read cached coupon");
                return false;
            }
        };
        let Some(applied) = cached else {
            return false;
        };

        if !applied.valid {
            tracing::warn!(
                item_type = %item.item_type,
                item_id = item.item_id,
                "Dropping cached coupon stored as invalid"
            );
            if let Err(e) = self.cache.clear(&item).await {
                tracing::warn!(error = %e, "Failed to clear coupon entry");
            }
            return false;
        }

        let mut state = self.state.write().await;
        if state.generation != generation || state.status != CouponStatus::None {
            return false;
        }
        if !state.move_to(CouponStatus::Valid) {
            return false;
        }
        tracing::debug!(
            item_type = %item.item_type,
            item_id = item.item_id,
            code = %applied.coupon.code,
            "Adopted cached coupon"
        );
        state.applied = Some(applied);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{
        InMemoryLocation, InMemorySessionStore, ManualClock, MockPricingAuthority,
    };
    use crate::config::CacheConfig;
    use crate::domain::coupon::{Coupon, DiscountType, ItemType, Pricing};
    use crate::ports::PricingAuthorityError;
    use std::time::Duration;

    struct Fixture {
        mock: MockPricingAuthority,
        store: InMemorySessionStore,
        clock: ManualClock,
        cache: Arc<ExpiringCache>,
        client: Arc<CouponValidationClient>,
    }

    impl Fixture {
        fn new() -> Self {
            let mock = MockPricingAuthority::new();
            let store = InMemorySessionStore::new();
            let clock = ManualClock::at_unix_millis(1_700_000_000_000);
            let cache = Arc::new(ExpiringCache::new(
                Arc::new(store.clone()),
                Arc::new(clock.clone()),
                &CacheConfig::default(),
            ));
            let client = Arc::new(CouponValidationClient::new(Arc::new(mock.clone())));
            Self {
                mock,
                store,
                clock,
                cache,
                client,
            }
        }

        fn controller(
            &self,
            item: ItemRef,
            url: &str,
            options: CouponControllerOptions,
        ) -> (CouponController, Arc<InMemoryLocation>) {
            let location = Arc::new(InMemoryLocation::parse(url).unwrap());
            let controller = CouponController::new(
                item,
                self.client.clone(),
                self.cache.clone(),
                location.clone(),
                options,
            );
            (controller, location)
        }
    }

    fn coupon(code: &str, discount_type: DiscountType, value: f64) -> Coupon {
        Coupon {
            id: 1,
            code: code.to_string(),
            name: code.to_string(),
            description: None,
            discount_type,
            discount_value: value,
            is_recurring: false,
        }
    }

    fn pricing(discount: f64) -> Pricing {
        Pricing {
            original_price: 150000.0,
            discount_amount: discount,
            final_price: 150000.0 - discount,
            discount_percentage: discount / 1500.0,
            ..Default::default()
        }
    }

    fn course(id: u64) -> ItemRef {
        ItemRef::new(ItemType::Course, id)
    }

    const PAGE: &str = "https://shop.example/courses/42";

    #[tokio::test]
    async fn apply_valid_code_caches_and_reports_success() {
        let fx = Fixture::new();
        fx.mock
            .accept("SAVE20", coupon("SAVE20", DiscountType::Percentage, 20.0), pricing(30000.0));
        let (controller, _) = fx.controller(course(42), PAGE, Default::default());

        assert!(controller.apply("save20").await);

        let snapshot = controller.snapshot().await;
        assert_eq!(snapshot.status, CouponStatus::Valid);
        assert_eq!(snapshot.error, None);
        assert_eq!(snapshot.discount_label().as_deref(), Some("20%"));
        assert_eq!(snapshot.discount_amount(), 30000.0);

        let cached: Option<AppliedCoupon> = fx.cache.get(&course(42)).await.unwrap();
        assert_eq!(cached, snapshot.applied);
    }

    #[tokio::test]
    async fn invalid_code_surfaces_message_and_is_not_cached() {
        let fx = Fixture::new();
        fx.mock.reject("OLD", "Coupon expired");
        let (controller, _) = fx.controller(course(42), PAGE, Default::default());

        assert!(!controller.apply("old").await);

        assert_eq!(controller.status().await, CouponStatus::Invalid);
        assert_eq!(controller.error_message().await.as_deref(), Some("Coupon expired"));
        assert!(fx.store.is_empty().await);
    }

    #[tokio::test]
    async fn failed_apply_replaces_previous_coupon() {
        let fx = Fixture::new();
        fx.mock
            .accept("GOOD", coupon("GOOD", DiscountType::Fixed, 10000.0), pricing(10000.0));
        fx.mock.fail("DOWN", PricingAuthorityError::network("timeout"));
        let (controller, _) = fx.controller(course(42), PAGE, Default::default());

        assert!(controller.apply("GOOD").await);
        assert!(!controller.apply("DOWN").await);

        assert_eq!(controller.status().await, CouponStatus::Error);
        assert_eq!(controller.applied_coupon().await, None);
        let cached: Option<AppliedCoupon> = fx.cache.get(&course(42)).await.unwrap();
        assert_eq!(cached, None);
    }

    #[tokio::test]
    async fn empty_code_only_sets_a_message() {
        let fx = Fixture::new();
        let (controller, _) = fx.controller(course(42), PAGE, Default::default());

        assert!(!controller.apply("  ").await);

        assert_eq!(controller.status().await, CouponStatus::None);
        assert_eq!(controller.error_message().await.as_deref(), Some(EMPTY_CODE_MESSAGE));
        assert_eq!(fx.mock.call_count(), 0);
    }

    #[tokio::test]
    async fn remove_without_coupon_is_harmless() {
        let fx = Fixture::new();
        let (controller, location) = fx.controller(course(42), PAGE, Default::default());

        controller.remove().await;
        controller.remove().await;

        assert_eq!(controller.snapshot().await, CouponSnapshot::default());
        assert_eq!(location.current_url(), PAGE);
    }

    #[tokio::test]
    async fn remove_clears_cache_and_url_param() {
        let fx = Fixture::new();
        fx.mock
            .accept("ABC", coupon("ABC", DiscountType::Percentage, 5.0), pricing(7500.0));
        let url = "https://shop.example/courses/42?coupon=ABC&ref=mail";
        let (controller, location) =
            fx.controller(course(42), url, CouponControllerOptions::auto_apply());

        controller.initialize().await;
        assert_eq!(controller.status().await, CouponStatus::Valid);
        assert_eq!(location.current_url(), url);

        controller.remove().await;

        assert_eq!(controller.status().await, CouponStatus::None);
        assert!(!fx.store.contains_key("coupon_course_42").await);
        assert_eq!(location.current_url(), "https://shop.example/courses/42?ref=mail");
        assert_eq!(location.history_len(), 1);
    }

    #[tokio::test]
    async fn url_code_without_auto_apply_is_only_recorded() {
        let fx = Fixture::new();
        let (controller, _) =
            fx.controller(course(42), "https://shop.example/c/42?coupon=abc", Default::default());

        controller.initialize().await;

        assert_eq!(controller.url_code().await.as_deref(), Some("abc"));
        assert_eq!(controller.status().await, CouponStatus::None);
        assert_eq!(fx.mock.call_count(), 0);
    }

    #[tokio::test]
    async fn mount_adopts_live_cached_coupon_without_network() {
        let fx = Fixture::new();
        let applied = AppliedCoupon::new(
            coupon("KEEP", DiscountType::Fixed, 5000.0),
            pricing(5000.0),
            fx.cache.now(),
        );
        fx.cache.set(&course(42), &applied).await.unwrap();
        let (controller, _) = fx.controller(course(42), PAGE, Default::default());

        controller.initialize().await;

        assert_eq!(controller.status().await, CouponStatus::Valid);
        assert_eq!(controller.applied_coupon().await, Some(applied));
        assert_eq!(fx.mock.call_count(), 0);
    }

    #[tokio::test]
    async fn mount_ignores_expired_cached_coupon() {
        let fx = Fixture::new();
        let applied = AppliedCoupon::new(
            coupon("KEEP", DiscountType::Fixed, 5000.0),
            pricing(5000.0),
            fx.cache.now(),
        );
        fx.cache.set(&course(42), &applied).await.unwrap();
        fx.clock.advance(chrono::Duration::minutes(31));
        let (controller, _) = fx.controller(course(42), PAGE, Default::default());

        controller.initialize().await;

        assert_eq!(controller.status().await, CouponStatus::None);
        assert!(fx.store.is_empty().await);
    }

    #[tokio::test]
    async fn mount_drops_cached_coupon_stored_as_invalid() {
        let fx = Fixture::new();
        let mut applied = AppliedCoupon::new(
            coupon("BAD", DiscountType::Fixed, 5000.0),
            pricing(5000.0),
            fx.cache.now(),
        );
        applied.valid = false;
        fx.cache.set(&course(42), &applied).await.unwrap();
        let (controller, _) = fx.controller(course(42), PAGE, Default::default());

        controller.initialize().await;

        assert_eq!(controller.status().await, CouponStatus::None);
        assert!(!fx.store.contains_key("coupon_course_42").await);
    }

    #[tokio::test]
    async fn deferred_url_code_is_retried_once_per_id_change() {
        let fx = Fixture::new();
        fx.mock.reject("LATE", "Not valid for this course");
        let (controller, _) = fx.controller(
            ItemRef::pending(ItemType::Course),
            "https://shop.example/c?coupon=late",
            CouponControllerOptions::auto_apply(),
        );

        controller.initialize().await;
        assert_eq!(fx.mock.call_count(), 0);

        controller.set_item_id(42).await;
        assert_eq!(fx.mock.call_count(), 1);
        assert_eq!(controller.status().await, CouponStatus::Invalid);

        controller.set_item_id(42).await;
        assert_eq!(fx.mock.call_count(), 1);

        controller.set_item_id(0).await;
        controller.set_item_id(42).await;
        assert_eq!(fx.mock.call_count(), 2);

        controller.set_item_id(43).await;
        assert_eq!(fx.mock.call_count(), 3);
    }

    #[tokio::test]
    async fn code_entered_while_reloading_replaces_url_code() {
        let fx = Fixture::new();
        fx.mock.reject("A", "Not valid for this course");
        fx.mock
            .accept("B", coupon("B", DiscountType::Fixed, 1000.0), pricing(1000.0));
        let (controller, _) = fx.controller(
            ItemRef::pending(ItemType::Course),
            "https://shop.example/c?coupon=a",
            CouponControllerOptions::auto_apply(),
        );
        controller.initialize().await;
        controller.set_item_id(42).await;
        controller.set_item_id(0).await;

        assert!(!controller.apply("b").await);
        controller.set_item_id(42).await;

        assert_eq!(fx.mock.call_count(), 2);
        assert_eq!(fx.mock.calls()[1].code(), "B");
        assert_eq!(controller.status().await, CouponStatus::Valid);
        assert_eq!(controller.applied_coupon().await.unwrap().coupon.code, "B");
    }

    #[tokio::test]
    async fn apply_before_ready_is_deferred_silently() {
        let fx = Fixture::new();
        fx.mock
            .accept("EARLY", coupon("EARLY", DiscountType::Fixed, 1000.0), pricing(1000.0));
        let (controller, _) =
            fx.controller(ItemRef::pending(ItemType::Event), PAGE, Default::default());

        assert!(!controller.apply("early").await);
        assert_eq!(controller.snapshot().await, CouponSnapshot::default());

        controller.set_item_id(9).await;

        assert_eq!(controller.status().await, CouponStatus::Valid);
        assert_eq!(fx.mock.call_count(), 1);
    }

    #[tokio::test]
    async fn superseded_response_is_discarded() {
        let fx = Fixture::new();
        fx.mock
            .accept("SLOW", coupon("SLOW", DiscountType::Fixed, 1000.0), pricing(1000.0));
        fx.mock
            .accept("FAST", coupon("FAST", DiscountType::Fixed, 2000.0), pricing(2000.0));
        fx.mock.delay("SLOW", Duration::from_millis(50));
        let (controller, _) = fx.controller(course(42), PAGE, Default::default());

        let (slow, fast) = tokio::join!(controller.apply("SLOW"), async {
            tokio::time::sleep(Duration::from_millis(5)).await;
            controller.apply("FAST").await
        });

        assert!(!slow);
        assert!(fast);
        let applied = controller.applied_coupon().await.unwrap();
        assert_eq!(applied.coupon.code, "FAST");
        let cached: AppliedCoupon = fx.cache.get(&course(42)).await.unwrap().unwrap();
        assert_eq!(cached.coupon.code, "FAST");
    }

    #[tokio::test]
    async fn response_after_remove_is_discarded() {
        let fx = Fixture::new();
        fx.mock
            .accept("SLOW", coupon("SLOW", DiscountType::Fixed, 1000.0), pricing(1000.0));
        fx.mock.delay("SLOW", Duration::from_millis(50));
        let (controller, _) = fx.controller(course(42), PAGE, Default::default());

        let (applied, _) = tokio::join!(controller.apply("SLOW"), async {
            tokio::time::sleep(Duration::from_millis(5)).await;
            assert!(controller.is_loading().await);
            controller.remove().await
        });

        assert!(!applied);
        assert_eq!(controller.status().await, CouponStatus::None);
        assert!(fx.store.is_empty().await);
    }
}
