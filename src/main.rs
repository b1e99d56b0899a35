//! Diagnostic entry point.
//!
//! Usage: `storefront-coupons <item_type> <item_id> <code>`
//!
//! Validates one code against the configured pricing authority through the
//! same controller the storefront uses, and prints the resulting state. When
//! `STOREFRONT_COUPONS__CACHE__STORAGE_PATH` is set the applied coupon is
//! written to that file, so later runs pick it up.

use std::process::ExitCode;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use storefront_coupons::adapters::{
    FileSessionStore, HttpPricingAuthority, InMemoryLocation, InMemorySessionStore, SystemClock,
};
use storefront_coupons::application::{
    CouponController, CouponControllerOptions, CouponValidationClient, ExpiringCache,
};
use storefront_coupons::config::{AppConfig, LoggingConfig};
use storefront_coupons::domain::coupon::{ItemRef, ItemType};
use storefront_coupons::domain::pricing::{calculate, PricedLineItem};
use storefront_coupons::ports::SessionStore;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

const USAGE: &str = "usage: storefront-coupons <course|event|product> <item_id> <code>";

#[tokio::main]
async fn main() -> ExitCode {
    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("configuration error: {e}");
            return ExitCode::FAILURE;
        }
    };
    init_tracing(&config.logging);

    match run(config).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(2),
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(logging.default_filter()));
    let registry = tracing_subscriber::registry().with(filter);

    if logging.json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn run(config: AppConfig) -> Result<bool, BoxError> {
    config.validate()?;

    let args: Vec<String> = std::env::args().skip(1).collect();
    let [item_type, item_id, code] = args.as_slice() else {
        return Err(USAGE.into());
    };
    let item_type: ItemType = item_type.parse()?;
    let item_id: u64 = item_id.parse().map_err(|_| USAGE)?;
    let item = ItemRef::new(item_type, item_id);

    let store: Arc<dyn SessionStore> = match &config.cache.storage_path {
        Some(path) => Arc::new(FileSessionStore::new(path)),
        None => Arc::new(InMemorySessionStore::new()),
    };
    let cache = Arc::new(ExpiringCache::new(store, Arc::new(SystemClock), &config.cache));
    let client = Arc::new(CouponValidationClient::new(Arc::new(
        HttpPricingAuthority::new(&config.pricing_api)?,
    )));
    let location = Arc::new(InMemoryLocation::parse(&format!(
        "https://storefront.local/{item_type}s/{item_id}"
    ))?);

    let controller = CouponController::new(
        item,
        client,
        cache,
        location,
        CouponControllerOptions::default(),
    );
    controller.initialize().await;
    let applied = controller.apply(code).await;
    let snapshot = controller.snapshot().await;

    println!("status: {}", snapshot.status);
    if let Some(error) = &snapshot.error {
        println!("message: {error}");
    }
    if let Some(coupon) = &snapshot.applied {
        let breakdown = calculate(
            &[PricedLineItem::new(coupon.coupon.name.clone(), coupon.pricing.original_price, 1)
                .for_item(item)],
            Some(coupon),
        );
        println!("coupon: {} ({})", coupon.coupon.code, coupon.coupon.discount_label());
        println!("subtotal: {}", breakdown.subtotal);
        println!("discount: {}", breakdown.discount);
        println!("total: {}", breakdown.total);
        for note in &breakdown.recurring {
            println!("note: {}", note.message());
        }
    }

    Ok(applied)
}
