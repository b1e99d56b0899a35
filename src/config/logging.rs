//! Logging configuration

use serde::Deserialize;

/// Tracing output configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoggingConfig {
    /// Emit JSON lines instead of human-readable output
    #[serde(default)]
    pub json: bool,

    /// Default filter when `RUST_LOG` is unset
    #[serde(default)]
    pub filter: Option<String>,
}

impl LoggingConfig {
    /// Filter directive to use when `RUST_LOG` is unset
    pub fn default_filter(&self) -> &str {
        self.filter.as_deref().unwrap_or("storefront_coupons=info")
    }
}
