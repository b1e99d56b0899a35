//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid pricing API URL format")]
    InvalidPricingApiUrl,

    #[error("Invalid request timeout (must be 1-120 seconds)")]
    InvalidTimeout,

    #[error("Invalid cache TTL (must be 1-1440 minutes)")]
    InvalidTtl,

    #[error("Cache item prefix cannot be empty")]
    EmptyItemPrefix,

    #[error("Checkout key must not start with the item prefix")]
    CheckoutKeyCollidesWithPrefix,
}
