// Logging module for structured logging using the tracing crate

use std::error::Error;

/// Initialize the tracing subscriber for structured logging
///
/// The subscriber is configured with:
/// - JSON formatting for easy parsing by log aggregation systems
/// - `RUST_LOG`-style env-filter level control (default: info)
/// - Output to stdout for container/cloud-native deployments
///
/// The cache core itself only emits events (decode failures at debug,
/// shared-memory faults at warn); the embedding process decides where
/// they go by installing a subscriber, typically through this helper.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn init_subscriber() -> Result<(), Box<dyn Error + Send + Sync>> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .json()
        .try_init()?;

    Ok(())
}
