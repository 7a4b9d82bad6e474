//! Configuration validation.
//!
//! Validates configuration at startup to catch common errors early.

use super::{Config, StockBackendKind};
use std::path::Path;
use thiserror::Error;

/// Validation errors for configuration.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("roles.premium must not be empty")]
    MissingPremiumRole,
    #[error("roles.restock must not be empty")]
    MissingRestockRole,
    #[error("bot.command_prefix must not be empty")]
    MissingCommandPrefix,
    #[error("stock.path must not be empty")]
    MissingStockPath,
    #[error("stock.path parent directory does not exist: {0}")]
    StockPathInvalid(String),
    #[error("server.metrics_port {0} collides with the listen port")]
    MetricsPortCollision(u16),
    #[error("limits.{tier}.cooldown_secs {secs} is too large")]
    CooldownOutOfRange { tier: &'static str, secs: u64 },
}

/// Validate a configuration, returning all errors found.
pub fn validate(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.roles.premium.is_empty() {
        errors.push(ValidationError::MissingPremiumRole);
    }
    if config.roles.restock.is_empty() {
        errors.push(ValidationError::MissingRestockRole);
    }
    if config.bot.command_prefix.is_empty() {
        errors.push(ValidationError::MissingCommandPrefix);
    }

    let stock_path = &config.stock.path;
    let in_memory = config.stock.backend == StockBackendKind::Sqlite && stock_path == ":memory:";
    if stock_path.is_empty() {
        errors.push(ValidationError::MissingStockPath);
    } else if !in_memory
        && let Some(parent) = Path::new(stock_path).parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        errors.push(ValidationError::StockPathInvalid(stock_path.clone()));
    }

    let metrics_port = config.server.effective_metrics_port();
    if metrics_port != 0 && metrics_port == config.listen.address.port() {
        errors.push(ValidationError::MetricsPortCollision(metrics_port));
    }

    for (tier, limit) in [
        ("premium", &config.limits.premium),
        ("standard", &config.limits.standard),
    ] {
        if limit.cooldown().is_none() {
            errors.push(ValidationError::CooldownOutOfRange {
                tier,
                secs: limit.cooldown_secs,
            });
        }
        if limit.daily_limit == 0 {
            tracing::warn!(tier, "daily_limit is 0 - this tier can never generate");
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
