//! Configuration loading and management.
//!
//! This module is split into logical submodules:
//! - [`types`]: Core config struct definitions (Config, BotConfig, RolesConfig, ListenConfig)
//! - [`limits`]: Per-tier cooldown and daily limit configuration (LimitsConfig, TierLimit)
//! - [`stock`]: Stock backend configuration (StockConfig, StockBackendKind)
//! - [`validation`]: Startup validation of a loaded configuration

mod defaults;
mod limits;
mod stock;
mod types;
pub mod validation;

pub use limits::{LimitsConfig, TierLimit};
pub use stock::{StockBackendKind, StockConfig};
pub use types::{BotConfig, Config, ConfigError, ListenConfig, RolesConfig, ServerConfig};
