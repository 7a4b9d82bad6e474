//! Shared bot state.
//!
//! One [`BotState`] is built at startup and shared by every bridge
//! connection through an `Arc`. All mutable state lives behind the quota
//! engine's per-user entries or the stock backend's own lock.

use crate::config::{BotConfig, Config, RolesConfig};
use crate::credential::Detector;
use crate::quota::{Clock, QuotaEngine};
use crate::security::ConnectionRateLimiter;
use crate::stock::Stock;
use std::sync::Arc;

pub struct BotState {
    pub bot: BotConfig,
    pub roles: RolesConfig,
    /// Hand out random pairs instead of reporting an empty stock.
    pub random_fallback: bool,
    pub quota: QuotaEngine,
    pub stock: Stock,
    pub detector: Detector,
    /// Per-IP limiter consulted by the gateway before accepting a bridge.
    pub connection_limiter: ConnectionRateLimiter,
}

impl BotState {
    /// Assemble state from a validated configuration and an opened stock.
    pub fn new(config: &Config, stock: Stock, detector: Detector, clock: Arc<dyn Clock>) -> Self {
        Self {
            bot: config.bot.clone(),
            roles: config.roles.clone(),
            random_fallback: config.stock.random_fallback,
            quota: QuotaEngine::new(config.limits.clone(), clock),
            stock,
            detector,
            connection_limiter: ConnectionRateLimiter::new(config.listen.connection_burst_per_ip),
        }
    }
}
