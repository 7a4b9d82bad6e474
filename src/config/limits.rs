//! Per-tier rate limit configuration.

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};

use super::defaults::{
    default_premium_cooldown, default_premium_daily_limit, default_standard_cooldown,
    default_standard_daily_limit,
};

/// Cooldown and daily cap for a single tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierLimit {
    /// Minimum seconds between two admitted generations.
    pub cooldown_secs: u64,
    /// Maximum admitted generations per rolling 24h window.
    pub daily_limit: u32,
}

impl TierLimit {
    /// The cooldown as a duration, or `None` if chrono cannot represent it.
    pub fn cooldown(&self) -> Option<TimeDelta> {
        i64::try_from(self.cooldown_secs)
            .ok()
            .and_then(TimeDelta::try_seconds)
    }
}

/// Limits for both tiers.
#[derive(Debug, Clone, Deserialize)]
pub struct LimitsConfig {
    /// Members holding the premium role (default: 30s cooldown, 50/day).
    #[serde(default = "default_premium_limit")]
    pub premium: TierLimit,
    /// Everyone else (default: 1h cooldown, 10/day).
    #[serde(default = "default_standard_limit")]
    pub standard: TierLimit,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            premium: default_premium_limit(),
            standard: default_standard_limit(),
        }
    }
}

fn default_premium_limit() -> TierLimit {
    TierLimit {
        cooldown_secs: default_premium_cooldown(),
        daily_limit: default_premium_daily_limit(),
    }
}

fn default_standard_limit() -> TierLimit {
    TierLimit {
        cooldown_secs: default_standard_cooldown(),
        daily_limit: default_standard_daily_limit(),
    }
}
