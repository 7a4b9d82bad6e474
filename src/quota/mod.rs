//! Per-user admission control.
//!
//! Two gates protect the generate command:
//! - **Daily limit**: a counter per user in a rolling 24h window anchored to
//!   the last reset. Checked first.
//! - **Cooldown**: a minimum interval since the last admitted use.
//!
//! Both gates are evaluated lazily at check time; nothing runs in the
//! background. All state lives in one `DashMap` keyed by user id and is only
//! reachable through [`QuotaEngine`]'s operations. Each check-and-mutate runs
//! while holding the user's entry guard, so two concurrent admissions for the
//! same user are serialized.

mod clock;

pub use clock::{Clock, ManualClock, SystemClock};

use crate::config::{LimitsConfig, TierLimit};
use crate::error::Denial;
use crate::roles::RoleResolver;
use chrono::{DateTime, TimeDelta, Utc};
use dashmap::DashMap;
use dashmap::mapref::one::RefMut;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// Privilege tier, recomputed from role membership on every request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Privileged,
    Standard,
}

impl Tier {
    pub fn resolve(roles: &dyn RoleResolver, user_id: &str, privileged_role: &str) -> Self {
        if roles.is_in_role(user_id, privileged_role) {
            Self::Privileged
        } else {
            Self::Standard
        }
    }
}

fn daily_window() -> TimeDelta {
    TimeDelta::hours(24)
}

/// Rolling daily counter.
#[derive(Debug, Clone, Copy)]
struct DailyCounter {
    count: u32,
    reset_time: DateTime<Utc>,
}

impl DailyCounter {
    fn new(now: DateTime<Utc>) -> Self {
        Self {
            count: 0,
            reset_time: now + daily_window(),
        }
    }

    fn roll_over(&mut self, now: DateTime<Utc>) {
        if now >= self.reset_time {
            self.count = 0;
            self.reset_time = now + daily_window();
        }
    }

    /// Consume one use, or report the time left until the window resets.
    fn check(&mut self, now: DateTime<Utc>, limit: u32) -> Result<(), (u64, u64)> {
        self.roll_over(now);
        if self.count >= limit {
            let remaining = (self.reset_time - now).num_seconds().max(0) as u64;
            return Err((remaining / 3600, (remaining % 3600) / 60));
        }
        self.count += 1;
        Ok(())
    }

    fn refund(&mut self) {
        self.count = self.count.saturating_sub(1);
    }
}

/// Everything the engine knows about one user.
#[derive(Debug, Clone, Copy)]
struct UserQuotaState {
    last_used: Option<DateTime<Utc>>,
    daily: DailyCounter,
}

impl UserQuotaState {
    fn new(now: DateTime<Utc>) -> Self {
        Self {
            last_used: None,
            daily: DailyCounter::new(now),
        }
    }

    /// Stamp `now` as the last use, or report seconds left (rounded up).
    fn check_cooldown(&mut self, now: DateTime<Utc>, cooldown: TimeDelta) -> Result<(), u64> {
        if let Some(last) = self.last_used {
            let elapsed = now - last;
            if elapsed < cooldown {
                let shortfall = cooldown.checked_sub(&elapsed).unwrap_or(TimeDelta::MAX);
                let shortfall_ms = shortfall.num_milliseconds().max(0) as u64;
                return Err(shortfall_ms.div_ceil(1000));
            }
        }
        self.last_used = Some(now);
        Ok(())
    }
}

/// Tiered cooldown and daily-limit enforcement.
pub struct QuotaEngine {
    users: DashMap<String, UserQuotaState>,
    limits: LimitsConfig,
    clock: Arc<dyn Clock>,
}

impl QuotaEngine {
    pub fn new(limits: LimitsConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            users: DashMap::new(),
            limits,
            clock,
        }
    }

    /// Limits that apply to `tier`.
    pub fn limit_for(&self, tier: Tier) -> TierLimit {
        match tier {
            Tier::Privileged => self.limits.premium,
            Tier::Standard => self.limits.standard,
        }
    }

    /// Cooldown for `tier`. Values too large to represent saturate, so the
    /// gate stays closed rather than wrapping open.
    fn cooldown_for(&self, tier: Tier) -> TimeDelta {
        self.limit_for(tier).cooldown().unwrap_or(TimeDelta::MAX)
    }

    /// What a standard member would gain by upgrading.
    fn upgrade_hint(&self, tier: Tier) -> Option<TierLimit> {
        (tier == Tier::Standard).then_some(self.limits.premium)
    }

    fn entry(&self, user_id: &str, now: DateTime<Utc>) -> RefMut<'_, String, UserQuotaState> {
        self.users
            .entry(user_id.to_string())
            .or_insert_with(|| UserQuotaState::new(now))
    }

    /// Daily gate alone. Consumes one use on admission.
    pub fn check_daily_limit(&self, user_id: &str, tier: Tier) -> Result<(), Denial> {
        let now = self.clock.now();
        let limit = self.limit_for(tier).daily_limit;
        let mut state = self.entry(user_id, now);
        state
            .daily
            .check(now, limit)
            .map_err(|(hours, minutes)| self.quota_exceeded(user_id, tier, limit, hours, minutes))
    }

    /// Cooldown gate alone. Stamps the use on admission.
    pub fn check_cooldown(&self, user_id: &str, tier: Tier) -> Result<(), Denial> {
        let now = self.clock.now();
        let cooldown = self.cooldown_for(tier);
        let mut state = self.entry(user_id, now);
        state
            .check_cooldown(now, cooldown)
            .map_err(|seconds| self.cooldown_active(user_id, tier, seconds))
    }

    /// Run both gates, daily limit first, as one critical section.
    ///
    /// The daily use is consumed by the first gate even when the cooldown
    /// then denies.
    pub fn admit(&self, user_id: &str, tier: Tier) -> Result<(), Denial> {
        let now = self.clock.now();
        let limit = self.limit_for(tier);
        let mut state = self.entry(user_id, now);

        state
            .daily
            .check(now, limit.daily_limit)
            .map_err(|(hours, minutes)| {
                self.quota_exceeded(user_id, tier, limit.daily_limit, hours, minutes)
            })?;

        if let Err(seconds) = state.check_cooldown(now, self.cooldown_for(tier)) {
            return Err(self.cooldown_active(user_id, tier, seconds));
        }

        debug!(user = %user_id, ?tier, count = state.daily.count, "generation admitted");
        Ok(())
    }

    /// Give back one daily use after the gated action failed for a reason
    /// unrelated to quota. The cooldown stamp is left in place.
    pub fn refund(&self, user_id: &str) {
        if let Some(mut state) = self.users.get_mut(user_id) {
            state.daily.refund();
            debug!(user = %user_id, count = state.daily.count, "daily use refunded");
        }
    }

    /// Current `(count, limit)` for the user's window.
    pub fn usage(&self, user_id: &str, tier: Tier) -> (u32, u32) {
        let limit = self.limit_for(tier).daily_limit;
        let count = self
            .users
            .get(user_id)
            .map(|state| {
                if self.clock.now() >= state.daily.reset_time {
                    0
                } else {
                    state.daily.count
                }
            })
            .unwrap_or(0);
        (count, limit)
    }

    /// Number of users with quota state.
    pub fn tracked_users(&self) -> usize {
        self.users.len()
    }

    fn quota_exceeded(
        &self,
        user_id: &str,
        tier: Tier,
        limit: u32,
        hours: u64,
        minutes: u64,
    ) -> Denial {
        debug!(user = %user_id, ?tier, limit, hours, minutes, "daily limit reached");
        Denial::QuotaExceeded {
            limit,
            hours,
            minutes,
            upgrade: self.upgrade_hint(tier),
        }
    }

    fn cooldown_active(&self, user_id: &str, tier: Tier, seconds: u64) -> Denial {
        debug!(user = %user_id, ?tier, seconds, "cooldown active");
        Denial::CooldownActive {
            seconds,
            upgrade: self.upgrade_hint(tier),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn limits(cooldown_secs: u64, daily_limit: u32) -> LimitsConfig {
        LimitsConfig {
            premium: TierLimit {
                cooldown_secs: 1,
                daily_limit: 100,
            },
            standard: TierLimit {
                cooldown_secs,
                daily_limit,
            },
        }
    }

    fn setup(cooldown_secs: u64, daily_limit: u32) -> (QuotaEngine, Arc<ManualClock>) {
        let start = Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap();
        let clock = Arc::new(ManualClock::new(start));
        let engine = QuotaEngine::new(limits(cooldown_secs, daily_limit), clock.clone());
        (engine, clock)
    }

    #[test]
    fn test_cooldown_denies_with_remaining_seconds() {
        let (engine, clock) = setup(30, 10);
        assert!(engine.check_cooldown("u1", Tier::Standard).is_ok());
        clock.advance(TimeDelta::seconds(10));
        let denial = engine.check_cooldown("u1", Tier::Standard).unwrap_err();
        assert!(matches!(denial, Denial::CooldownActive { seconds: 20, .. }));
    }

    #[test]
    fn test_cooldown_rounds_up_partial_seconds() {
        let (engine, clock) = setup(30, 10);
        engine.check_cooldown("u1", Tier::Standard).unwrap();
        clock.advance(TimeDelta::milliseconds(10_500));
        let denial = engine.check_cooldown("u1", Tier::Standard).unwrap_err();
        assert!(matches!(denial, Denial::CooldownActive { seconds: 20, .. }));
    }

    #[test]
    fn test_cooldown_expires() {
        let (engine, clock) = setup(30, 10);
        engine.check_cooldown("u1", Tier::Standard).unwrap();
        clock.advance(TimeDelta::seconds(30));
        assert!(engine.check_cooldown("u1", Tier::Standard).is_ok());
    }

    #[test]
    fn test_huge_cooldown_stays_enforced() {
        for cooldown_secs in [u64::MAX, 100_000_000_000_000_000] {
            let (engine, clock) = setup(cooldown_secs, 10);
            engine.admit("u1", Tier::Standard).unwrap();
            clock.advance(TimeDelta::days(365));
            let denial = engine.admit("u1", Tier::Standard).unwrap_err();
            assert!(matches!(denial, Denial::CooldownActive { seconds, .. } if seconds > 0));
        }
    }

    #[test]
    fn test_daily_limit_never_exceeded() {
        let (engine, _clock) = setup(0, 3);
        for _ in 0..3 {
            engine.check_daily_limit("u1", Tier::Standard).unwrap();
        }
        for _ in 0..5 {
            assert!(engine.check_daily_limit("u1", Tier::Standard).is_err());
            let (count, limit) = engine.usage("u1", Tier::Standard);
            assert!(count <= limit);
        }
    }

    #[test]
    fn test_daily_denial_reports_time_until_reset() {
        let (engine, clock) = setup(0, 1);
        engine.check_daily_limit("u1", Tier::Standard).unwrap();
        clock.advance(TimeDelta::minutes(90));
        let denial = engine.check_daily_limit("u1", Tier::Standard).unwrap_err();
        assert_eq!(
            denial,
            Denial::QuotaExceeded {
                limit: 1,
                hours: 22,
                minutes: 30,
                upgrade: Some(TierLimit {
                    cooldown_secs: 1,
                    daily_limit: 100
                }),
            }
        );
    }

    #[test]
    fn test_daily_window_resets_lazily() {
        let (engine, clock) = setup(0, 2);
        engine.check_daily_limit("u1", Tier::Standard).unwrap();
        engine.check_daily_limit("u1", Tier::Standard).unwrap();
        assert!(engine.check_daily_limit("u1", Tier::Standard).is_err());

        clock.advance(TimeDelta::hours(24));
        assert!(engine.check_daily_limit("u1", Tier::Standard).is_ok());
        assert_eq!(engine.usage("u1", Tier::Standard), (1, 2));
    }

    #[test]
    fn test_refund_restores_count() {
        let (engine, _clock) = setup(0, 5);
        engine.admit("u1", Tier::Standard).unwrap();
        let before = engine.usage("u1", Tier::Standard).0;
        engine.admit("u1", Tier::Standard).unwrap();
        engine.refund("u1");
        assert_eq!(engine.usage("u1", Tier::Standard).0, before);
    }

    #[test]
    fn test_refund_keeps_cooldown_stamp() {
        let (engine, clock) = setup(60, 5);
        engine.admit("u1", Tier::Standard).unwrap();
        engine.refund("u1");
        clock.advance(TimeDelta::seconds(5));
        let denial = engine.admit("u1", Tier::Standard).unwrap_err();
        assert!(matches!(denial, Denial::CooldownActive { seconds: 55, .. }));
    }

    #[test]
    fn test_cooldown_denial_still_burns_daily_use() {
        let (engine, clock) = setup(60, 5);
        engine.admit("u1", Tier::Standard).unwrap();
        clock.advance(TimeDelta::seconds(1));
        assert!(matches!(
            engine.admit("u1", Tier::Standard),
            Err(Denial::CooldownActive { .. })
        ));
        assert!(matches!(
            engine.admit("u1", Tier::Standard),
            Err(Denial::CooldownActive { .. })
        ));
        assert_eq!(engine.usage("u1", Tier::Standard), (3, 5));
    }

    #[test]
    fn test_spamming_during_cooldown_exhausts_daily_limit() {
        let (engine, clock) = setup(60, 3);
        engine.admit("u1", Tier::Standard).unwrap();
        clock.advance(TimeDelta::seconds(1));
        assert!(engine.admit("u1", Tier::Standard).is_err());
        assert!(engine.admit("u1", Tier::Standard).is_err());

        clock.advance(TimeDelta::seconds(60));
        let denial = engine.admit("u1", Tier::Standard).unwrap_err();
        assert!(matches!(denial, Denial::QuotaExceeded { limit: 3, .. }));
    }

    #[test]
    fn test_daily_checked_before_cooldown() {
        let (engine, clock) = setup(60, 1);
        engine.admit("u1", Tier::Standard).unwrap();
        clock.advance(TimeDelta::seconds(1));
        let denial = engine.admit("u1", Tier::Standard).unwrap_err();
        assert!(matches!(denial, Denial::QuotaExceeded { .. }));
    }

    #[test]
    fn test_tiers_use_their_own_limits() {
        let (engine, clock) = setup(3600, 10);
        engine.admit("vip", Tier::Privileged).unwrap();
        clock.advance(TimeDelta::seconds(2));
        assert!(engine.admit("vip", Tier::Privileged).is_ok());
        let denial = engine.admit("vip", Tier::Privileged).unwrap_err();
        assert!(matches!(
            denial,
            Denial::CooldownActive {
                upgrade: None,
                ..
            }
        ));
    }

    #[test]
    fn test_users_are_independent() {
        let (engine, _clock) = setup(60, 1);
        engine.admit("u1", Tier::Standard).unwrap();
        assert!(engine.admit("u2", Tier::Standard).is_ok());
        assert_eq!(engine.tracked_users(), 2);
    }

    #[test]
    fn test_refund_unknown_user_is_noop() {
        let (engine, _clock) = setup(60, 1);
        engine.refund("ghost");
        assert_eq!(engine.tracked_users(), 0);
    }

    #[test]
    fn test_concurrent_admissions_respect_limit() {
        let (engine, _clock) = setup(0, 10);
        let engine = Arc::new(engine);
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let engine = Arc::clone(&engine);
                std::thread::spawn(move || {
                    (0..5)
                        .filter(|_| engine.admit("shared", Tier::Standard).is_ok())
                        .count()
                })
            })
            .collect();
        let admitted: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(admitted, 10);
        assert_eq!(engine.usage("shared", Tier::Standard), (10, 10));
    }
}
