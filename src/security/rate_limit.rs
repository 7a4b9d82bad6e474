//! Connection rate limiting for the bridge listener.
//!
//! Each remote IP gets its own governor token bucket refilling at one
//! connection per second, with a configurable burst.

use dashmap::DashMap;
use governor::{Quota, RateLimiter as GovRateLimiter};
use nonzero_ext::nonzero;
use std::net::IpAddr;
use std::num::NonZeroU32;
use tracing::debug;

type DirectRateLimiter = governor::DefaultDirectRateLimiter;

/// Upper bound on tracked IPs before the table is flushed.
const MAX_ENTRIES: usize = 10_000;

/// Per-IP connection limiter.
#[derive(Debug)]
pub struct ConnectionRateLimiter {
    limiters: DashMap<IpAddr, DirectRateLimiter>,
    burst: NonZeroU32,
}

impl ConnectionRateLimiter {
    /// Create a limiter allowing `burst` back-to-back connections per IP.
    ///
    /// A burst of zero is treated as one.
    pub fn new(burst: u32) -> Self {
        Self {
            limiters: DashMap::new(),
            burst: NonZeroU32::new(burst).unwrap_or(nonzero!(1u32)),
        }
    }

    /// Check if an IP can open a new connection.
    ///
    /// Returns `true` if allowed, `false` if rate limited.
    pub fn check_connection_rate(&self, ip: IpAddr) -> bool {
        let burst = self.burst;
        let limiter = self.limiters.entry(ip).or_insert_with(|| {
            GovRateLimiter::direct(Quota::per_second(nonzero!(1u32)).allow_burst(burst))
        });

        let allowed = limiter.check().is_ok();
        if !allowed {
            debug!(ip = %ip, "connection rate limit exceeded");
        }
        allowed
    }

    /// Drop all limiters once the table grows past its bound.
    pub fn cleanup(&self) {
        if self.limiters.len() > MAX_ENTRIES {
            self.limiters.clear();
            debug!("cleared connection rate limiters (exceeded {} entries)", MAX_ENTRIES);
        }
    }

    pub fn tracked_ips(&self) -> usize {
        self.limiters.len()
    }
}
