//! Abuse protection for the bridge listener.

pub mod rate_limit;

pub use rate_limit::ConnectionRateLimiter;
