//! Prometheus metrics collection for accgen.
//!
//! - `accgen_accounts_dispensed_total` - accounts handed out from stock
//! - `accgen_accounts_generated_total` - accounts produced by the random fallback
//! - `accgen_accounts_restocked_total` - records appended by restock
//! - `accgen_denials_total{reason}` - requests refused, by denial code
//! - `accgen_messages_formatted_total` - credential templates reformatted
//! - `accgen_command_total{command}` / `accgen_command_duration_seconds{command}`
//! - `accgen_command_errors_total{command,error}` - internal handler failures
//! - `accgen_stock_size` - last observed stock size
//! - `accgen_rate_limited_total` - bridge connections refused by rate limit

use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};
use std::sync::OnceLock;

/// Global Prometheus registry for all metrics.
pub static REGISTRY: OnceLock<Registry> = OnceLock::new();

pub fn registry() -> &'static Registry {
    REGISTRY.get_or_init(Registry::new)
}

// ========================================================================
// Counters (monotonic increasing)
// ========================================================================

pub static ACCOUNTS_DISPENSED: OnceLock<IntCounter> = OnceLock::new();

pub static ACCOUNTS_GENERATED: OnceLock<IntCounter> = OnceLock::new();

pub static ACCOUNTS_RESTOCKED: OnceLock<IntCounter> = OnceLock::new();

pub static MESSAGES_FORMATTED: OnceLock<IntCounter> = OnceLock::new();

/// Bridge connections refused by the per-IP limiter.
pub static RATE_LIMITED: OnceLock<IntCounter> = OnceLock::new();

pub static DENIALS: OnceLock<IntCounterVec> = OnceLock::new();

pub static COMMAND_COUNTER: OnceLock<IntCounterVec> = OnceLock::new();

pub static COMMAND_ERRORS: OnceLock<IntCounterVec> = OnceLock::new();

// ========================================================================
// Gauges and histograms
// ========================================================================

pub static STOCK_SIZE: OnceLock<IntGauge> = OnceLock::new();

pub static COMMAND_LATENCY: OnceLock<HistogramVec> = OnceLock::new();

/// Initialize the Prometheus metrics registry.
///
/// Must be called once at startup before any metrics are recorded. Until
/// then every recording helper is a no-op.
pub fn init() {
    let r = registry();

    macro_rules! register {
        ($metric:ident, $init:expr) => {
            match $init {
                Ok(m) => {
                    if let Err(e) = r.register(Box::new(m.clone())) {
                        tracing::warn!(error = %e, concat!("Failed to register metric ", stringify!($metric)));
                    }
                    let _ = $metric.set(m);
                }
                Err(e) => {
                    tracing::warn!(error = %e, concat!("Failed to create metric ", stringify!($metric)));
                }
            }
        };
    }

    register!(ACCOUNTS_DISPENSED, IntCounter::new("accgen_accounts_dispensed_total", "Accounts handed out from stock"));
    register!(ACCOUNTS_GENERATED, IntCounter::new("accgen_accounts_generated_total", "Accounts produced by the random fallback"));
    register!(ACCOUNTS_RESTOCKED, IntCounter::new("accgen_accounts_restocked_total", "Records appended by restock"));
    register!(MESSAGES_FORMATTED, IntCounter::new("accgen_messages_formatted_total", "Credential templates reformatted"));
    register!(RATE_LIMITED, IntCounter::new("accgen_rate_limited_total", "Bridge connections refused by rate limit"));
    register!(DENIALS, IntCounterVec::new(Opts::new("accgen_denials_total", "Requests refused by reason"), &["reason"]));
    register!(COMMAND_COUNTER, IntCounterVec::new(Opts::new("accgen_command_total", "Commands processed by name"), &["command"]));
    register!(COMMAND_ERRORS, IntCounterVec::new(Opts::new("accgen_command_errors_total", "Command failures by name and error"), &["command", "error"]));
    register!(STOCK_SIZE, IntGauge::new("accgen_stock_size", "Last observed stock size"));
    register!(COMMAND_LATENCY, HistogramVec::new(
        HistogramOpts::new("accgen_command_duration_seconds", "Command latency by name")
            .buckets(vec![0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0]),
        &["command"]));
}

/// Gather all metrics and encode them in Prometheus text format.
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = registry().gather();
    let mut buffer = vec![];
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!(error = %e, "Failed to encode Prometheus metrics");
        return String::new();
    }
    match String::from_utf8(buffer) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(error = %e, "Prometheus metrics were not valid UTF-8");
            String::new()
        }
    }
}

// ============================================================================
// Recording helpers
// ============================================================================

#[inline]
pub fn record_dispensed() {
    if let Some(c) = ACCOUNTS_DISPENSED.get() {
        c.inc();
    }
}

#[inline]
pub fn record_generated() {
    if let Some(c) = ACCOUNTS_GENERATED.get() {
        c.inc();
    }
}

#[inline]
pub fn record_restocked(added: usize) {
    if let Some(c) = ACCOUNTS_RESTOCKED.get() {
        c.inc_by(added as u64);
    }
}

#[inline]
pub fn record_formatted() {
    if let Some(c) = MESSAGES_FORMATTED.get() {
        c.inc();
    }
}

#[inline]
pub fn record_rate_limited() {
    if let Some(c) = RATE_LIMITED.get() {
        c.inc();
    }
}

#[inline]
pub fn record_denial(reason: &str) {
    if let Some(c) = DENIALS.get() {
        c.with_label_values(&[reason]).inc();
    }
}

#[inline]
pub fn set_stock_size(count: usize) {
    if let Some(g) = STOCK_SIZE.get() {
        g.set(count as i64);
    }
}

/// Record a command execution with latency.
#[inline]
pub fn record_command(command: &str, duration_secs: f64) {
    if let Some(c) = COMMAND_COUNTER.get() {
        c.with_label_values(&[command]).inc();
    }
    if let Some(h) = COMMAND_LATENCY.get() {
        h.with_label_values(&[command]).observe(duration_secs);
    }
}

/// Record a command failure.
#[inline]
pub fn record_command_error(command: &str, error: &str) {
    if let Some(c) = COMMAND_ERRORS.get() {
        c.with_label_values(&[command, error]).inc();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_lifecycle() {
        init();

        record_command("generate", 0.001);
        record_denial("cooldown_active");
        set_stock_size(4);

        let output = gather_metrics();
        assert!(output.contains("accgen_command_total"));
        assert!(output.contains("accgen_denials_total"));
        assert!(output.contains("accgen_stock_size"));
    }
}
