//! Telemetry utilities for command timing and tracing spans.

use std::time::Instant;

/// Guard for timing command execution and recording metrics.
///
/// Records command latency when dropped.
pub struct CommandTimer {
    command: String,
    start: Instant,
}

impl CommandTimer {
    /// Start timing a command.
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            start: Instant::now(),
        }
    }
}

impl Drop for CommandTimer {
    fn drop(&mut self) {
        let duration = self.start.elapsed().as_secs_f64();
        crate::metrics::record_command(&self.command, duration);
    }
}

/// Standardized span constructors.
pub mod spans {
    use tracing::{Span, info_span};

    /// Span for one bridge connection.
    pub fn connection(conn_id: &str, addr: &str) -> Span {
        info_span!("connection", conn = %conn_id, addr = %addr)
    }

    /// Span for one handled event.
    pub fn event(kind: &str, event_id: &str, user: &str) -> Span {
        info_span!("event", kind = %kind, id = %event_id, user = %user)
    }
}
