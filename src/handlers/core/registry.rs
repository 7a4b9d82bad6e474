//! Handler registry and event dispatch.

use super::context::{Context, Handler};
use crate::error::HandlerError;
use crate::handlers::message;
use crate::handlers::{FormatHandler, GenerateHandler, RestockHandler, StockHandler};
use crate::network::protocol::{Event, Member, Outcome, Reply};
use crate::state::BotState;
use crate::telemetry::{CommandTimer, spans};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{Instrument, debug, error, info};

/// Metric label for events that name no registered command.
const UNKNOWN_COMMAND: &str = "unknown";

/// Registry of command handlers.
pub struct Registry {
    handlers: HashMap<&'static str, Box<dyn Handler>>,
    command_counts: HashMap<&'static str, AtomicU64>,
}

impl Registry {
    pub fn new() -> Self {
        let mut handlers: HashMap<&'static str, Box<dyn Handler>> = HashMap::new();

        handlers.insert("generate", Box::new(GenerateHandler));
        handlers.insert("restock", Box::new(RestockHandler));
        handlers.insert("stock", Box::new(StockHandler));
        handlers.insert("format", Box::new(FormatHandler));

        let command_counts = handlers
            .keys()
            .map(|&cmd| (cmd, AtomicU64::new(0)))
            .collect();

        Self {
            handlers,
            command_counts,
        }
    }

    /// Command usage counts, most used first. Unused commands are omitted.
    pub fn get_command_stats(&self) -> Vec<(&'static str, u64)> {
        let mut stats: Vec<_> = self
            .command_counts
            .iter()
            .map(|(cmd, count)| (*cmd, count.load(Ordering::Relaxed)))
            .filter(|(_, count)| *count > 0)
            .collect();

        stats.sort_by(|a, b| b.1.cmp(&a.1));
        stats
    }

    /// Handle one inbound event.
    ///
    /// Commands always produce a reply. Messages produce one only when they
    /// carry a text command or a detectable credential template.
    /// A `<prefix>format` message is answered by the command alone and skips
    /// passive detection.
    pub async fn dispatch(&self, state: &Arc<BotState>, event: &Event) -> Option<Reply> {
        let outcome = match event {
            Event::Command(cmd) => {
                let span = spans::event("command", &cmd.id, &cmd.user.id);
                self.run_command(state, &cmd.user, &cmd.id, &cmd.name, cmd.text.as_deref())
                    .instrument(span)
                    .await
            }
            Event::Message(msg) => {
                if msg.from_self {
                    return None;
                }
                let span = spans::event("message", &msg.id, &msg.user.id);

                match message::text_command(&state.bot.command_prefix, &msg.content) {
                    Some((name, text)) => {
                        self.run_command(state, &msg.user, &msg.id, name, text)
                            .instrument(span)
                            .await
                    }
                    None => span.in_scope(|| message::scan(state, &msg.content))?,
                }
            }
        };

        Some(Reply::new(event, outcome))
    }

    async fn run_command(
        &self,
        state: &Arc<BotState>,
        member: &Member,
        event_id: &str,
        name: &str,
        text: Option<&str>,
    ) -> Outcome {
        let Some((&cmd_name, handler)) = self.handlers.get_key_value(name) else {
            debug!(command = %name, "unknown command");
            crate::metrics::record_command_error(UNKNOWN_COMMAND, "unknown_command");
            return HandlerError::UnknownCommand(name.to_string()).to_outcome();
        };

        if let Some(counter) = self.command_counts.get(cmd_name) {
            counter.fetch_add(1, Ordering::Relaxed);
        }

        let _timer = CommandTimer::new(cmd_name);
        let ctx = Context::new(state, member, event_id);

        match handler.handle(&ctx, text).await {
            Ok(outcome) => outcome,
            Err(e) => {
                let code = e.error_code();
                match &e {
                    HandlerError::Denied(_) => {
                        crate::metrics::record_denial(code);
                        info!(command = cmd_name, user = %member.id, reason = code, "request denied");
                    }
                    HandlerError::NeedMoreParams(_) | HandlerError::UnknownCommand(_) => {
                        crate::metrics::record_command_error(cmd_name, code);
                        debug!(command = cmd_name, error = %e, "bad request");
                    }
                    HandlerError::Stock(_) => {
                        crate::metrics::record_command_error(cmd_name, code);
                        error!(command = cmd_name, error = %e, "command failed");
                    }
                }
                e.to_outcome()
            }
        }
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}
