//! Handler context and trait.

use crate::error::HandlerResult;
use crate::network::protocol::Member;
use crate::state::BotState;
use async_trait::async_trait;
use std::sync::Arc;

/// Everything a handler can see while answering one event.
pub struct Context<'a> {
    pub state: &'a Arc<BotState>,
    /// The member who triggered the event.
    pub member: &'a Member,
    /// Event id, for log correlation.
    pub event_id: &'a str,
}

impl<'a> Context<'a> {
    pub fn new(state: &'a Arc<BotState>, member: &'a Member, event_id: &'a str) -> Self {
        Self {
            state,
            member,
            event_id,
        }
    }

    /// Name used when reporting who did something.
    pub fn display_name(&self) -> &str {
        if self.member.display_name.is_empty() {
            &self.member.id
        } else {
            &self.member.display_name
        }
    }
}

/// A bot command.
#[async_trait]
pub trait Handler: Send + Sync {
    /// Handle one invocation. `text` is the free-text argument, if any.
    async fn handle(&self, ctx: &Context<'_>, text: Option<&str>) -> HandlerResult;
}
