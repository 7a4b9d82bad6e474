//! Bridge wire format.
//!
//! The chat platform client ("bridge") and the bot exchange one JSON object
//! per line. The bridge sends [`Event`]s; the bot answers with [`Reply`]s
//! carrying a structured [`Outcome`]. Presentation (embeds, colors, emoji)
//! is entirely the bridge's job.

use crate::config::TierLimit;
use crate::quota::Tier;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Protocol-level decoding errors.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("malformed event: {0}")]
    Json(#[from] serde_json::Error),
}

/// A chat platform member as reported by the bridge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: String,
    #[serde(default)]
    pub display_name: String,
    /// Role names the member currently holds.
    #[serde(default)]
    pub roles: Vec<String>,
}

/// Inbound event from the bridge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// A slash command invocation.
    Command(CommandEvent),
    /// A plain chat message, scanned for templates and text commands.
    Message(MessageEvent),
}

impl Event {
    /// Decode one JSON line.
    pub fn from_line(line: &str) -> Result<Self, ProtocolError> {
        Ok(serde_json::from_str(line)?)
    }

    pub fn id(&self) -> &str {
        match self {
            Self::Command(cmd) => &cmd.id,
            Self::Message(msg) => &msg.id,
        }
    }

    pub fn channel(&self) -> &str {
        match self {
            Self::Command(cmd) => &cmd.channel,
            Self::Message(msg) => &msg.channel,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandEvent {
    pub id: String,
    #[serde(default)]
    pub channel: String,
    pub user: Member,
    /// Command name without prefix (`generate`, `restock`, `stock`, `format`).
    pub name: String,
    /// Free-text argument, when the command takes one.
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageEvent {
    pub id: String,
    #[serde(default)]
    pub channel: String,
    pub user: Member,
    pub content: String,
    /// Set by the bridge for messages the bot itself posted.
    #[serde(default)]
    pub from_self: bool,
}

/// Structured result of handling one event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Outcome {
    /// An account was handed out.
    Generated {
        username: String,
        password: String,
        combo: String,
        tier: Tier,
        remaining_today: u32,
        daily_limit: u32,
        stock_remaining: usize,
        cooldown_secs: u64,
        /// True when the pair came from the random fallback, not the stock.
        fallback: bool,
    },
    DailyLimitReached {
        limit: u32,
        hours: u64,
        minutes: u64,
        /// Premium limits, included only for standard-tier members.
        upgrade: Option<TierLimit>,
    },
    CooldownActive {
        seconds: u64,
        upgrade: Option<TierLimit>,
    },
    StockEmpty,
    PermissionDenied {
        role: String,
    },
    ParseEmpty,
    Restocked {
        added: usize,
        total: usize,
        restocked_by: String,
    },
    StockCount {
        count: usize,
        /// The caller may restock and the stock is empty.
        can_restock: bool,
    },
    /// Credentials reformatted into the compact three-line form.
    Formatted {
        text: String,
        delete_original: bool,
    },
    FormatFailed,
    BadRequest {
        reason: String,
    },
    InternalError {
        code: String,
    },
}

impl Outcome {
    /// Whether the reply should only be shown to the requesting member.
    pub fn is_ephemeral(&self) -> bool {
        !matches!(
            self,
            Self::Generated { .. } | Self::Restocked { .. } | Self::Formatted { .. }
        )
    }
}

/// Outbound reply to the bridge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reply {
    /// Id of the event this answers.
    pub reply_to: String,
    pub channel: String,
    pub ephemeral: bool,
    pub outcome: Outcome,
}

impl Reply {
    pub fn new(event: &Event, outcome: Outcome) -> Self {
        Self {
            reply_to: event.id().to_string(),
            channel: event.channel().to_string(),
            ephemeral: outcome.is_ephemeral(),
            outcome,
        }
    }

    /// Reply to a line that could not be decoded into an event.
    pub fn bad_request(reason: impl Into<String>) -> Self {
        Self {
            reply_to: String::new(),
            channel: String::new(),
            ephemeral: true,
            outcome: Outcome::BadRequest {
                reason: reason.into(),
            },
        }
    }

    /// Encode as one JSON line (without the trailing newline).
    pub fn to_line(&self) -> Result<String, ProtocolError> {
        Ok(serde_json::to_string(self)?)
    }
}
