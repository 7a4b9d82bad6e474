//! Unified error handling for accgen.
//!
//! This module provides the request-level error hierarchy, with automatic
//! conversions, outcome generation for the bridge, and metric labeling.

use crate::config::TierLimit;
use crate::network::protocol::Outcome;
use crate::stock::StockError;
use thiserror::Error;

// ============================================================================
// Denials (user-facing, recoverable)
// ============================================================================

/// Reasons a request is refused. None of these are faults.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Denial {
    #[error("daily limit of {limit} reached, resets in {hours}h {minutes}m")]
    QuotaExceeded {
        limit: u32,
        hours: u64,
        minutes: u64,
        upgrade: Option<TierLimit>,
    },

    #[error("cooldown active, {seconds}s remaining")]
    CooldownActive {
        seconds: u64,
        upgrade: Option<TierLimit>,
    },

    #[error("stock is empty")]
    StockEmpty,

    #[error("missing required role: {role}")]
    PermissionDenied { role: String },

    #[error("no credentials found in input")]
    ParseEmpty,
}

impl Denial {
    /// Get a static error code string for metrics labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::QuotaExceeded { .. } => "quota_exceeded",
            Self::CooldownActive { .. } => "cooldown_active",
            Self::StockEmpty => "stock_empty",
            Self::PermissionDenied { .. } => "permission_denied",
            Self::ParseEmpty => "parse_empty",
        }
    }

    /// Convert to the outcome reported to the bridge.
    pub fn to_outcome(&self) -> Outcome {
        match self {
            Self::QuotaExceeded {
                limit,
                hours,
                minutes,
                upgrade,
            } => Outcome::DailyLimitReached {
                limit: *limit,
                hours: *hours,
                minutes: *minutes,
                upgrade: *upgrade,
            },
            Self::CooldownActive { seconds, upgrade } => Outcome::CooldownActive {
                seconds: *seconds,
                upgrade: *upgrade,
            },
            Self::StockEmpty => Outcome::StockEmpty,
            Self::PermissionDenied { role } => Outcome::PermissionDenied { role: role.clone() },
            Self::ParseEmpty => Outcome::ParseEmpty,
        }
    }
}

// ============================================================================
// Handler Errors (command processing)
// ============================================================================

/// Errors that can occur during event handling.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error(transparent)]
    Denied(#[from] Denial),

    #[error("missing argument: {0}")]
    NeedMoreParams(&'static str),

    #[error("unknown command: {0}")]
    UnknownCommand(String),

    #[error("stock error: {0}")]
    Stock(#[from] StockError),
}

impl HandlerError {
    /// Get a static error code string for metrics labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Denied(denial) => denial.error_code(),
            Self::NeedMoreParams(_) => "need_more_params",
            Self::UnknownCommand(_) => "unknown_command",
            Self::Stock(e) => e.error_code(),
        }
    }

    /// Convert to the outcome reported to the bridge.
    ///
    /// Internal failures only expose their static code, never the message.
    pub fn to_outcome(&self) -> Outcome {
        match self {
            Self::Denied(denial) => denial.to_outcome(),
            Self::NeedMoreParams(_) | Self::UnknownCommand(_) => Outcome::BadRequest {
                reason: self.to_string(),
            },
            Self::Stock(e) => Outcome::InternalError {
                code: e.error_code().to_string(),
            },
        }
    }
}

/// Result type for event handlers.
pub type HandlerResult = Result<Outcome, HandlerError>;
