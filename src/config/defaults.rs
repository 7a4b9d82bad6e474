//! Default value functions for configuration.
//!
//! Separated into its own module for clarity and reuse.

// =============================================================================
// Bot Defaults
// =============================================================================

pub fn default_command_prefix() -> String {
    "!".to_string()
}

// =============================================================================
// Role Defaults
// =============================================================================

pub fn default_premium_role() -> String {
    "Premium".to_string()
}

pub fn default_restock_role() -> String {
    "Restock".to_string()
}

// =============================================================================
// Tier Limit Defaults
// =============================================================================

pub fn default_premium_cooldown() -> u64 {
    30
}

pub fn default_premium_daily_limit() -> u32 {
    50
}

pub fn default_standard_cooldown() -> u64 {
    3600
}

pub fn default_standard_daily_limit() -> u32 {
    10
}

// =============================================================================
// Stock Defaults
// =============================================================================

pub fn default_stock_path() -> String {
    "accounts.txt".to_string()
}

// =============================================================================
// Listener Defaults
// =============================================================================

pub fn default_connection_burst() -> u32 {
    3
}

pub fn default_max_line_len() -> usize {
    64 * 1024
}

// =============================================================================
// Server Defaults
// =============================================================================

/// Metrics port used when `server.metrics_port` is not set.
pub const DEFAULT_METRICS_PORT: u16 = 9090;
