//! Core configuration types and loading.

use serde::Deserialize;
use std::net::SocketAddr;
use std::path::Path;
use thiserror::Error;

use super::defaults::{
    DEFAULT_METRICS_PORT, default_command_prefix, default_connection_burst, default_max_line_len, default_premium_role,
    default_restock_role,
};
use super::limits::LimitsConfig;
use super::stock::StockConfig;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Bot configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Bot behavior (text command prefix, formatting options).
    #[serde(default)]
    pub bot: BotConfig,
    /// Role names used for tier resolution and restock authorization.
    #[serde(default)]
    pub roles: RolesConfig,
    /// Per-tier cooldown and daily limit.
    #[serde(default)]
    pub limits: LimitsConfig,
    /// Stock storage.
    #[serde(default)]
    pub stock: StockConfig,
    /// Bridge listener.
    pub listen: ListenConfig,
    /// Process-level settings.
    #[serde(default)]
    pub server: ServerConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}

/// Bot behavior configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct BotConfig {
    /// Prefix for text commands such as `!format` (default: "!").
    #[serde(default = "default_command_prefix")]
    pub command_prefix: String,
    /// Ask the bridge to delete a message after its credentials were reformatted.
    #[serde(default)]
    pub auto_delete_formatted: bool,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            command_prefix: default_command_prefix(),
            auto_delete_formatted: false,
        }
    }
}

/// Role names (case-sensitive, as the platform reports them).
#[derive(Debug, Clone, Deserialize)]
pub struct RolesConfig {
    /// Role granting the premium tier (default: "Premium").
    #[serde(default = "default_premium_role")]
    pub premium: String,
    /// Role allowed to restock (default: "Restock").
    #[serde(default = "default_restock_role")]
    pub restock: String,
}

impl Default for RolesConfig {
    fn default() -> Self {
        Self {
            premium: default_premium_role(),
            restock: default_restock_role(),
        }
    }
}

/// Bridge listener configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ListenConfig {
    /// Address the chat bridge connects to.
    pub address: SocketAddr,
    /// Connections accepted per IP before rate limiting kicks in (default: 3).
    #[serde(default = "default_connection_burst")]
    pub connection_burst_per_ip: u32,
    /// Maximum length of one JSON event line in bytes (default: 64 KiB).
    #[serde(default = "default_max_line_len")]
    pub max_line_len: usize,
}

/// Process-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServerConfig {
    /// Prometheus metrics HTTP port (default: 9090, 0 disables).
    pub metrics_port: Option<u16>,
}

impl ServerConfig {
    /// Port the metrics endpoint will use, `0` meaning disabled.
    pub fn effective_metrics_port(&self) -> u16 {
        self.metrics_port.unwrap_or(DEFAULT_METRICS_PORT)
    }
}
