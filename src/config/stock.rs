//! Stock storage configuration.

use serde::Deserialize;

use super::defaults::default_stock_path;

/// Which persistence backend holds the stock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StockBackendKind {
    /// Plain text file, one `username:password` per line.
    #[default]
    File,
    /// SQLite database with an `accounts` table.
    Sqlite,
}

/// Stock configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StockConfig {
    #[serde(default)]
    pub backend: StockBackendKind,
    /// Stock file path, or SQLite database path (`:memory:` allowed).
    #[serde(default = "default_stock_path")]
    pub path: String,
    /// Hand out a freshly generated random pair when the stock is empty.
    #[serde(default)]
    pub random_fallback: bool,
}

impl Default for StockConfig {
    fn default() -> Self {
        Self {
            backend: StockBackendKind::default(),
            path: default_stock_path(),
            random_fallback: false,
        }
    }
}
