//! Account stock.
//!
//! The stock is a durable pool of undistributed [`CredentialRecord`]s with
//! three operations: take one at random, append many, count. Every backend
//! runs each mutation as one critical section so a record can never be handed
//! out twice and the persisted pool never drifts from what callers observed.
//!
//! Backends:
//! - [`FileStock`]: a text file, one `username:password` per line, rewritten
//!   whole on every mutation
//! - [`SqliteStock`]: an `accounts` table where dispensed rows are marked used

mod file;
pub mod random;
mod sqlite;

pub use file::FileStock;
pub use sqlite::SqliteStock;

use crate::config::{StockBackendKind, StockConfig};
use crate::credential::CredentialRecord;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

/// Stock storage errors.
#[derive(Debug, Error)]
pub enum StockError {
    #[error("stock file error: {0}")]
    Io(#[from] std::io::Error),
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

impl StockError {
    /// Get a static error code string for metrics labeling.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Io(_) => "stock_io",
            Self::Sqlx(_) => "stock_db",
            Self::Migration(_) => "stock_migration",
        }
    }
}

/// Persistence backend for the stock.
#[async_trait]
pub trait StockBackend: Send + Sync {
    /// Remove and return one record chosen uniformly at random.
    async fn take_one(&self) -> Result<Option<CredentialRecord>, StockError>;

    /// Append records after the existing ones. Returns how many were appended.
    async fn add_many(&self, records: &[CredentialRecord]) -> Result<usize, StockError>;

    /// Number of records currently available.
    async fn count(&self) -> Result<usize, StockError>;
}

/// Shared handle to the configured stock backend.
#[derive(Clone)]
pub struct Stock {
    backend: Arc<dyn StockBackend>,
}

impl Stock {
    pub fn new(backend: Arc<dyn StockBackend>) -> Self {
        Self { backend }
    }

    /// Open the backend named in the configuration.
    pub async fn open(config: &StockConfig) -> Result<Self, StockError> {
        let backend: Arc<dyn StockBackend> = match config.backend {
            StockBackendKind::File => {
                info!(path = %config.path, "Using file stock backend");
                Arc::new(FileStock::new(&config.path))
            }
            StockBackendKind::Sqlite => {
                info!(path = %config.path, "Using SQLite stock backend");
                Arc::new(SqliteStock::open(&config.path).await?)
            }
        };
        let stock = Self::new(backend);
        let count = stock.count().await?;
        info!(count, "Stock loaded");
        Ok(stock)
    }

    pub async fn take_one(&self) -> Result<Option<CredentialRecord>, StockError> {
        let record = self.backend.take_one().await?;
        if record.is_some() {
            crate::metrics::record_dispensed();
        }
        Ok(record)
    }

    pub async fn add_many(&self, records: &[CredentialRecord]) -> Result<usize, StockError> {
        let added = self.backend.add_many(records).await?;
        crate::metrics::record_restocked(added);
        Ok(added)
    }

    pub async fn count(&self) -> Result<usize, StockError> {
        let count = self.backend.count().await?;
        crate::metrics::set_stock_size(count);
        Ok(count)
    }
}
