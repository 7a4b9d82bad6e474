//! SQLite-backed stock.
//!
//! Rows are never deleted: a dispensed account is marked `used = 1` so the
//! table doubles as a dispensation log. Only unused rows count as stock.

use super::{StockBackend, StockError};
use crate::credential::CredentialRecord;
use async_trait::async_trait;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info};

static MEMDB_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Stock kept in an SQLite `accounts` table.
pub struct SqliteStock {
    pool: SqlitePool,
    /// Serializes take/add within this process.
    lock: Mutex<()>,
}

impl SqliteStock {
    /// Connection acquire timeout.
    const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

    /// Maximum time a connection can remain idle before being closed.
    const IDLE_TIMEOUT: Duration = Duration::from_secs(60);

    /// Open (or create) the database and apply migrations.
    ///
    /// `":memory:"` opens a private in-memory database.
    pub async fn open(path: &str) -> Result<Self, StockError> {
        let pool = if path == ":memory:" {
            // A uniquely named shared-cache database per call, so parallel
            // tests never see each other's rows.
            let id = MEMDB_COUNTER.fetch_add(1, Ordering::Relaxed);
            let memdb_uri = format!(
                "file:accgen-memdb-{}-{}?mode=memory&cache=shared",
                std::process::id(),
                id
            );

            let options = SqliteConnectOptions::new()
                .filename(&memdb_uri)
                .shared_cache(true)
                .create_if_missing(true);

            SqlitePoolOptions::new()
                .max_connections(1)
                .acquire_timeout(Self::ACQUIRE_TIMEOUT)
                .idle_timeout(Some(Self::IDLE_TIMEOUT))
                .connect_with(options)
                .await?
        } else {
            if let Some(parent) = Path::new(path).parent()
                && !parent.as_os_str().is_empty()
                && let Err(e) = std::fs::create_dir_all(parent)
            {
                tracing::warn!(path = %parent.display(), error = %e, "Failed to create database directory");
            }

            let options = SqliteConnectOptions::new()
                .filename(path)
                .create_if_missing(true);

            SqlitePoolOptions::new()
                .max_connections(5)
                .acquire_timeout(Self::ACQUIRE_TIMEOUT)
                .idle_timeout(Some(Self::IDLE_TIMEOUT))
                .connect_with(options)
                .await?
        };

        info!(path = %path, "Stock database connected");

        sqlx::migrate!("./migrations").run(&pool).await?;

        sqlx::query("PRAGMA journal_mode=WAL")
            .execute(&pool)
            .await?;

        Ok(Self {
            pool,
            lock: Mutex::new(()),
        })
    }
}

#[async_trait]
impl StockBackend for SqliteStock {
    async fn take_one(&self) -> Result<Option<CredentialRecord>, StockError> {
        let _guard = self.lock.lock().await;
        let mut tx = self.pool.begin().await?;

        let row: Option<(i64, String, String)> = sqlx::query_as(
            "SELECT id, username, password FROM accounts WHERE used = 0 ORDER BY RANDOM() LIMIT 1",
        )
        .fetch_optional(&mut *tx)
        .await?;

        let Some((id, username, password)) = row else {
            tx.rollback().await?;
            return Ok(None);
        };

        let now = chrono::Utc::now().timestamp();
        let result = sqlx::query("UPDATE accounts SET used = 1, used_at = ? WHERE id = ? AND used = 0")
            .bind(now)
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() != 1 {
            // Another writer got there first.
            tx.rollback().await?;
            return Ok(None);
        }

        tx.commit().await?;
        debug!(id, "Record taken from stock database");
        Ok(Some(CredentialRecord::new(username, password)))
    }

    async fn add_many(&self, records: &[CredentialRecord]) -> Result<usize, StockError> {
        let _guard = self.lock.lock().await;
        let now = chrono::Utc::now().timestamp();
        let mut tx = self.pool.begin().await?;

        for record in records {
            sqlx::query("INSERT INTO accounts (username, password, created_at) VALUES (?, ?, ?)")
                .bind(&record.username)
                .bind(&record.password)
                .bind(now)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(records.len())
    }

    async fn count(&self) -> Result<usize, StockError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM accounts WHERE used = 0")
            .fetch_one(&self.pool)
            .await?;
        Ok(count as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn rec(u: &str, p: &str) -> CredentialRecord {
        CredentialRecord::new(u, p)
    }

    async fn used_rows(stock: &SqliteStock) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM accounts WHERE used = 1")
            .fetch_one(&stock.pool)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_empty_database() {
        let stock = SqliteStock::open(":memory:").await.unwrap();
        assert_eq!(stock.count().await.unwrap(), 0);
        assert!(stock.take_one().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_take_marks_used() {
        let stock = SqliteStock::open(":memory:").await.unwrap();
        assert_eq!(stock.add_many(&[rec("alice", "pw")]).await.unwrap(), 1);
        assert_eq!(stock.take_one().await.unwrap(), Some(rec("alice", "pw")));
        assert_eq!(stock.count().await.unwrap(), 0);
        assert_eq!(used_rows(&stock).await, 1);
        assert!(stock.take_one().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_each_row_dispensed_once() {
        let stock = SqliteStock::open(":memory:").await.unwrap();
        let records: Vec<_> = (0..12).map(|i| rec(&format!("u{i}"), "pw")).collect();
        stock.add_many(&records).await.unwrap();

        let mut seen = HashSet::new();
        while let Some(record) = stock.take_one().await.unwrap() {
            assert!(seen.insert(record));
        }
        assert_eq!(seen.len(), 12);
    }

    #[tokio::test]
    async fn test_file_database_persists() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("stock.db");
        let path = path.to_str().unwrap();

        {
            let stock = SqliteStock::open(path).await.unwrap();
            stock.add_many(&[rec("a", "1"), rec("b", "2")]).await.unwrap();
            stock.take_one().await.unwrap();
        }

        let reopened = SqliteStock::open(path).await.unwrap();
        assert_eq!(reopened.count().await.unwrap(), 1);
    }
}
