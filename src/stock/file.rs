//! Line-oriented file stock.

use super::{StockBackend, StockError};
use crate::credential::CredentialRecord;
use async_trait::async_trait;
use rand::Rng;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::debug;

/// Stock kept in a UTF-8 text file, one `username:password` per line.
///
/// Every operation reloads the file, so external edits between requests are
/// picked up. Writes go to a sibling temp file that is renamed over the
/// original, and the whole load-mutate-save sequence holds `lock`.
pub struct FileStock {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStock {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the pool. A missing file is an empty pool.
    async fn load(&self) -> Result<Vec<CredentialRecord>, StockError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "Stock file missing, treating as empty");
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };

        Ok(content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .filter_map(CredentialRecord::from_line)
            .collect())
    }

    async fn save(&self, records: &[CredentialRecord]) -> Result<(), StockError> {
        let body = records
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n");

        let tmp = self.temp_path();
        tokio::fs::write(&tmp, body).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "stock".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl StockBackend for FileStock {
    async fn take_one(&self) -> Result<Option<CredentialRecord>, StockError> {
        let _guard = self.lock.lock().await;
        let mut records = self.load().await?;
        if records.is_empty() {
            return Ok(None);
        }

        let index = rand::thread_rng().gen_range(0..records.len());
        let record = records.remove(index);
        self.save(&records).await?;

        debug!(remaining = records.len(), "Record taken from stock file");
        Ok(Some(record))
    }

    async fn add_many(&self, records: &[CredentialRecord]) -> Result<usize, StockError> {
        let _guard = self.lock.lock().await;
        let mut existing = self.load().await?;
        existing.extend_from_slice(records);
        self.save(&existing).await?;
        Ok(records.len())
    }

    async fn count(&self) -> Result<usize, StockError> {
        let _guard = self.lock.lock().await;
        Ok(self.load().await?.len())
    }
}
