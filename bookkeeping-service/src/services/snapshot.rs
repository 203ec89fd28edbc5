//! JSON snapshot persistence for the ledger book.
//!
//! The whole book (configuration, payment history with derived allocations,
//! totals) round-trips losslessly through one JSON document. Writes go to a
//! temp file first and are renamed into place, so a failed write never
//! leaves a torn snapshot behind.

use std::path::PathBuf;

use service_core::error::AppError;
use tracing::{info, instrument};

use crate::services::ledger::LedgerBook;
use crate::services::metrics::SNAPSHOT_WRITE_DURATION;

#[derive(Clone, Debug)]
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Load the persisted book, or `None` when no snapshot exists yet.
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub async fn load(&self) -> Result<Option<LedgerBook>, AppError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => {
                let book: LedgerBook = serde_json::from_slice(&bytes)?;
                info!(payments = book.payments.len(), "Ledger snapshot loaded");
                Ok(Some(book))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Persist the book atomically (temp file + rename).
    #[instrument(skip(self, book), fields(path = %self.path.display()))]
    pub async fn save(&self, book: &LedgerBook) -> Result<(), AppError> {
        let timer = SNAPSHOT_WRITE_DURATION.start_timer();

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let bytes = serde_json::to_vec_pretty(book)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, &bytes).await?;
        tokio::fs::rename(&tmp, &self.path).await?;

        timer.observe_duration();
        Ok(())
    }
}
