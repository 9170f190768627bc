//! Batched retention sweep over stored log entries.
//!
//! Deletion happens in fixed-size id batches so a large backlog never
//! holds a long-running delete against the table. Every operation is
//! best-effort: failures are logged and reported as zero deletions,
//! and the next scheduled run picks up whatever is left.

use crate::store::LogEntryStore;
use apitap_core::config::CaptureConfig;
use apitap_core::error::ApitapError;
use arc_swap::ArcSwap;
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tracing::{debug, error, info};

/// Rows deleted per batch.
const BATCH_SIZE: usize = 1000;

/// Deletes expired log entries under the configured retention policy.
pub struct Cleaner {
    config: Arc<ArcSwap<CaptureConfig>>,
    store: Arc<dyn LogEntryStore>,
}

impl Cleaner {
    pub fn new(config: Arc<ArcSwap<CaptureConfig>>, store: Arc<dyn LogEntryStore>) -> Self {
        Self { config, store }
    }

    /// Sweep entries past the configured retention window.
    ///
    /// Returns the number of rows deleted; 0 when cleanup is disabled,
    /// retention is non-positive, or the sweep failed.
    pub async fn clean_old_logs(&self) -> u64 {
        let config = self.config.load();
        if !config.is_cleanup_enabled(None) {
            return 0;
        }

        let retention_days = config.retention_days(None);
        if retention_days <= 0 {
            return 0;
        }

        self.clean_logs_older_than(retention_days).await
    }

    /// Delete all entries created more than `days` days ago.
    pub async fn clean_logs_older_than(&self, days: i64) -> u64 {
        let cutoff = Utc::now() - Duration::days(days);
        match self.delete_older_than(cutoff).await {
            Ok(0) => 0,
            Ok(deleted) => {
                info!(deleted = deleted, days = days, "Deleted old API log entries");
                deleted
            }
            Err(e) => {
                error!(error = %e, "Failed to clean old API logs");
                0
            }
        }
    }

    /// Delete every entry regardless of age.
    pub async fn clean_all_logs(&self) -> u64 {
        match self.delete_all().await {
            Ok(0) => 0,
            Ok(deleted) => {
                info!(deleted = deleted, "Deleted all API log entries");
                deleted
            }
            Err(e) => {
                error!(error = %e, "Failed to clean all API logs");
                0
            }
        }
    }

    async fn delete_older_than(&self, cutoff: DateTime<Utc>) -> Result<u64, ApitapError> {
        let total = self.store.count_older_than(cutoff).await?;
        if total == 0 {
            return Ok(0);
        }

        let mut deleted = 0u64;
        while deleted < total {
            let ids = self.store.ids_older_than(cutoff, BATCH_SIZE).await?;
            let affected = self.store.delete_by_ids(&ids).await?;

            // Zero affected rows means storage moved underneath us;
            // stop rather than spin.
            if affected == 0 {
                break;
            }

            deleted += affected;
            debug!(
                affected = affected,
                deleted = deleted,
                total = total,
                "Deleted batch of expired entries"
            );
        }

        Ok(deleted)
    }

    async fn delete_all(&self) -> Result<u64, ApitapError> {
        let total = self.store.count_all().await?;
        if total == 0 {
            return Ok(0);
        }

        let mut deleted = 0u64;
        while deleted < total {
            let ids = self.store.oldest_ids(BATCH_SIZE).await?;
            let affected = self.store.delete_by_ids(&ids).await?;

            if affected == 0 {
                break;
            }

            deleted += affected;
            debug!(
                affected = affected,
                deleted = deleted,
                total = total,
                "Deleted batch of entries"
            );
        }

        Ok(deleted)
    }
}
