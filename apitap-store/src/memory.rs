//! In-memory log entry store.
//!
//! Backs tests and single-process deployments. The table is a DashMap
//! keyed by entity id with a monotonically increasing id sequence, so
//! id order tracks creation order.

use crate::store::{ListCriteria, LogEntryStore, Page};
use apitap_core::entry::LogEntry;
use apitap_core::error::ApitapError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

#[derive(Clone, Default)]
pub struct MemoryStore {
    entries: Arc<DashMap<u64, LogEntry>>,
    next_id: Arc<AtomicU64>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Ids of entries passing `filter`, oldest first, capped at `limit`.
    fn collect_ids(&self, limit: usize, filter: impl Fn(&LogEntry) -> bool) -> Vec<u64> {
        let mut ids: Vec<u64> = self
            .entries
            .iter()
            .filter(|e| filter(e.value()))
            .map(|e| *e.key())
            .collect();
        ids.sort_unstable();
        ids.truncate(limit);
        ids
    }
}

#[async_trait]
impl LogEntryStore for MemoryStore {
    async fn save(&self, mut entry: LogEntry) -> Result<LogEntry, ApitapError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        entry.id = Some(id);
        self.entries.insert(id, entry.clone());
        debug!(id = id, endpoint = %entry.endpoint, "Log entry saved");
        Ok(entry)
    }

    async fn get_by_id(&self, id: u64) -> Result<LogEntry, ApitapError> {
        self.entries
            .get(&id)
            .map(|e| e.value().clone())
            .ok_or(ApitapError::EntryNotFound(id))
    }

    async fn delete(&self, id: u64) -> Result<(), ApitapError> {
        self.entries
            .remove(&id)
            .map(|_| ())
            .ok_or(ApitapError::EntryNotFound(id))
    }

    async fn list(&self, criteria: &ListCriteria) -> Result<Page<LogEntry>, ApitapError> {
        let mut matched: Vec<LogEntry> = self
            .entries
            .iter()
            .filter(|e| criteria.accepts(e.value()))
            .map(|e| e.value().clone())
            .collect();
        // Newest first
        matched.sort_unstable_by(|a, b| b.id.cmp(&a.id));

        let total = matched.len() as u64;
        let size = criteria.page_size();
        let offset = (criteria.page() - 1) * size;
        let items = matched.into_iter().skip(offset).take(size).collect();

        Ok(Page { items, total })
    }

    async fn count_all(&self) -> Result<u64, ApitapError> {
        Ok(self.entries.len() as u64)
    }

    async fn count_older_than(&self, cutoff: DateTime<Utc>) -> Result<u64, ApitapError> {
        Ok(self
            .entries
            .iter()
            .filter(|e| e.value().created_at < cutoff)
            .count() as u64)
    }

    async fn ids_older_than(
        &self,
        cutoff: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<u64>, ApitapError> {
        Ok(self.collect_ids(limit, |e| e.created_at < cutoff))
    }

    async fn oldest_ids(&self, limit: usize) -> Result<Vec<u64>, ApitapError> {
        Ok(self.collect_ids(limit, |_| true))
    }

    async fn delete_by_ids(&self, ids: &[u64]) -> Result<u64, ApitapError> {
        let mut affected = 0u64;
        for id in ids {
            if self.entries.remove(id).is_some() {
                affected += 1;
            }
        }
        Ok(affected)
    }
}
