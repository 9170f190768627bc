//! Repository boundary for persisted log entries.
//!
//! The interceptor and cleaner depend on this trait only; the concrete
//! backend (in-memory table, relational database) is chosen by the
//! host. All methods are async because the backend is the one place in
//! the pipeline that performs I/O.

use apitap_core::config::ScopeId;
use apitap_core::entry::LogEntry;
use apitap_core::error::ApitapError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Filter and pagination criteria for entry listings.
#[derive(Debug, Clone, Default)]
pub struct ListCriteria {
    pub scope_id: Option<ScopeId>,
    /// Exact method match, case-insensitive.
    pub method: Option<String>,
    /// Substring match on the endpoint path.
    pub endpoint_contains: Option<String>,
    pub response_code: Option<u16>,
    pub is_exception: Option<bool>,
    pub created_from: Option<DateTime<Utc>>,
    pub created_to: Option<DateTime<Utc>>,
    /// 1-based page number. 0 reads as 1.
    pub page: usize,
    /// Items per page. 0 falls back to [`DEFAULT_PAGE_SIZE`].
    pub page_size: usize,
}

pub const DEFAULT_PAGE_SIZE: usize = 20;

impl ListCriteria {
    pub fn page(&self) -> usize {
        self.page.max(1)
    }

    pub fn page_size(&self) -> usize {
        if self.page_size == 0 {
            DEFAULT_PAGE_SIZE
        } else {
            self.page_size
        }
    }

    /// Whether an entry passes every set filter.
    pub fn accepts(&self, entry: &LogEntry) -> bool {
        if let Some(scope) = self.scope_id
            && entry.scope_id != Some(scope)
        {
            return false;
        }
        if let Some(ref method) = self.method
            && !entry.method.eq_ignore_ascii_case(method)
        {
            return false;
        }
        if let Some(ref needle) = self.endpoint_contains
            && !entry.endpoint.contains(needle.as_str())
        {
            return false;
        }
        if let Some(code) = self.response_code
            && entry.response_code != Some(code)
        {
            return false;
        }
        if let Some(is_exception) = self.is_exception
            && entry.is_exception != is_exception
        {
            return false;
        }
        if let Some(from) = self.created_from
            && entry.created_at < from
        {
            return false;
        }
        if let Some(to) = self.created_to
            && entry.created_at >= to
        {
            return false;
        }
        true
    }
}

/// One page of listing results.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Total matches across all pages.
    pub total: u64,
}

/// Storage backend for log entries.
///
/// `save` assigns the entity id; a saved entry is never updated, only
/// deleted. The `*_older_than` / `oldest_ids` / `delete_by_ids` surface
/// exists for the batched retention sweep, which works directly against
/// storage rather than entry-at-a-time.
#[async_trait]
pub trait LogEntryStore: Send + Sync {
    /// Persist a new entry, returning it with its assigned id.
    async fn save(&self, entry: LogEntry) -> Result<LogEntry, ApitapError>;

    /// Fetch an entry; `EntryNotFound` when the id does not exist.
    async fn get_by_id(&self, id: u64) -> Result<LogEntry, ApitapError>;

    /// Delete one entry; `EntryNotFound` when the id does not exist.
    async fn delete(&self, id: u64) -> Result<(), ApitapError>;

    /// Newest-first listing under the given criteria.
    async fn list(&self, criteria: &ListCriteria) -> Result<Page<LogEntry>, ApitapError>;

    async fn count_all(&self) -> Result<u64, ApitapError>;

    async fn count_older_than(&self, cutoff: DateTime<Utc>) -> Result<u64, ApitapError>;

    /// Up to `limit` ids of entries created strictly before `cutoff`.
    async fn ids_older_than(
        &self,
        cutoff: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<u64>, ApitapError>;

    /// Up to `limit` ids in oldest-first order, unconditionally.
    async fn oldest_ids(&self, limit: usize) -> Result<Vec<u64>, ApitapError>;

    /// Delete the given ids, returning how many rows were affected.
    /// Missing ids are not an error; they count as zero rows.
    async fn delete_by_ids(&self, ids: &[u64]) -> Result<u64, ApitapError>;
}
