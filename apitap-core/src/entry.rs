//! Persisted record of one captured API call.
//!
//! An entry is created in memory at request start, completed with
//! response metadata at request end, and written to the store exactly
//! once. After that single save it is immutable; rows disappear only
//! through the retention cleaner or an explicit administrative delete.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single captured API transaction.
///
/// `endpoint` and `method` are fixed at creation. The response-side
/// fields (`response_code`, `duration_ms`, `is_exception`, and the
/// optional response headers/body) are written once at completion.
/// Header maps are stored as serialized JSON text blobs, matching the
/// relational row layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    /// Storage identifier, assigned by the store on save.
    pub id: Option<u64>,
    /// Request path as seen by the gateway (query string stripped by the
    /// extractor, not here).
    pub endpoint: String,
    /// HTTP method as received. Comparisons are case-insensitive; the
    /// stored value keeps the original casing.
    pub method: String,
    /// Serialized request header map (key → value or list of values).
    pub request_headers: Option<String>,
    pub request_body: Option<String>,
    /// Serialized response header map, same shape as request headers.
    pub response_headers: Option<String>,
    pub response_body: Option<String>,
    /// HTTP status returned to the client. Set only on completion.
    pub response_code: Option<u16>,
    /// End-to-end handler latency in milliseconds. Set only on completion.
    pub duration_ms: Option<f64>,
    /// True when the dispatch ended in an exception response.
    pub is_exception: bool,
    /// Tenant/scope key the request executed under.
    pub scope_id: Option<u32>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl LogEntry {
    /// Create a fresh entry at request start. Only the request identity
    /// is known here; everything else is filled in by the interceptor.
    pub fn new(endpoint: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            id: None,
            endpoint: endpoint.into(),
            method: method.into(),
            request_headers: None,
            request_body: None,
            response_headers: None,
            response_body: None,
            response_code: None,
            duration_ms: None,
            is_exception: false,
            scope_id: None,
            ip_address: None,
            user_agent: None,
            created_at: Utc::now(),
        }
    }

    /// Whether the entry has been through completion.
    pub fn is_completed(&self) -> bool {
        self.response_code.is_some()
    }
}
