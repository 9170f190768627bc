//! Interception orchestration.
//!
//! One `Interceptor` serves the whole process: it is stateless across
//! requests, holding only the hot-swappable capture config, the pattern
//! matcher, and the store handle. Per-request state lives in the entry
//! values passed through it.
//!
//! Entry lifecycle: `create_log_entry` builds the request-side entry in
//! memory (no storage side effects); `complete_log_entry` fills in the
//! response side and performs the single save. Completion is
//! best-effort — it logs and swallows every failure, because observing
//! a request must never break the request.

use crate::extract::{CapturedRequest, CapturedResponse};
use apitap_core::config::{CaptureConfig, ScopeId};
use apitap_core::entry::LogEntry;
use apitap_core::matcher::EndpointMatcher;
use apitap_core::sanitize;
use apitap_store::store::LogEntryStore;
use arc_swap::ArcSwap;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::error;

pub struct Interceptor {
    config: Arc<ArcSwap<CaptureConfig>>,
    matcher: EndpointMatcher,
    store: Arc<dyn LogEntryStore>,
}

impl Interceptor {
    pub fn new(config: Arc<ArcSwap<CaptureConfig>>, store: Arc<dyn LogEntryStore>) -> Self {
        Self {
            config,
            matcher: EndpointMatcher::new(),
            store,
        }
    }

    /// Current config snapshot.
    pub fn config(&self) -> Arc<CaptureConfig> {
        self.config.load_full()
    }

    /// Whether this endpoint + method is selected for capture under the
    /// given scope.
    pub fn should_log_endpoint(
        &self,
        endpoint: &str,
        method: &str,
        scope: Option<ScopeId>,
    ) -> bool {
        let config = self.config.load();
        if !config.is_enabled(scope) {
            return false;
        }

        let patterns = config.enabled_endpoints(scope);
        if patterns.is_empty() {
            return false;
        }

        patterns
            .iter()
            .any(|pattern| self.matcher.matches(endpoint, method, pattern))
    }

    /// Whether response headers/body are kept for this status code.
    /// An empty configured list keeps everything.
    pub fn should_log_response_code(&self, code: u16, scope: Option<ScopeId>) -> bool {
        let enabled = self.config.load().enabled_response_codes(scope);
        enabled.is_empty() || enabled.iter().any(|c| c == &code.to_string())
    }

    /// Build the request-side entry. No storage side effects.
    pub fn create_log_entry(
        &self,
        request: &CapturedRequest,
        scope: Option<ScopeId>,
    ) -> LogEntry {
        let config = self.config.load();
        let secret_fields = config.secret_fields(scope);

        let mut entry = LogEntry::new(request.endpoint.clone(), request.method.clone());
        entry.scope_id = scope;
        entry.ip_address = request.client_ip.clone();

        // Exact-case key lookup, a compatibility constraint of the
        // stored format; hosts hand over canonically cased header maps.
        if let Some(agent) = request.headers.get("User-Agent") {
            entry.user_agent = Some(text_of(agent));
        }

        if config.should_log_request_headers(scope) {
            let headers = if config.should_sanitize_secrets(scope) {
                sanitize::sanitize_map(&request.headers, &secret_fields)
            } else {
                request.headers.clone()
            };
            entry.request_headers = serialize_headers(&headers);
        }

        if config.should_log_request_body(scope)
            && let Some(ref body) = request.body
        {
            entry.request_body = Some(if config.should_sanitize_secrets(scope) {
                sanitize::sanitize(body, &secret_fields)
            } else {
                body.clone()
            });
        }

        entry
    }

    /// Fill in the response side and persist the entry.
    ///
    /// The response metadata (code, duration, exception flag) is always
    /// recorded. When the status code is outside the enabled list the
    /// entry is still saved, just without response headers/body — a
    /// partial-capture policy, not an error path.
    pub async fn complete_log_entry(
        &self,
        mut entry: LogEntry,
        response: &CapturedResponse,
        duration_ms: f64,
    ) {
        let config = self.config.load();
        let scope = entry.scope_id;

        entry.response_code = Some(response.status);
        entry.duration_ms = Some(duration_ms);
        entry.is_exception = response.is_exception;

        if self.should_log_response_code(response.status, scope) {
            let secret_fields = config.secret_fields(scope);

            if config.should_log_response_headers(scope) {
                let headers = if config.should_sanitize_secrets(scope) {
                    sanitize::sanitize_map(&response.headers, &secret_fields)
                } else {
                    response.headers.clone()
                };
                entry.response_headers = serialize_headers(&headers);
            }

            if config.should_log_response_body(scope)
                && let Some(ref body) = response.body
            {
                entry.response_body = Some(if config.should_sanitize_secrets(scope) {
                    sanitize::sanitize(body, &secret_fields)
                } else {
                    body.clone()
                });
            }
        }

        if let Err(e) = self.store.save(entry).await {
            error!(error = %e, "Failed to save API log entry");
        }
    }
}

fn serialize_headers(headers: &Map<String, Value>) -> Option<String> {
    serde_json::to_string(headers).ok()
}

/// Plain-text form of a header value; list-valued headers use their
/// first element.
fn text_of(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(items) => items.first().map(text_of).unwrap_or_default(),
        other => other.to_string(),
    }
}
