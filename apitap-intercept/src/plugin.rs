//! REST dispatch hooks.
//!
//! `RestInterceptor` wraps an [`Interceptor`] for a concrete host
//! framework: `before_dispatch` runs on the request path and, when the
//! endpoint is selected, returns an [`InFlight`] correlation handle the
//! caller threads through to `after_dispatch`. Requests that are not
//! selected cost one matcher pass and nothing else.

use crate::extract::{CapturedResponse, RestExtractor, format_exception_body};
use crate::interceptor::Interceptor;
use apitap_core::config::ScopeId;
use apitap_core::entry::LogEntry;
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;
use uuid::Uuid;

/// Per-request capture state, created before dispatch and consumed
/// after it. Owning this here keeps the hooks free of shared mutable
/// state, so concurrent requests cannot cross-contaminate entries.
pub struct InFlight {
    entry: LogEntry,
    started: Instant,
    request_id: Uuid,
}

impl InFlight {
    pub fn request_id(&self) -> Uuid {
        self.request_id
    }

    /// Milliseconds since the request-side hook ran.
    pub fn elapsed_ms(&self) -> f64 {
        self.started.elapsed().as_secs_f64() * 1000.0
    }
}

pub struct RestInterceptor<E: RestExtractor> {
    interceptor: Arc<Interceptor>,
    extractor: E,
}

impl<E: RestExtractor> RestInterceptor<E> {
    pub fn new(interceptor: Arc<Interceptor>, extractor: E) -> Self {
        Self {
            interceptor,
            extractor,
        }
    }

    /// Request-side hook. Returns `None` when the endpoint is not
    /// selected for capture, otherwise the handle to pass back into
    /// [`after_dispatch`](Self::after_dispatch).
    pub fn before_dispatch(&self, request: &E::Request, scope: Option<ScopeId>) -> Option<InFlight> {
        let captured = self.extractor.extract_request(request);

        if !self
            .interceptor
            .should_log_endpoint(&captured.endpoint, &captured.method, scope)
        {
            return None;
        }

        let entry = self.interceptor.create_log_entry(&captured, scope);
        let request_id = Uuid::new_v4();
        debug!(
            request_id = %request_id,
            endpoint = %entry.endpoint,
            method = %entry.method,
            "API request captured"
        );

        Some(InFlight {
            entry,
            started: Instant::now(),
            request_id,
        })
    }

    /// Response-side hook. A `None` handle means the request was not
    /// captured and this is a no-op.
    pub async fn after_dispatch(&self, inflight: Option<InFlight>, response: &E::Response) {
        let Some(inflight) = inflight else {
            return;
        };

        let duration_ms = inflight.elapsed_ms();
        let scope = inflight.entry.scope_id;
        let mut captured = self.extractor.extract_response(response);

        if captured.is_exception
            && let Some(detail) = self.extractor.exception_detail(response)
        {
            let developer_mode = self.interceptor.config().is_developer_mode(scope);
            captured.body = Some(format_exception_body(&detail, developer_mode));
        }

        debug!(
            request_id = %inflight.request_id,
            status = captured.status,
            duration_ms,
            "API response captured"
        );
        self.interceptor
            .complete_log_entry(inflight.entry, &captured, duration_ms)
            .await;
    }

    /// Response-side hook for dispatches that never produced a
    /// response. Records the failure as a synthetic exception response.
    pub async fn after_failure(&self, inflight: Option<InFlight>, status: u16, body: String) {
        let Some(inflight) = inflight else {
            return;
        };

        let duration_ms = inflight.elapsed_ms();
        let captured = CapturedResponse {
            status,
            headers: Default::default(),
            body: Some(body),
            is_exception: true,
        };
        self.interceptor
            .complete_log_entry(inflight.entry, &captured, duration_ms)
            .await;
    }
}
