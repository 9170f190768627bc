//! Absolute-URL reconstruction for stored endpoints.
//!
//! Entries persist the relative request path. When a full URL is needed
//! (export, replay tooling), it is rebuilt from the captured request
//! headers — `Host` plus `X-Forwarded-Proto` — and falls back to the
//! per-scope base URL from configuration.

use crate::config::{CaptureConfig, ScopeId};
use serde_json::Value;

/// Resolve a possibly-relative endpoint to an absolute URL.
///
/// Resolution ladder:
/// 1. an already-absolute endpoint passes through unchanged;
/// 2. a `Host` header in the stored request-headers JSON, with the
///    scheme taken from `X-Forwarded-Proto` (`http` only when the proto
///    is exactly `http`, otherwise `https`);
/// 3. the scope's configured base URL;
/// 4. the endpoint unchanged.
pub fn resolve(
    endpoint: &str,
    request_headers_json: Option<&str>,
    scope: Option<ScopeId>,
    config: &CaptureConfig,
) -> String {
    if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
        return endpoint.to_string();
    }

    let host = header_value(request_headers_json, "host");
    if !host.is_empty() {
        let proto = header_value(request_headers_json, "x-forwarded-proto");
        let scheme = if proto.eq_ignore_ascii_case("http") {
            "http"
        } else {
            "https"
        };
        return format!("{scheme}://{host}/{}", endpoint.trim_start_matches('/'));
    }

    match config.base_url(scope) {
        Some(base) => format!(
            "{}/{}",
            base.trim_end_matches('/'),
            endpoint.trim_start_matches('/')
        ),
        None => endpoint.to_string(),
    }
}

/// Case-insensitive lookup in a serialized header map. List-valued
/// headers yield their first element. Unparseable JSON reads as absent.
fn header_value(headers_json: Option<&str>, name: &str) -> String {
    let Some(json) = headers_json else {
        return String::new();
    };
    let Ok(Value::Object(headers)) = serde_json::from_str::<Value>(json) else {
        return String::new();
    };

    for (key, value) in &headers {
        if key.eq_ignore_ascii_case(name) {
            return match value {
                Value::String(s) => s.clone(),
                Value::Array(items) => items
                    .first()
                    .map(|v| match v {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                    .unwrap_or_default(),
                other => other.to_string(),
            };
        }
    }

    String::new()
}
