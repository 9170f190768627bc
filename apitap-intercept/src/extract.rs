//! Host-boundary extraction contract.
//!
//! The gateway host owns its request/response types; the pipeline only
//! sees the flattened [`CapturedRequest`] / [`CapturedResponse`] value
//! bags produced by a [`RestExtractor`] implementation. Header maps use
//! `serde_json` values so list-valued headers survive as-is.

use serde_json::{Map, Value};

/// Request-side data captured before dispatch.
#[derive(Debug, Clone, Default)]
pub struct CapturedRequest {
    /// Request path, query string already stripped by the host.
    pub endpoint: String,
    pub method: String,
    /// Header map: key → string value or list of string values.
    pub headers: Map<String, Value>,
    pub body: Option<String>,
    pub client_ip: Option<String>,
}

impl CapturedRequest {
    /// Get a header value (case-insensitive lookup).
    pub fn get_header(&self, name: &str) -> Option<&Value> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v)
    }
}

/// Response-side data captured after dispatch.
#[derive(Debug, Clone, Default)]
pub struct CapturedResponse {
    pub status: u16,
    pub headers: Map<String, Value>,
    pub body: Option<String>,
    /// True when the host resolved the dispatch to an exception
    /// response.
    pub is_exception: bool,
}

/// Masked detail of an exception response.
///
/// The host's error processor masks internal messages before handing
/// them over; the raw stack trace is only rendered into the stored body
/// in developer mode.
#[derive(Debug, Clone, Default)]
pub struct ErrorDetail {
    pub message: String,
    pub code: Option<i64>,
    /// Individual validation errors: (message, parameters).
    pub errors: Vec<(String, Vec<Value>)>,
    pub parameters: Option<Value>,
    pub trace: Option<String>,
}

/// Adapter from the host's request/response objects to captured values.
pub trait RestExtractor: Send + Sync {
    type Request;
    type Response;

    fn extract_request(&self, request: &Self::Request) -> CapturedRequest;

    fn extract_response(&self, response: &Self::Response) -> CapturedResponse;

    /// Masked exception detail, when the response carries one.
    fn exception_detail(&self, response: &Self::Response) -> Option<ErrorDetail>;
}

/// Extractor for hosts that already hand over captured values.
#[derive(Debug, Default, Clone, Copy)]
pub struct PassthroughExtractor;

impl RestExtractor for PassthroughExtractor {
    type Request = CapturedRequest;
    type Response = CapturedResponse;

    fn extract_request(&self, request: &CapturedRequest) -> CapturedRequest {
        request.clone()
    }

    fn extract_response(&self, response: &CapturedResponse) -> CapturedResponse {
        response.clone()
    }

    fn exception_detail(&self, _response: &CapturedResponse) -> Option<ErrorDetail> {
        None
    }
}

/// Render an exception detail as the JSON body stored on the entry.
///
/// Empty parts are omitted; the trace appears only in developer mode.
pub fn format_exception_body(detail: &ErrorDetail, developer_mode: bool) -> String {
    let mut body = Map::new();
    body.insert("message".into(), Value::String(detail.message.clone()));

    if !detail.errors.is_empty() {
        let errors: Vec<Value> = detail
            .errors
            .iter()
            .map(|(message, parameters)| {
                let mut err = Map::new();
                err.insert("message".into(), Value::String(message.clone()));
                err.insert("parameters".into(), Value::Array(parameters.clone()));
                Value::Object(err)
            })
            .collect();
        body.insert("errors".into(), Value::Array(errors));
    }

    if let Some(code) = detail.code {
        body.insert("code".into(), Value::Number(code.into()));
    }

    if let Some(ref parameters) = detail.parameters {
        body.insert("parameters".into(), parameters.clone());
    }

    if developer_mode && let Some(ref trace) = detail.trace {
        body.insert("trace".into(), Value::String(trace.clone()));
    }

    serde_json::to_string(&Value::Object(body)).unwrap_or_else(|_| "{}".to_string())
}
