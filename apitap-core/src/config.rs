use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Tenant/scope key. Config values can vary per scope; entries record
/// the scope they were captured under.
pub type ScopeId = u32;

/// Secret-field tokens applied when none are configured.
pub const DEFAULT_SECRET_FIELDS: &[&str] = &[
    "password",
    "token",
    "authorization",
    "api_key",
    "apikey",
    "secret",
    "access_token",
    "refresh_token",
    "private_key",
    "client_secret",
    "card_number",
    "cvv",
    "ssn",
];

/// Capture settings, global defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureSettings {
    /// Master switch. Nothing is captured while this is off.
    #[serde(default)]
    pub enabled: bool,
    /// Endpoint patterns (`METHOD|/path`) eligible for capture.
    /// Empty means capture nothing.
    #[serde(default)]
    pub endpoints: Vec<String>,
    /// Response codes (as numeric strings) whose bodies/headers are
    /// kept. Empty means all codes.
    #[serde(default)]
    pub response_codes: Vec<String>,
    #[serde(default = "default_true")]
    pub log_request_headers: bool,
    #[serde(default = "default_true")]
    pub log_request_body: bool,
    #[serde(default = "default_true")]
    pub log_response_headers: bool,
    #[serde(default = "default_true")]
    pub log_response_body: bool,
    #[serde(default = "default_true")]
    pub sanitize_secrets: bool,
    /// Secret-field tokens. Empty falls back to
    /// [`DEFAULT_SECRET_FIELDS`].
    #[serde(default)]
    pub secret_fields: Vec<String>,
    /// Entries older than this many days are swept. 0 disables the
    /// retention sweep even when cleanup is enabled.
    #[serde(default = "default_retention_days")]
    pub retention_days: i64,
    #[serde(default = "default_true")]
    pub cleanup_enabled: bool,
    /// Base URL used by the endpoint URL resolver when the stored
    /// headers carry no Host.
    #[serde(default)]
    pub base_url: Option<String>,
    /// Developer mode includes stack traces in captured exception
    /// bodies.
    #[serde(default)]
    pub developer_mode: bool,
}

/// Per-scope overrides. Unset fields fall back to the global settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScopeOverrides {
    pub enabled: Option<bool>,
    pub endpoints: Option<Vec<String>>,
    pub response_codes: Option<Vec<String>>,
    pub log_request_headers: Option<bool>,
    pub log_request_body: Option<bool>,
    pub log_response_headers: Option<bool>,
    pub log_response_body: Option<bool>,
    pub sanitize_secrets: Option<bool>,
    pub secret_fields: Option<Vec<String>>,
    pub retention_days: Option<i64>,
    pub cleanup_enabled: Option<bool>,
    pub base_url: Option<String>,
    pub developer_mode: Option<bool>,
}

/// Top-level capture configuration: global settings plus scope
/// overrides. All lookups take an optional scope key and resolve
/// per-field.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CaptureConfig {
    #[serde(default)]
    pub global: CaptureSettings,
    /// Keyed by decimal scope id. String keys survive every config
    /// provider (YAML, env) without numeric-key coercion.
    #[serde(default)]
    pub scopes: HashMap<String, ScopeOverrides>,
}

// ── Defaults ──────────────────────────────────────────────────

fn default_true() -> bool {
    true
}
fn default_retention_days() -> i64 {
    30
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoints: Vec::new(),
            response_codes: Vec::new(),
            log_request_headers: true,
            log_request_body: true,
            log_response_headers: true,
            log_response_body: true,
            sanitize_secrets: true,
            secret_fields: Vec::new(),
            retention_days: default_retention_days(),
            cleanup_enabled: true,
            base_url: None,
            developer_mode: false,
        }
    }
}

// ── Impls ─────────────────────────────────────────────────────

impl CaptureConfig {
    /// Load configuration from a YAML file + `APITAP_` env overrides.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let config: CaptureConfig = Figment::new()
            .merge(Yaml::file(path))
            .merge(Env::prefixed("APITAP_").split("_"))
            .extract()?;
        Ok(config)
    }

    fn scope(&self, scope: Option<ScopeId>) -> Option<&ScopeOverrides> {
        scope.and_then(|id| self.scopes.get(&id.to_string()))
    }

    pub fn is_enabled(&self, scope: Option<ScopeId>) -> bool {
        self.scope(scope)
            .and_then(|s| s.enabled)
            .unwrap_or(self.global.enabled)
    }

    /// Configured endpoint patterns, trimmed, empty items dropped.
    pub fn enabled_endpoints(&self, scope: Option<ScopeId>) -> Vec<String> {
        let raw = self
            .scope(scope)
            .and_then(|s| s.endpoints.as_ref())
            .unwrap_or(&self.global.endpoints);
        clean_list(raw)
    }

    /// Response codes whose bodies/headers are kept. Empty = all.
    pub fn enabled_response_codes(&self, scope: Option<ScopeId>) -> Vec<String> {
        let raw = self
            .scope(scope)
            .and_then(|s| s.response_codes.as_ref())
            .unwrap_or(&self.global.response_codes);
        clean_list(raw)
    }

    pub fn should_log_request_headers(&self, scope: Option<ScopeId>) -> bool {
        self.scope(scope)
            .and_then(|s| s.log_request_headers)
            .unwrap_or(self.global.log_request_headers)
    }

    pub fn should_log_request_body(&self, scope: Option<ScopeId>) -> bool {
        self.scope(scope)
            .and_then(|s| s.log_request_body)
            .unwrap_or(self.global.log_request_body)
    }

    pub fn should_log_response_headers(&self, scope: Option<ScopeId>) -> bool {
        self.scope(scope)
            .and_then(|s| s.log_response_headers)
            .unwrap_or(self.global.log_response_headers)
    }

    pub fn should_log_response_body(&self, scope: Option<ScopeId>) -> bool {
        self.scope(scope)
            .and_then(|s| s.log_response_body)
            .unwrap_or(self.global.log_response_body)
    }

    pub fn should_sanitize_secrets(&self, scope: Option<ScopeId>) -> bool {
        self.scope(scope)
            .and_then(|s| s.sanitize_secrets)
            .unwrap_or(self.global.sanitize_secrets)
    }

    /// Secret-field tokens, falling back to the default list when the
    /// resolved list is empty.
    pub fn secret_fields(&self, scope: Option<ScopeId>) -> Vec<String> {
        let raw = self
            .scope(scope)
            .and_then(|s| s.secret_fields.as_ref())
            .unwrap_or(&self.global.secret_fields);
        let cleaned = clean_list(raw);
        if cleaned.is_empty() {
            DEFAULT_SECRET_FIELDS.iter().map(|s| s.to_string()).collect()
        } else {
            cleaned
        }
    }

    pub fn retention_days(&self, scope: Option<ScopeId>) -> i64 {
        self.scope(scope)
            .and_then(|s| s.retention_days)
            .unwrap_or(self.global.retention_days)
    }

    pub fn is_cleanup_enabled(&self, scope: Option<ScopeId>) -> bool {
        self.scope(scope)
            .and_then(|s| s.cleanup_enabled)
            .unwrap_or(self.global.cleanup_enabled)
    }

    pub fn base_url(&self, scope: Option<ScopeId>) -> Option<String> {
        self.scope(scope)
            .and_then(|s| s.base_url.clone())
            .or_else(|| self.global.base_url.clone())
    }

    pub fn is_developer_mode(&self, scope: Option<ScopeId>) -> bool {
        self.scope(scope)
            .and_then(|s| s.developer_mode)
            .unwrap_or(self.global.developer_mode)
    }
}

fn clean_list(items: &[String]) -> Vec<String> {
    items
        .iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
