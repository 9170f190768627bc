//! Endpoint pattern matching.
//!
//! Capture rules are configured as `METHOD|/path` strings where the path
//! may contain `:name` parameter segments and a trailing `*` wildcard:
//!
//! ```text
//! GET|/V1/products
//! GET|/V1/products/:sku
//! POST|/V1/carts/*
//! ```
//!
//! Matching is self-contained segment comparison; no router is involved.

use tracing::trace;

/// Matches an endpoint + method pair against configured patterns.
///
/// Stateless; a single instance is safe to share across requests.
#[derive(Debug, Default, Clone, Copy)]
pub struct EndpointMatcher;

/// One parsed segment of a pattern path.
#[derive(Debug, PartialEq, Eq)]
enum Segment<'a> {
    /// Literal text, compared byte-exact.
    Static(&'a str),
    /// `:name` — any single non-empty segment. The value is discarded;
    /// capture rules never need the bound parameter.
    Param,
    /// Trailing `*` — one or more remaining segments.
    Wildcard,
}

/// Parsed pattern path. Internal to the matcher; patterns are
/// re-evaluated per request and never stored compiled.
#[derive(Debug)]
struct PatternPath<'a> {
    segments: Vec<Segment<'a>>,
}

impl<'a> PatternPath<'a> {
    fn parse(path: &'a str) -> Self {
        let count = path.split('/').filter(|s| !s.is_empty()).count();
        let segments = path
            .split('/')
            .filter(|s| !s.is_empty())
            .enumerate()
            .map(|(i, seg)| {
                if let Some(rest) = seg.strip_prefix(':') {
                    if rest.is_empty() {
                        Segment::Static(seg)
                    } else {
                        Segment::Param
                    }
                } else if seg == "*" && i + 1 == count {
                    Segment::Wildcard
                } else {
                    Segment::Static(seg)
                }
            })
            .collect();
        Self { segments }
    }

    fn matches(&self, path: &str) -> bool {
        let request: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        let trailing_wildcard = matches!(self.segments.last(), Some(Segment::Wildcard));
        let fixed = if trailing_wildcard {
            self.segments.len() - 1
        } else {
            self.segments.len()
        };

        if trailing_wildcard {
            // The wildcard consumes one or more segments past the prefix.
            if request.len() <= fixed {
                return false;
            }
        } else if request.len() != fixed {
            return false;
        }

        self.segments[..fixed]
            .iter()
            .zip(&request)
            .all(|(pattern, seg)| match pattern {
                Segment::Static(s) => s == seg,
                Segment::Param => !seg.is_empty(),
                Segment::Wildcard => unreachable!("wildcard only parsed in trailing position"),
            })
    }
}

impl EndpointMatcher {
    pub fn new() -> Self {
        Self
    }

    /// Check whether `endpoint` + `method` is covered by `pattern`.
    ///
    /// A pattern without a `|` separator is malformed configuration and
    /// never matches; it does not surface as an error.
    pub fn matches(&self, endpoint: &str, method: &str, pattern: &str) -> bool {
        let Some((pattern_method, pattern_path)) = pattern.split_once('|') else {
            trace!(pattern = %pattern, "Pattern missing method separator, skipping");
            return false;
        };

        if !pattern_method.eq_ignore_ascii_case(method) {
            return false;
        }

        let endpoint = normalize_path(endpoint);
        let pattern_path = normalize_path(pattern_path);

        // Fast path: exact equality covers fully static patterns.
        if endpoint == pattern_path {
            return true;
        }

        PatternPath::parse(&pattern_path).matches(&endpoint)
    }
}

/// Canonical comparison form: query string and fragment stripped,
/// leading slash present, trailing slash absent (`/` for the root).
fn normalize_path(path: &str) -> String {
    let path = path.split(['?', '#']).next().unwrap_or("");

    let trimmed = path.trim_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        format!("/{trimmed}")
    }
}
