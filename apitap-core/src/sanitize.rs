//! Secret-field sanitization for captured headers and bodies.
//!
//! Values under secret-named keys are replaced with a partially masked
//! hash before an entry is stored. Field matching is case-insensitive
//! substring matching, so the configured token `key` covers `api_key`,
//! `X-Api-Key`, and so on.
//!
//! The masked formats are a compatibility contract:
//!
//! - empty value            → `[EMPTY]`
//! - value of ≤ 8 chars     → `SHA256:<64 hex chars>`
//! - longer value           → `<2 chars>***<16 hex chars>***<2 chars>`
//!
//! JSON handling fails open: text that does not parse is returned
//! unchanged, never an error. Losing one sanitization pass is preferable
//! to losing the capture.

use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

/// Case-insensitive secret-field check.
///
/// A field is secret when its lowercased name equals or contains any
/// lowercased configured token. Deliberately permissive by substring.
pub fn is_secret_field(field_name: &str, secret_fields: &[String]) -> bool {
    let name = field_name.to_lowercase();
    secret_fields.iter().any(|token| {
        let token = token.trim().to_lowercase();
        !token.is_empty() && (name == token || name.contains(&token))
    })
}

/// Mask a secret value, keeping a debugging-friendly remnant.
pub fn hash_value(value: &str) -> String {
    if value.is_empty() {
        return "[EMPTY]".to_string();
    }

    let digest = sha256_hex(value);

    // Boundary is measured in chars so multi-byte input cannot split a
    // code point.
    let chars: Vec<char> = value.chars().collect();
    if chars.len() <= 8 {
        return format!("SHA256:{digest}");
    }

    let prefix: String = chars[..2].iter().collect();
    let suffix: String = chars[chars.len() - 2..].iter().collect();
    format!("{prefix}***{}***{suffix}", &digest[..16])
}

/// Recursively mask secret fields in a JSON object map.
///
/// Matched keys get their value replaced wholesale; masked branches are
/// not descended into. Non-matching objects and arrays recurse,
/// non-matching scalars pass through unchanged.
pub fn sanitize_map(data: &Map<String, Value>, secret_fields: &[String]) -> Map<String, Value> {
    data.iter()
        .map(|(key, value)| {
            let sanitized = if is_secret_field(key, secret_fields) {
                Value::String(hash_value(&stringify(value)))
            } else {
                sanitize_value(value, secret_fields)
            };
            (key.clone(), sanitized)
        })
        .collect()
}

/// Sanitize JSON text. On parse failure the input is returned unchanged.
pub fn sanitize_json(json: &str, secret_fields: &[String]) -> String {
    let Ok(parsed) = serde_json::from_str::<Value>(json) else {
        return json.to_string();
    };

    let sanitized = match parsed {
        Value::Object(ref map) => Value::Object(sanitize_map(map, secret_fields)),
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| sanitize_value(item, secret_fields))
                .collect(),
        ),
        // Scalar JSON has no fields to mask.
        _ => return json.to_string(),
    };

    serde_json::to_string(&sanitized).unwrap_or_else(|_| json.to_string())
}

/// Polymorphic entry point for body text of unknown shape.
///
/// Text whose first non-whitespace character opens a JSON object or
/// array is sanitized as JSON; anything else passes through unchanged.
pub fn sanitize(data: &str, secret_fields: &[String]) -> String {
    match data.trim_start().chars().next() {
        Some('{') | Some('[') => sanitize_json(data, secret_fields),
        _ => data.to_string(),
    }
}

fn sanitize_value(value: &Value, secret_fields: &[String]) -> Value {
    match value {
        Value::Object(map) => Value::Object(sanitize_map(map, secret_fields)),
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| sanitize_value(item, secret_fields))
                .collect(),
        ),
        other => other.clone(),
    }
}

/// Plain-text form of a value for hashing: strings verbatim, null as
/// the empty string, everything else in compact JSON form.
fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn sha256_hex(value: &str) -> String {
    let digest = Sha256::digest(value.as_bytes());
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(tokens: &[&str]) -> Vec<String> {
        tokens.iter().map(|t| t.to_string()).collect()
    }

    // ── is_secret_field ──────────────────────────────────────────

    #[test]
    fn exact_match_is_secret() {
        assert!(is_secret_field("password", &fields(&["password"])));
    }

    #[test]
    fn substring_match_is_secret() {
        assert!(is_secret_field("X-Api-Key", &fields(&["key"])));
        assert!(is_secret_field("refresh_token", &fields(&["token"])));
    }

    #[test]
    fn case_is_ignored() {
        assert!(is_secret_field("AUTHORIZATION", &fields(&["authorization"])));
        assert!(is_secret_field("authorization", &fields(&["AUTHORIZATION"])));
    }

    #[test]
    fn non_matching_field_is_not_secret() {
        assert!(!is_secret_field("username", &fields(&["key"])));
        assert!(!is_secret_field("content-type", &fields(&["password", "token"])));
    }

    #[test]
    fn tokens_are_trimmed_and_blank_tokens_ignored() {
        assert!(is_secret_field("password", &fields(&["  password  "])));
        assert!(!is_secret_field("anything", &fields(&["", "   "])));
    }

    // ── hash_value ───────────────────────────────────────────────

    #[test]
    fn empty_value_yields_empty_marker() {
        assert_eq!(hash_value(""), "[EMPTY]");
    }

    #[test]
    fn short_value_yields_full_hash() {
        let expected = format!("SHA256:{}", sha256_hex("abcd"));
        assert_eq!(hash_value("abcd"), expected);
        // Known digest of "abcd"
        assert_eq!(
            hash_value("abcd"),
            "SHA256:88d4266fd4e6338d13b845fcf289579d209c897823b9217da3e161936f031589"
        );
    }

    #[test]
    fn boundary_value_of_eight_chars_still_full_hash() {
        assert!(hash_value("12345678").starts_with("SHA256:"));
    }

    #[test]
    fn long_value_keeps_prefix_and_suffix() {
        let masked = hash_value("abcdefghij");
        let expected = format!("ab***{}***ij", &sha256_hex("abcdefghij")[..16]);
        assert_eq!(masked, expected);
    }

    #[test]
    fn long_value_middle_hash_is_sixteen_hex_chars() {
        let masked = hash_value("supersecretvalue");
        let middle = masked.split("***").nth(1).unwrap();
        assert_eq!(middle.len(), 16);
        assert!(middle.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn multibyte_value_does_not_split_code_points() {
        let masked = hash_value("äöüßéàçñîœ");
        assert!(masked.starts_with("äö***"));
        assert!(masked.ends_with("***îœ"));
    }

    // ── sanitize_map ─────────────────────────────────────────────

    #[test]
    fn masks_top_level_and_nested_secret_keys() {
        let data = json!({
            "password": "p@ss",
            "nested": {"token": "t1"},
            "user": "alice"
        });
        let Value::Object(map) = data else { unreachable!() };
        let out = sanitize_map(&map, &fields(&["password", "token"]));

        assert_eq!(out["password"], json!(hash_value("p@ss")));
        assert_eq!(out["nested"]["token"], json!(hash_value("t1")));
        assert_eq!(out["user"], json!("alice"));
    }

    #[test]
    fn does_not_recurse_into_masked_branches() {
        let data = json!({"secret": {"inner": "visible?"}});
        let Value::Object(map) = data else { unreachable!() };
        let out = sanitize_map(&map, &fields(&["secret"]));

        // The whole branch collapses to one masked string.
        assert!(out["secret"].is_string());
        assert!(!out["secret"].as_str().unwrap().contains("visible"));
    }

    #[test]
    fn recurses_into_arrays_of_objects() {
        let data = json!({"items": [{"api_key": "k-123456789"}, {"name": "x"}]});
        let Value::Object(map) = data else { unreachable!() };
        let out = sanitize_map(&map, &fields(&["key"]));

        assert_ne!(out["items"][0]["api_key"], json!("k-123456789"));
        assert_eq!(out["items"][1]["name"], json!("x"));
    }

    #[test]
    fn null_secret_value_masks_to_empty_marker() {
        let data = json!({"token": null});
        let Value::Object(map) = data else { unreachable!() };
        let out = sanitize_map(&map, &fields(&["token"]));
        assert_eq!(out["token"], json!("[EMPTY]"));
    }

    #[test]
    fn numeric_secret_value_is_hashed_from_its_text_form() {
        let data = json!({"cvv": 123});
        let Value::Object(map) = data else { unreachable!() };
        let out = sanitize_map(&map, &fields(&["cvv"]));
        assert_eq!(out["cvv"], json!(hash_value("123")));
    }

    // ── sanitize_json / sanitize ─────────────────────────────────

    #[test]
    fn invalid_json_fails_open() {
        let input = "{not valid json";
        assert_eq!(sanitize_json(input, &fields(&["password"])), input);
    }

    #[test]
    fn valid_json_object_is_sanitized() {
        let out = sanitize_json(r#"{"password":"hunter2","a":1}"#, &fields(&["password"]));
        let parsed: Value = serde_json::from_str(&out).unwrap();
        assert_ne!(parsed["password"], json!("hunter2"));
        assert_eq!(parsed["a"], json!(1));
    }

    #[test]
    fn top_level_array_is_sanitized() {
        let out = sanitize_json(r#"[{"token":"abc"}]"#, &fields(&["token"]));
        let parsed: Value = serde_json::from_str(&out).unwrap();
        assert_ne!(parsed[0]["token"], json!("abc"));
    }

    #[test]
    fn scalar_json_passes_through() {
        assert_eq!(sanitize_json("42", &fields(&["token"])), "42");
        assert_eq!(sanitize_json("\"hello\"", &fields(&["token"])), "\"hello\"");
    }

    #[test]
    fn plain_text_passes_through_sanitize() {
        let body = "plain text body, no json here";
        assert_eq!(sanitize(body, &fields(&["password"])), body);
    }

    #[test]
    fn sanitize_accepts_leading_whitespace() {
        let out = sanitize("  \n{\"token\":\"abc\"}", &fields(&["token"]));
        let parsed: Value = serde_json::from_str(&out).unwrap();
        assert_ne!(parsed["token"], json!("abc"));
    }

    #[test]
    fn sanitize_of_invalid_braced_text_returns_input() {
        let input = "{oops";
        assert_eq!(sanitize(input, &fields(&["token"])), input);
    }
}
