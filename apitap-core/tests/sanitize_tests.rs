use apitap_core::config::CaptureConfig;
use apitap_core::sanitize;
use serde_json::{Value, json};

// =============================================================================
// Helper Functions
// =============================================================================

fn default_secret_fields() -> Vec<String> {
    CaptureConfig::default().secret_fields(None)
}

fn sanitize_json_value(payload: Value, secret_fields: &[String]) -> Value {
    let sanitized = sanitize::sanitize_json(&payload.to_string(), secret_fields);
    serde_json::from_str(&sanitized).unwrap()
}

// =============================================================================
// Realistic Payload Tests
// =============================================================================

#[test]
fn test_customer_creation_payload() {
    let payload = json!({
        "customer": {
            "email": "jo@example.com",
            "firstname": "Jo",
            "custom_attributes": [
                {"attribute_code": "loyalty_tier", "value": "gold"}
            ]
        },
        "password": "correct-horse-battery-staple"
    });

    let sanitized = sanitize_json_value(payload, &default_secret_fields());

    assert_eq!(sanitized["customer"]["email"], json!("jo@example.com"));
    assert_eq!(
        sanitized["customer"]["custom_attributes"][0]["value"],
        json!("gold")
    );
    let password = sanitized["password"].as_str().unwrap();
    assert!(!password.contains("battery"));
    assert!(password.contains("***"));
}

#[test]
fn test_token_response_payload() {
    let payload = json!({
        "access_token": "eyJhbGciOiJIUzI1NiJ9.payload.signature",
        "refresh_token": "rt-0123456789abcdef",
        "expires_in": 3600,
        "token_type": "Bearer"
    });

    let sanitized = sanitize_json_value(payload, &default_secret_fields());

    assert!(!sanitized["access_token"].as_str().unwrap().contains("eyJ"));
    assert!(!sanitized["refresh_token"].as_str().unwrap().contains("0123456789"));
    assert_eq!(sanitized["expires_in"], json!(3600));
    // Substring matching is deliberately greedy: "token_type" matches
    // the "token" secret and is masked too.
    assert!(sanitized["token_type"].as_str().unwrap().starts_with("SHA256:"));
}

#[test]
fn test_payment_payload_masks_card_fields() {
    let payload = json!({
        "paymentMethod": {
            "method": "credit_card",
            "additional_data": {
                "card_number": "4111111111111111",
                "cvv": "123",
                "cc_exp_year": "2029"
            }
        },
        "billing_address": {"city": "Austin"}
    });

    let sanitized = sanitize_json_value(payload, &default_secret_fields());
    let data = &sanitized["paymentMethod"]["additional_data"];

    assert!(!data["card_number"].as_str().unwrap().contains("4111"));
    // "cvv" is short, so it is replaced with a full hash.
    assert!(data["cvv"].as_str().unwrap().starts_with("SHA256:"));
    assert_eq!(data["cc_exp_year"], json!("2029"));
    assert_eq!(sanitized["billing_address"]["city"], json!("Austin"));
}

#[test]
fn test_custom_secret_fields_extend_matching() {
    let mut fields = default_secret_fields();
    fields.push("session".into());

    let payload = json!({"session_id": "sess-9f8e7d6c5b4a", "user": "jo"});
    let sanitized = sanitize_json_value(payload, &fields);

    assert!(!sanitized["session_id"].as_str().unwrap().contains("9f8e7d6c"));
    assert_eq!(sanitized["user"], json!("jo"));
}

#[test]
fn test_non_json_body_passes_through() {
    let body = "sku=SKU-1&qty=2&password=notjson";
    assert_eq!(
        sanitize::sanitize(body, &default_secret_fields()),
        body.to_string()
    );
}
