use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

use crate::helpers::{spawn_app, spawn_app_with_settings, valid_body};

fn provider_success() -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(serde_json::json!({ "id": "email-id-123" }))
}

#[tokio::test]
async fn a_valid_submission_returns_200_with_the_dispatch_id() {
    let app = spawn_app().await;

    Mock::given(path("/emails"))
        .and(method("POST"))
        .respond_with(provider_success())
        .expect(1)
        .mount(&app.email_server)
        .await;

    let response = app.post_contact(valid_body(), "203.0.113.1").await;

    assert_eq!(200, response.status().as_u16());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["emailId"], "email-id-123");
}

#[tokio::test]
async fn the_dispatched_message_carries_the_sanitized_fields() {
    let app = spawn_app().await;

    Mock::given(path("/emails"))
        .and(method("POST"))
        .respond_with(provider_success())
        .expect(1)
        .mount(&app.email_server)
        .await;

    let body = serde_json::json!({
        "name": "<b>John Doe</b>",
        "email": "John@Example.com",
        "message": "Hello <script>alert(1)</script>from the form"
    })
    .to_string();
    app.post_contact(body, "203.0.113.2").await;

    let dispatch_request = &app.email_server.received_requests().await.unwrap()[0];
    let dispatched: serde_json::Value = serde_json::from_slice(&dispatch_request.body).unwrap();

    assert_eq!(
        dispatched["subject"],
        "New Contact Form Message from John Doe"
    );
    assert_eq!(dispatched["reply_to"], "john@example.com");
    let html = dispatched["html"].as_str().unwrap();
    assert!(html.contains("John Doe"));
    assert!(!html.contains("<script>"));
    assert!(!html.contains("alert"));
}

#[tokio::test]
async fn an_invalid_email_is_rejected_without_reaching_the_provider() {
    let app = spawn_app().await;

    let body = serde_json::json!({
        "name": "John Doe",
        "email": "invalid-email",
        "message": "Test message"
    })
    .to_string();
    let response = app.post_contact(body, "203.0.113.3").await;

    assert_eq!(400, response.status().as_u16());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Validation failed");
    let details = body["details"].as_array().unwrap();
    assert!(details
        .iter()
        .any(|d| d.as_str().unwrap().contains("email")));

    assert!(app.email_server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn out_of_range_fields_are_each_reported() {
    let app = spawn_app().await;

    let body = serde_json::json!({
        "name": "J",
        "email": "john@example.com",
        "message": "short"
    })
    .to_string();
    let response = app.post_contact(body, "203.0.113.4").await;

    assert_eq!(400, response.status().as_u16());
    let body: serde_json::Value = response.json().await.unwrap();
    let details = body["details"].as_array().unwrap();
    assert_eq!(details.len(), 2);
    assert!(details[0].as_str().unwrap().contains("Name"));
    assert!(details[1].as_str().unwrap().contains("Message"));
}

#[tokio::test]
async fn a_missing_field_is_reported_as_required() {
    let app = spawn_app().await;

    let body = serde_json::json!({
        "name": "John Doe",
        "message": "A long enough test message"
    })
    .to_string();
    let response = app.post_contact(body, "203.0.113.11").await;

    assert_eq!(400, response.status().as_u16());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Validation failed");
    let details = body["details"].as_array().unwrap();
    assert!(details
        .iter()
        .any(|d| d.as_str().unwrap() == "Email is required"));

    assert!(app.email_server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn a_malformed_body_returns_400() {
    let app = spawn_app().await;

    let response = app.post_contact("not json at all".to_string(), "203.0.113.5").await;

    assert_eq!(400, response.status().as_u16());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Invalid JSON format");
}

#[tokio::test]
async fn the_sixth_request_from_one_caller_is_rate_limited() {
    let app = spawn_app().await;

    Mock::given(path("/emails"))
        .and(method("POST"))
        .respond_with(provider_success())
        .expect(6)
        .mount(&app.email_server)
        .await;

    for _ in 0..5 {
        let response = app.post_contact(valid_body(), "203.0.113.6").await;
        assert_eq!(200, response.status().as_u16());
    }

    let response = app.post_contact(valid_body(), "203.0.113.6").await;
    assert_eq!(429, response.status().as_u16());

    // A different caller still has its own budget.
    let response = app.post_contact(valid_body(), "203.0.113.7").await;
    assert_eq!(200, response.status().as_u16());
}

#[tokio::test]
async fn an_oversized_declared_payload_is_rejected_before_parsing() {
    let app = spawn_app().await;

    let body = serde_json::json!({
        "name": "John Doe",
        "email": "john@example.com",
        "message": "m".repeat(11_000)
    })
    .to_string();
    let response = app.post_contact(body, "203.0.113.8").await;

    assert_eq!(413, response.status().as_u16());
    assert!(app.email_server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn a_get_request_is_not_allowed() {
    let app = spawn_app().await;

    let response = app
        .api_client
        .get(&format!("{}/api/contact", &app.address))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(405, response.status().as_u16());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Method not allowed");
}

#[tokio::test]
async fn preflight_requests_are_answered_with_permissive_headers() {
    let app = spawn_app().await;

    let response = app
        .api_client
        .request(
            reqwest::Method::OPTIONS,
            &format!("{}/api/contact", &app.address),
        )
        .send()
        .await
        .expect("Failed to execute request");

    assert!(response.status().is_success());
    assert_eq!(
        response
            .headers()
            .get("Access-Control-Allow-Origin")
            .and_then(|v| v.to_str().ok()),
        Some("*")
    );
    assert!(response.headers().contains_key("Access-Control-Allow-Headers"));
}

#[tokio::test]
async fn a_missing_dispatch_credential_yields_503() {
    let app = spawn_app_with_settings(|c| {
        c.email_client.authorization_token = None;
    })
    .await;

    let response = app.post_contact(valid_body(), "203.0.113.9").await;

    assert_eq!(503, response.status().as_u16());
    let body: serde_json::Value = response.json().await.unwrap();
    let error = body["error"].as_str().unwrap();
    // Generic message only; configuration detail stays server-side.
    assert!(!error.to_lowercase().contains("token"));
    assert!(!error.to_lowercase().contains("key"));
}

#[tokio::test]
async fn a_provider_failure_yields_a_generic_500() {
    let app = spawn_app().await;

    Mock::given(path("/emails"))
        .and(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("provider exploded"))
        .expect(1)
        .mount(&app.email_server)
        .await;

    let response = app.post_contact(valid_body(), "203.0.113.10").await;

    assert_eq!(500, response.status().as_u16());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Internal server error");
}
