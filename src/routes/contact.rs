use std::fmt::{Debug, Formatter};

use actix_web::http::header::HeaderMap;
use actix_web::http::StatusCode;
use actix_web::{web, HttpRequest, HttpResponse, ResponseError};
use futures::StreamExt;
use uuid::Uuid;

use crate::domain::{SanitizedSubmission, SubmissionInput};
use crate::email_client::EmailClient;
use crate::email_request::OutboundMessage;
use crate::rate_limit::KeyedRateLimiter;
use crate::routes::error_chain_fmt;
use crate::validation::validate;

/// Declared-size ceiling checked against the `content-length` header before
/// the body is read, and enforced again while streaming it.
const MAX_PAYLOAD_BYTES: usize = 10_000;

/// Ordered by trust: the CDN-provided header wins over the generic one.
const FORWARDED_IP_HEADERS: [&str; 2] = ["cf-connecting-ip", "x-forwarded-for"];

#[derive(thiserror::Error)]
pub enum ContactError {
    #[error("Request payload too large")]
    PayloadTooLarge,
    #[error("Rate limit exceeded. Please try again later.")]
    RateLimited,
    #[error("Email service not configured. Please contact support.")]
    NotConfigured,
    #[error("{0}")]
    InvalidBody(String),
    #[error("Validation failed")]
    Validation(Vec<String>),
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

impl Debug for ContactError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl ResponseError for ContactError {
    fn status_code(&self) -> StatusCode {
        match self {
            ContactError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ContactError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ContactError::NotConfigured => StatusCode::SERVICE_UNAVAILABLE,
            ContactError::InvalidBody(_) | ContactError::Validation(_) => StatusCode::BAD_REQUEST,
            ContactError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            ContactError::Validation(details) => {
                HttpResponse::build(self.status_code()).json(serde_json::json!({
                    "error": "Validation failed",
                    "details": details,
                }))
            }
            // Internal detail stays in the logs.
            ContactError::Unexpected(_) => {
                HttpResponse::build(self.status_code()).json(serde_json::json!({
                    "error": "Internal server error",
                }))
            }
            other => HttpResponse::build(self.status_code()).json(serde_json::json!({
                "error": other.to_string(),
            })),
        }
    }
}

/// Relays one contact form message to the configured recipient.
///
/// Short-circuits on the first failed gate: declared size, rate limit,
/// dispatch credential, body shape, validation. Sanitization and validation
/// run here independently of whatever the client claims to have done.
#[tracing::instrument(
    name = "Relay a contact form message",
    skip(request, payload, email_client, rate_limiter),
    fields(request_id = %Uuid::new_v4(), caller = tracing::field::Empty)
)]
pub async fn send_contact_email(
    request: HttpRequest,
    mut payload: web::Payload,
    email_client: web::Data<EmailClient>,
    rate_limiter: web::Data<KeyedRateLimiter>,
) -> Result<HttpResponse, ContactError> {
    if declared_length_exceeds_limit(request.headers()) {
        return Err(ContactError::PayloadTooLarge);
    }

    let identity = caller_identity(request.headers());
    // Only a prefix of the caller address goes into the logs.
    let caller_prefix: String = identity.chars().take(8).collect();
    tracing::Span::current().record("caller", &tracing::field::display(&caller_prefix));

    if !rate_limiter.check_and_record(&identity) {
        tracing::warn!("Rate limit exceeded for caller {}...", caller_prefix);
        return Err(ContactError::RateLimited);
    }

    if !email_client.is_configured() {
        tracing::error!("Email dispatch credential is not configured");
        return Err(ContactError::NotConfigured);
    }

    let body = read_body(&mut payload).await?;
    let input: SubmissionInput = serde_json::from_slice(&body)
        .map_err(|_| ContactError::InvalidBody("Invalid JSON format".to_string()))?;

    let validation = validate(&input.name, &input.email, &input.message);
    if !validation.is_valid() {
        tracing::info!("Validation failed: {:?}", validation.errors());
        return Err(ContactError::Validation(validation.into_errors()));
    }

    let sanitized = SanitizedSubmission::from_input(&input);
    tracing::info!(
        message_length = sanitized.message.len(),
        "Processing contact form submission"
    );

    let message = OutboundMessage::build(
        email_client.sender(),
        email_client.recipient(),
        &sanitized,
    );
    let email_id = email_client.send(&message).await?;

    tracing::info!(%email_id, "Contact message dispatched");
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "emailId": email_id,
    })))
}

/// Answers CORS preflight; the permissive headers themselves are attached by
/// the `DefaultHeaders` middleware on every response.
pub async fn contact_preflight() -> HttpResponse {
    HttpResponse::Ok().finish()
}

pub async fn method_not_allowed() -> HttpResponse {
    HttpResponse::MethodNotAllowed().json(serde_json::json!({
        "error": "Method not allowed",
    }))
}

fn declared_length_exceeds_limit(headers: &HeaderMap) -> bool {
    headers
        .get(actix_web::http::header::CONTENT_LENGTH)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<usize>().ok())
        .map_or(false, |length| length > MAX_PAYLOAD_BYTES)
}

fn caller_identity(headers: &HeaderMap) -> String {
    for name in FORWARDED_IP_HEADERS {
        if let Some(value) = headers.get(name).and_then(|v| v.to_str().ok()) {
            // x-forwarded-for may carry a proxy chain; the first hop is the caller.
            if let Some(first) = value.split(',').next() {
                let first = first.trim();
                if !first.is_empty() {
                    return first.to_string();
                }
            }
        }
    }
    "unknown".to_string()
}

async fn read_body(payload: &mut web::Payload) -> Result<web::Bytes, ContactError> {
    let mut body = web::BytesMut::new();
    while let Some(chunk) = payload.next().await {
        let chunk = chunk
            .map_err(|_| ContactError::InvalidBody("Failed to read request body".to_string()))?;
        if body.len() + chunk.len() > MAX_PAYLOAD_BYTES {
            return Err(ContactError::PayloadTooLarge);
        }
        body.extend_from_slice(&chunk);
    }
    Ok(body.freeze())
}
