use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::{SanitizedSubmission, SubmissionInput};
use crate::rate_limit::SlidingWindowLimiter;
use crate::validation::validate;

/// 3 submissions per 5 minutes for the local session.
const CLIENT_MAX_REQUESTS: usize = 3;
const CLIENT_WINDOW: Duration = Duration::from_secs(5 * 60);

static TAG_FRAGMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<[^>]*>").expect("invalid tag pattern"));

/// Side-effect sink for user-facing notices; the embedding UI decides how to
/// render them (toasts, inline banners, log lines).
pub trait Notifier {
    fn success(&self, message: &str);
    fn warning(&self, message: &str);
    fn error(&self, message: &str);
}

/// Default sink that forwards notices to the tracing stack.
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn success(&self, message: &str) {
        tracing::info!("{}", message);
    }
    fn warning(&self, message: &str) {
        tracing::warn!("{}", message);
    }
    fn error(&self, message: &str) {
        tracing::error!("{}", message);
    }
}

/// Terminal outcome of one submission attempt. The orchestrator is back in
/// its idle state whenever one of these has been returned.
#[derive(Debug, PartialEq, Eq)]
pub enum SubmissionOutcome {
    Sent { email_id: String },
    RateLimited,
    Invalid(Vec<String>),
    Failed,
    AlreadySubmitting,
}

#[derive(serde::Deserialize)]
struct ContactResponse {
    #[allow(dead_code)]
    success: bool,
    #[serde(rename = "emailId")]
    email_id: String,
}

/// Client-side guard for the contact form: collects fields, rate-limits the
/// local session, sanitizes and validates, then issues a single POST to the
/// relay endpoint. Advisory only — the server re-checks everything.
pub struct ContactForm<N: Notifier> {
    fields: SubmissionInput,
    limiter: SlidingWindowLimiter,
    http_client: reqwest::Client,
    endpoint: String,
    notifier: N,
    in_flight: bool,
}

impl<N: Notifier> ContactForm<N> {
    pub fn new(endpoint: String, notifier: N) -> Self {
        Self {
            fields: SubmissionInput::default(),
            limiter: SlidingWindowLimiter::new(CLIENT_MAX_REQUESTS, CLIENT_WINDOW),
            http_client: reqwest::Client::new(),
            endpoint,
            notifier,
            in_flight: false,
        }
    }

    // Field setters strip tag fragments as the user types, mirroring the
    // input-time cleanup the form applies; full sanitization still runs at
    // submit time.
    pub fn set_name(&mut self, value: &str) {
        self.fields.name = TAG_FRAGMENT.replace_all(value, "").into_owned();
    }

    pub fn set_email(&mut self, value: &str) {
        self.fields.email = TAG_FRAGMENT.replace_all(value, "").into_owned();
    }

    pub fn set_message(&mut self, value: &str) {
        self.fields.message = TAG_FRAGMENT.replace_all(value, "").into_owned();
    }

    pub fn fields(&self) -> &SubmissionInput {
        &self.fields
    }

    /// Runs one submission attempt end to end.
    ///
    /// Gate order: local rate limiter, sanitize, validate, then the network
    /// call. A rejected gate leaves the fields untouched so the user can
    /// correct and resubmit; only a confirmed send clears them.
    pub async fn submit(&mut self) -> SubmissionOutcome {
        if self.in_flight {
            return SubmissionOutcome::AlreadySubmitting;
        }

        if !self.limiter.check_and_record() {
            self.notifier
                .warning("Too many messages. Please wait a few minutes and try again.");
            return SubmissionOutcome::RateLimited;
        }

        let sanitized = SanitizedSubmission::from_input(&self.fields);
        let validation = validate(&sanitized.name, &sanitized.email, &sanitized.message);
        if !validation.is_valid() {
            let errors = validation.into_errors();
            if let Some(first) = errors.first() {
                self.notifier.error(first);
            }
            return SubmissionOutcome::Invalid(errors);
        }

        self.in_flight = true;
        let result = self.post(&sanitized).await;
        self.in_flight = false;

        match result {
            Ok(email_id) => {
                self.fields = SubmissionInput::default();
                self.notifier
                    .success("Message sent! Thank you, I'll get back to you soon.");
                SubmissionOutcome::Sent { email_id }
            }
            Err(e) => {
                tracing::error!("Failed to relay contact message: {:?}", e);
                self.notifier
                    .error("Failed to send message. Please try again later.");
                SubmissionOutcome::Failed
            }
        }
    }

    async fn post(&self, sanitized: &SanitizedSubmission) -> Result<String, anyhow::Error> {
        let response = self
            .http_client
            .post(&self.endpoint)
            .json(sanitized)
            .send()
            .await?
            .error_for_status()?;
        let body: ContactResponse = response.json().await?;
        Ok(body.email_id)
    }
}
