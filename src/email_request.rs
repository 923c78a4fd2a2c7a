use crate::domain::SanitizedSubmission;
use crate::sanitizer::sanitize_email_header_field;
use crate::validation::EMAIL_MAX_LENGTH;

/// The fully-formed message handed to the dispatch provider. Immutable after
/// construction; discarded once the dispatch call returns.
#[derive(Debug, serde::Serialize)]
pub struct OutboundMessage {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    pub reply_to: String,
    pub html: String,
}

impl OutboundMessage {
    /// `sender` and `recipient` come from configuration; everything derived
    /// from user input goes through the already-sanitized submission and is
    /// HTML-escaped again when rendered into the body. The reply-to value
    /// lands in a header context, so it gets the header-injection variant of
    /// the sanitizer on top.
    pub fn build(sender: &str, recipient: &str, submission: &SanitizedSubmission) -> Self {
        Self {
            from: sender.to_string(),
            to: vec![recipient.to_string()],
            subject: format!("New Contact Form Message from {}", submission.name),
            reply_to: sanitize_email_header_field(&submission.email, EMAIL_MAX_LENGTH),
            html: render_html_body(submission),
        }
    }
}

fn render_html_body(submission: &SanitizedSubmission) -> String {
    format!(
        "<div>\
            <h2>New contact form submission</h2>\
            <p><strong>Name:</strong> {}</p>\
            <p><strong>Email:</strong> {}</p>\
            <p><strong>Message:</strong></p>\
            <div style=\"white-space: pre-wrap;\">{}</div>\
            <p><small>Sent at {}</small></p>\
        </div>",
        escape_html(&submission.name),
        escape_html(&submission.email),
        escape_html(&submission.message),
        chrono::Utc::now().to_rfc3339(),
    )
}

fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}
