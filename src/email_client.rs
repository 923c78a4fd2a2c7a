use anyhow::Context;
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use std::time::Duration;

use crate::email_request::OutboundMessage;

/// HTTP client for the email dispatch provider. The provider is an opaque
/// collaborator: one `send` operation returning a message id, or an error.
pub struct EmailClient {
    http_client: Client,
    base_url: String,
    authorization_token: Option<Secret<String>>,
    sender: String,
    recipient: String,
}

#[derive(serde::Deserialize)]
struct SendEmailResponse {
    id: String,
}

impl EmailClient {
    pub fn new(
        base_url: String,
        sender: String,
        recipient: String,
        authorization_token: Option<Secret<String>>,
        timeout: Duration,
    ) -> Self {
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to build the dispatch HTTP client");
        Self {
            http_client,
            base_url,
            authorization_token,
            sender,
            recipient,
        }
    }

    /// Whether a dispatch credential is present. Checked before any work is
    /// done for a request, so a misconfigured deployment answers 503 instead
    /// of failing mid-dispatch.
    pub fn is_configured(&self) -> bool {
        self.authorization_token.is_some()
    }

    pub fn sender(&self) -> &str {
        &self.sender
    }

    pub fn recipient(&self) -> &str {
        &self.recipient
    }

    /// Sends one message, returning the provider's message identifier.
    pub async fn send(&self, message: &OutboundMessage) -> Result<String, anyhow::Error> {
        let token = self
            .authorization_token
            .as_ref()
            .context("email dispatch credential is not configured")?;

        let url = format!("{}/emails", self.base_url);
        let response = self
            .http_client
            .post(&url)
            .bearer_auth(token.expose_secret())
            .json(message)
            .send()
            .await
            .context("failed to execute dispatch request")?
            .error_for_status()
            .context("dispatch provider returned an error status")?;

        let body: SendEmailResponse = response
            .json()
            .await
            .context("failed to parse dispatch provider response")?;
        Ok(body.id)
    }
}
