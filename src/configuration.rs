use secrecy::Secret;
use serde_aux::field_attributes::deserialize_number_from_string;
use std::time::Duration;

use crate::email_client::EmailClient;
use crate::rate_limit::KeyedRateLimiter;

#[derive(serde::Deserialize, Clone)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub email_client: EmailClientSettings,
    pub rate_limit: RateLimitSettings,
}

#[derive(serde::Deserialize, Clone)]
pub struct ApplicationSettings {
    pub host: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
}

/// Dispatch provider settings. The authorization token is optional on
/// purpose: a deployment without one still starts and answers requests, it
/// just refuses dispatch with a service-unavailable status.
#[derive(serde::Deserialize, Clone)]
pub struct EmailClientSettings {
    pub base_url: String,
    pub sender: String,
    pub recipient: String,
    #[serde(default)]
    pub authorization_token: Option<Secret<String>>,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub timeout_milliseconds: u64,
}

impl EmailClientSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_milliseconds)
    }

    pub fn client(self) -> EmailClient {
        let timeout = self.timeout();
        EmailClient::new(
            self.base_url,
            self.sender,
            self.recipient,
            self.authorization_token,
            timeout,
        )
    }
}

#[derive(serde::Deserialize, Clone)]
pub struct RateLimitSettings {
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub max_requests: u32,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub window_seconds: u64,
}

impl RateLimitSettings {
    pub fn limiter(&self) -> KeyedRateLimiter {
        KeyedRateLimiter::new(self.max_requests, Duration::from_secs(self.window_seconds))
    }
}

pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    let mut settings = config::Config::default();

    // Base values come from a top-level `configuration` file in any format
    // the `config` crate can parse.
    settings.merge(config::File::with_name("configuration"))?;

    // Environment overrides, e.g. APP_EMAIL_CLIENT__AUTHORIZATION_TOKEN or
    // APP_EMAIL_CLIENT__RECIPIENT, take precedence over the file.
    settings.merge(config::Environment::with_prefix("app").separator("__"))?;

    settings.try_into()
}
