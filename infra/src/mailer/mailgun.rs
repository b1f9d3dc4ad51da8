//! Mailgun mail delivery implementation.
//!
//! Sends one-time code emails through the Mailgun messages API with retry
//! and exponential backoff. Credentials come from the environment; the
//! request authenticates with HTTP basic auth ("api", api key).

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use mc_core::services::stepup::Notifier;

use super::mask_email;
use crate::InfrastructureError;

/// Mailgun service configuration
#[derive(Debug, Clone)]
pub struct MailgunConfig {
    /// Mailgun API key
    pub api_key: String,
    /// Sending domain registered with Mailgun
    pub domain: String,
    /// From address for code emails
    pub from_address: String,
    /// API base URL (overridable for the EU region)
    pub base_url: String,
    /// Maximum retry attempts for failed requests
    pub max_retries: u32,
    /// Initial retry delay in milliseconds
    pub retry_delay_ms: u64,
    /// Timeout for API requests in seconds
    pub request_timeout_secs: u64,
}

impl MailgunConfig {
    /// Create configuration from environment variables
    pub fn from_env() -> Result<Self, InfrastructureError> {
        let api_key = std::env::var("MAILGUN_API_KEY")
            .map_err(|_| InfrastructureError::Config("MAILGUN_API_KEY not set".to_string()))?;
        let domain = std::env::var("MAILGUN_DOMAIN")
            .map_err(|_| InfrastructureError::Config("MAILGUN_DOMAIN not set".to_string()))?;
        let from_address = std::env::var("MAILGUN_FROM_ADDRESS")
            .map_err(|_| InfrastructureError::Config("MAILGUN_FROM_ADDRESS not set".to_string()))?;

        if !from_address.contains('@') {
            return Err(InfrastructureError::Config(
                "MAILGUN_FROM_ADDRESS must be an email address".to_string(),
            ));
        }

        Ok(Self {
            api_key,
            domain,
            from_address,
            base_url: std::env::var("MAILGUN_BASE_URL")
                .unwrap_or_else(|_| "https://api.mailgun.net".to_string()),
            max_retries: std::env::var("MAILGUN_MAX_RETRIES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3),
            retry_delay_ms: std::env::var("MAILGUN_RETRY_DELAY_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(1000),
            request_timeout_secs: std::env::var("MAILGUN_REQUEST_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),
        })
    }
}

/// Response payload of the Mailgun messages API
#[derive(Debug, Deserialize)]
struct MailgunResponse {
    id: String,
}

/// Mailgun mail service implementation
pub struct MailgunMailer {
    client: reqwest::Client,
    config: MailgunConfig,
}

impl MailgunMailer {
    /// Create a new Mailgun mailer
    pub fn new(config: MailgunConfig) -> Result<Self, InfrastructureError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        info!(domain = %config.domain, "Mailgun mailer initialized");

        Ok(Self { client, config })
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self, InfrastructureError> {
        Self::new(MailgunConfig::from_env()?)
    }

    /// Compose the code email body
    fn compose_body(code: &str, action_label: &str, validity_minutes: i64) -> String {
        format!(
            "You requested to {}.\n\n\
             Your verification code is: {}\n\n\
             The code is valid for {} minutes and can be used once. If you \
             did not request this, please contact support.",
            action_label, code, validity_minutes
        )
    }

    /// Send an email with retry and exponential backoff
    async fn send_with_retry(
        &self,
        to: &str,
        subject: &str,
        body: &str,
    ) -> Result<String, InfrastructureError> {
        let url = format!("{}/v3/{}/messages", self.config.base_url, self.config.domain);
        let mut attempts = 0;
        let mut delay = Duration::from_millis(self.config.retry_delay_ms);

        loop {
            attempts += 1;

            debug!(
                to = %mask_email(to),
                attempt = attempts,
                max_attempts = self.config.max_retries,
                "Sending code email"
            );

            let response = self
                .client
                .post(&url)
                .basic_auth("api", Some(&self.config.api_key))
                .form(&[
                    ("from", self.config.from_address.as_str()),
                    ("to", to),
                    ("subject", subject),
                    ("text", body),
                ])
                .send()
                .await;

            match response {
                Ok(response) if response.status().is_success() => {
                    let parsed: MailgunResponse = response.json().await?;
                    info!(
                        to = %mask_email(to),
                        message_id = %parsed.id,
                        "Code email accepted by Mailgun"
                    );
                    return Ok(parsed.id);
                }
                Ok(response) => {
                    let status = response.status();
                    let detail = response.text().await.unwrap_or_default();
                    error!(
                        to = %mask_email(to),
                        status = %status,
                        attempt = attempts,
                        "Mailgun rejected the message: {}",
                        detail
                    );

                    // Client errors will not improve with retries
                    if status.is_client_error() || attempts >= self.config.max_retries {
                        return Err(InfrastructureError::Mail(format!(
                            "Mailgun returned {}: {}",
                            status, detail
                        )));
                    }
                }
                Err(e) => {
                    error!(
                        to = %mask_email(to),
                        attempt = attempts,
                        error = %e,
                        "Mailgun request failed"
                    );
                    if attempts >= self.config.max_retries {
                        return Err(InfrastructureError::Http(e));
                    }
                }
            }

            warn!(
                to = %mask_email(to),
                delay_ms = delay.as_millis() as u64,
                "Retrying code email"
            );
            tokio::time::sleep(delay).await;
            delay *= 2;
        }
    }
}

#[async_trait]
impl Notifier for MailgunMailer {
    async fn send_code(
        &self,
        email: &str,
        code: &str,
        action_label: &str,
        validity_minutes: i64,
    ) -> Result<String, String> {
        let subject = format!("MediCase verification code to {}", action_label);
        let body = Self::compose_body(code, action_label, validity_minutes);

        self.send_with_retry(email, &subject, &body)
            .await
            .map_err(|e| e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compose_body_names_action_and_window() {
        let body = MailgunMailer::compose_body("483920", "delete a case record", 10);
        assert!(body.contains("483920"));
        assert!(body.contains("delete a case record"));
        assert!(body.contains("10 minutes"));
    }
}
