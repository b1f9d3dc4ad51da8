//! Mailer module - email delivery of one-time codes.
//!
//! Production delivery goes through the Mailgun HTTP API; development and
//! tests use the mock mailer, which only logs. The provider is selected by
//! the `MAIL_PROVIDER` environment variable ("mailgun" or "mock").

pub mod mailgun;
pub mod mock;

#[cfg(test)]
mod tests;

pub use mailgun::{MailgunConfig, MailgunMailer};
pub use mock::MockMailer;

use async_trait::async_trait;

use mc_core::services::stepup::Notifier;

use crate::InfrastructureError;

/// Email notifier dispatching to the configured provider
pub enum EmailNotifier {
    /// Mailgun HTTP API delivery
    Mailgun(MailgunMailer),
    /// Log-only delivery for development
    Mock(MockMailer),
}

impl EmailNotifier {
    /// Create the notifier selected by `MAIL_PROVIDER`
    pub fn from_env() -> Result<Self, InfrastructureError> {
        let provider =
            std::env::var("MAIL_PROVIDER").unwrap_or_else(|_| "mock".to_string());

        match provider.as_str() {
            "mailgun" => Ok(Self::Mailgun(MailgunMailer::from_env()?)),
            "mock" => Ok(Self::Mock(MockMailer::new())),
            other => Err(InfrastructureError::Config(format!(
                "Unknown MAIL_PROVIDER: {}",
                other
            ))),
        }
    }
}

#[async_trait]
impl Notifier for EmailNotifier {
    async fn send_code(
        &self,
        email: &str,
        code: &str,
        action_label: &str,
        validity_minutes: i64,
    ) -> Result<String, String> {
        match self {
            Self::Mailgun(mailer) => {
                mailer
                    .send_code(email, code, action_label, validity_minutes)
                    .await
            }
            Self::Mock(mailer) => {
                mailer
                    .send_code(email, code, action_label, validity_minutes)
                    .await
            }
        }
    }
}

/// Mask an email address for logging (keep first character and domain)
pub(crate) fn mask_email(email: &str) -> String {
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() => {
            format!("{}***@{}", &local[..1], domain)
        }
        _ => "***".to_string(),
    }
}
