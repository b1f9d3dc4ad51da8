//! Mock mailer for development and testing.
//!
//! Never talks to the network: the code is written to the log so a
//! developer can complete the verification flow locally.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use tracing::info;
use uuid::Uuid;

use mc_core::services::stepup::Notifier;

use super::mask_email;

/// A message captured by the mock mailer
#[derive(Debug, Clone)]
pub struct MockMessage {
    /// Recipient address
    pub email: String,
    /// The dispatched code
    pub code: String,
    /// Action label named in the message
    pub action_label: String,
}

/// Log-only mailer implementation
pub struct MockMailer {
    sent: Arc<Mutex<Vec<MockMessage>>>,
    should_fail: bool,
}

impl MockMailer {
    /// Create a new mock mailer
    pub fn new() -> Self {
        Self {
            sent: Arc::new(Mutex::new(Vec::new())),
            should_fail: false,
        }
    }

    /// Create a mock mailer whose sends always fail
    pub fn failing() -> Self {
        Self {
            sent: Arc::new(Mutex::new(Vec::new())),
            should_fail: true,
        }
    }

    /// Messages captured so far
    pub fn sent_messages(&self) -> Vec<MockMessage> {
        self.sent.lock().unwrap().clone()
    }
}

impl Default for MockMailer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Notifier for MockMailer {
    async fn send_code(
        &self,
        email: &str,
        code: &str,
        action_label: &str,
        validity_minutes: i64,
    ) -> Result<String, String> {
        if self.should_fail {
            return Err("Mock mailer configured to fail".to_string());
        }

        info!(
            to = %mask_email(email),
            code = %code,
            action = %action_label,
            validity_minutes = validity_minutes,
            "Mock mailer: code email (development only)"
        );

        self.sent.lock().unwrap().push(MockMessage {
            email: email.to_string(),
            code: code.to_string(),
            action_label: action_label.to_string(),
        });

        Ok(format!("mock-{}", Uuid::new_v4()))
    }
}
