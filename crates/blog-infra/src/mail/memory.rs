//! In-memory mailer - keeps sent messages instead of delivering them.

use async_trait::async_trait;
use tokio::sync::RwLock;

use blog_core::ports::{MailError, MailMessage, Mailer};

use crate::mask_email;

/// Mailer that records messages in an outbox.
///
/// Used when SMTP is not configured and in tests.
#[derive(Default)]
pub struct InMemoryMailer {
    outbox: RwLock<Vec<MailMessage>>,
    fail_with: Option<String>,
}

impl InMemoryMailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// A mailer whose every send fails with a transport error.
    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            outbox: RwLock::default(),
            fail_with: Some(reason.into()),
        }
    }

    /// Messages sent so far, oldest first.
    pub async fn sent(&self) -> Vec<MailMessage> {
        self.outbox.read().await.clone()
    }
}

#[async_trait]
impl Mailer for InMemoryMailer {
    async fn send(&self, message: &MailMessage) -> Result<(), MailError> {
        if let Some(reason) = &self.fail_with {
            return Err(MailError::Transport(reason.clone()));
        }

        tracing::info!(to = %mask_email(&message.to), "Mail kept in in-memory outbox");
        self.outbox.write().await.push(message.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message() -> MailMessage {
        MailMessage {
            from: "blog@example.com".into(),
            to: "bob@example.com".into(),
            subject: "Hi".into(),
            body: "Body".into(),
        }
    }

    #[tokio::test]
    async fn test_outbox_records_messages() {
        let mailer = InMemoryMailer::new();
        mailer.send(&message()).await.unwrap();
        assert_eq!(mailer.sent().await, vec![message()]);
    }

    #[tokio::test]
    async fn test_failing_mailer_keeps_nothing() {
        let mailer = InMemoryMailer::failing("relay down");
        assert!(matches!(
            mailer.send(&message()).await,
            Err(MailError::Transport(_))
        ));
        assert!(mailer.sent().await.is_empty());
    }
}
