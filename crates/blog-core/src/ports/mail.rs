use async_trait::async_trait;
use serde::Serialize;

/// Outbound plain-text message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MailMessage {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Mail transport - abstraction over SMTP and in-memory delivery.
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Deliver a message to its recipient.
    async fn send(&self, message: &MailMessage) -> Result<(), MailError>;
}

/// Mail delivery errors.
#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Failed to build message: {0}")]
    Build(String),

    #[error("Transport failed: {0}")]
    Transport(String),
}
