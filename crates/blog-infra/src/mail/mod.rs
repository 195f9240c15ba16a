//! Mail transports - SMTP and in-memory outbox.

mod memory;

#[cfg(feature = "smtp")]
mod smtp;

pub use memory::InMemoryMailer;

#[cfg(feature = "smtp")]
pub use smtp::{SmtpConfig, SmtpMailer};
