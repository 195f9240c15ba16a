//! # Blog Infrastructure
//!
//! Concrete implementations of the ports defined in `blog-core`.
//! This crate contains the content store and mail transport integrations.
//!
//! ## Feature Flags
//!
//! - `full` (default) - All features enabled
//! - `minimal` - No external dependencies, in-memory only
//! - `postgres` - PostgreSQL content store via SeaORM
//! - `smtp` - SMTP mail delivery via lettre

pub mod database;
pub mod mail;
pub mod memory;

// Re-exports - In-Memory
pub use mail::InMemoryMailer;
pub use memory::InMemoryContentStore;

// Re-exports - External services
#[cfg(feature = "postgres")]
pub use database::DatabaseConnections;
#[cfg(feature = "smtp")]
pub use mail::{SmtpConfig, SmtpMailer};

/// Mask an e-mail address for logging, e.g. `a***@example.com`.
pub fn mask_email(email: &str) -> String {
    match email.split_once('@') {
        Some((local, domain)) => {
            let first = local.chars().next().map(String::from).unwrap_or_default();
            if local.chars().count() > 1 {
                format!("{first}***@{domain}")
            } else {
                format!("***@{domain}")
            }
        }
        None => "***".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::mask_email;

    #[test]
    fn test_mask_email() {
        assert_eq!(mask_email("alice@example.com"), "a***@example.com");
        assert_eq!(mask_email("a@example.com"), "***@example.com");
        assert_eq!(mask_email("nobody"), "***");
    }
}
