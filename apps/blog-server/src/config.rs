//! Application configuration loaded from environment variables.

use std::env;

use blog_infra::database::DatabaseConfig;

use crate::telemetry::TelemetryConfig;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database: Option<DatabaseConfig>,
    /// Apply pending migrations before serving.
    pub run_migrations: bool,
    pub mail: MailConfig,
    pub telemetry: TelemetryConfig,
}

/// Outbound mail settings.
#[derive(Debug, Clone)]
pub struct MailConfig {
    /// Address recommendations are sent from.
    pub sender: String,
    /// SMTP relay; without one, mail goes to an in-memory outbox.
    pub smtp_host: Option<String>,
    pub smtp_port: u16,
    pub smtp_username: Option<String>,
    pub smtp_password: Option<String>,
    pub smtp_starttls: bool,
}

fn parse_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

fn flag(key: &str, default: bool) -> bool {
    env::var(key)
        .map(|v| !matches!(v.to_lowercase().as_str(), "false" | "0" | "no"))
        .unwrap_or(default)
}

fn non_empty(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let database = non_empty("DATABASE_URL").map(|url| DatabaseConfig {
            url,
            max_connections: parse_or("DB_MAX_CONNECTIONS", 20),
            min_connections: parse_or("DB_MIN_CONNECTIONS", 2),
        });

        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: parse_or("PORT", 8080),
            database,
            run_migrations: flag("RUN_MIGRATIONS", false),
            mail: MailConfig::from_env(),
            telemetry: TelemetryConfig::from_env(),
        }
    }
}

impl MailConfig {
    pub fn from_env() -> Self {
        Self {
            sender: non_empty("EMAIL_HOST_USER").unwrap_or_else(|| "noreply@localhost".to_string()),
            smtp_host: non_empty("SMTP_HOST"),
            smtp_port: parse_or("SMTP_PORT", 587),
            smtp_username: non_empty("SMTP_USERNAME"),
            smtp_password: non_empty("SMTP_PASSWORD"),
            smtp_starttls: flag("SMTP_STARTTLS", true),
        }
    }
}
