//! Application state - shared across all handlers.

use std::sync::Arc;

use blog_core::ports::{CommentRepository, Mailer, PostRepository, TagRepository};
use blog_core::views::ShareSettings;
use blog_infra::{InMemoryContentStore, InMemoryMailer, mask_email};

#[cfg(feature = "postgres")]
use blog_infra::database::{
    DatabaseConnections, PostgresCommentRepository, PostgresPostRepository, PostgresTagRepository,
};

use crate::config::{AppConfig, MailConfig};

/// Which content store backs the repositories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

impl StoreBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreBackend::Postgres => "postgres",
            StoreBackend::Memory => "memory",
        }
    }
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub posts: Arc<dyn PostRepository>,
    pub tags: Arc<dyn TagRepository>,
    pub comments: Arc<dyn CommentRepository>,
    pub mailer: Arc<dyn Mailer>,
    pub share: ShareSettings,
    pub backend: StoreBackend,
    #[cfg(feature = "postgres")]
    pub db: Option<Arc<DatabaseConnections>>,
}

impl AppState {
    /// Build the application state with appropriate implementations.
    pub async fn new(config: &AppConfig) -> Self {
        let mailer = build_mailer(&config.mail);
        let share = ShareSettings {
            sender: config.mail.sender.clone(),
        };

        let state = match Self::postgres(config, mailer.clone(), share.clone()).await {
            Some(state) => state,
            None => Self::in_memory(Arc::new(InMemoryContentStore::new()), mailer, share),
        };

        tracing::info!(
            store = state.backend.as_str(),
            sender = %mask_email(&state.share.sender),
            "Application state initialized"
        );
        state
    }

    /// State backed by an in-memory content store.
    pub fn in_memory(
        store: Arc<InMemoryContentStore>,
        mailer: Arc<dyn Mailer>,
        share: ShareSettings,
    ) -> Self {
        Self {
            posts: store.clone(),
            tags: store.clone(),
            comments: store,
            mailer,
            share,
            backend: StoreBackend::Memory,
            #[cfg(feature = "postgres")]
            db: None,
        }
    }

    #[cfg(feature = "postgres")]
    async fn postgres(
        config: &AppConfig,
        mailer: Arc<dyn Mailer>,
        share: ShareSettings,
    ) -> Option<Self> {
        let Some(db_config) = &config.database else {
            tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
            return None;
        };

        let connections = match DatabaseConnections::init(db_config).await {
            Ok(connections) => connections,
            Err(e) => {
                tracing::error!(
                    "Failed to connect to database: {}. Using in-memory fallback.",
                    e
                );
                return None;
            }
        };

        if config.run_migrations {
            use migration::{Migrator, MigratorTrait};

            if let Err(e) = Migrator::up(&connections.main, None).await {
                tracing::error!("Failed to apply migrations: {}. Using in-memory fallback.", e);
                return None;
            }
            tracing::info!("Migrations applied");
        }

        let conn = Arc::new(connections);
        Some(Self {
            posts: Arc::new(PostgresPostRepository::new(conn.main.clone())),
            tags: Arc::new(PostgresTagRepository::new(conn.main.clone())),
            comments: Arc::new(PostgresCommentRepository::new(conn.main.clone())),
            mailer,
            share,
            backend: StoreBackend::Postgres,
            db: Some(conn),
        })
    }

    #[cfg(not(feature = "postgres"))]
    async fn postgres(
        config: &AppConfig,
        _mailer: Arc<dyn Mailer>,
        _share: ShareSettings,
    ) -> Option<Self> {
        if config.database.is_some() {
            tracing::warn!("Built without postgres feature - ignoring DATABASE_URL");
        }
        None
    }

    /// Whether the content store is reachable.
    pub async fn store_healthy(&self) -> bool {
        #[cfg(feature = "postgres")]
        if let Some(db) = &self.db {
            return db.ping().await;
        }
        true
    }
}

fn build_mailer(config: &MailConfig) -> Arc<dyn Mailer> {
    if let Some(mailer) = smtp_mailer(config) {
        return mailer;
    }
    tracing::warn!("SMTP not configured; mail is kept in an in-memory outbox");
    Arc::new(InMemoryMailer::new())
}

#[cfg(feature = "smtp")]
fn smtp_mailer(config: &MailConfig) -> Option<Arc<dyn Mailer>> {
    use blog_infra::{SmtpConfig, SmtpMailer};

    let host = config.smtp_host.clone()?;
    let smtp = SmtpConfig {
        host,
        port: config.smtp_port,
        username: config.smtp_username.clone(),
        password: config.smtp_password.clone(),
        starttls: config.smtp_starttls,
    };

    match SmtpMailer::new(&smtp) {
        Ok(mailer) => Some(Arc::new(mailer)),
        Err(e) => {
            tracing::error!("Failed to configure SMTP: {}", e);
            None
        }
    }
}

#[cfg(not(feature = "smtp"))]
fn smtp_mailer(config: &MailConfig) -> Option<Arc<dyn Mailer>> {
    if config.smtp_host.is_some() {
        tracing::warn!("Built without smtp feature - ignoring SMTP_HOST");
    }
    None
}
