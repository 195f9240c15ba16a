use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Comment entity - reader feedback attached to a post.
///
/// Only comments with `active` set are shown publicly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: i64,
    pub post_id: i64,
    pub name: String,
    pub email: String,
    pub body: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Comment {
    /// Create an unsaved comment. The store assigns the id on save.
    pub fn new(post_id: i64, name: String, email: String, body: String) -> Self {
        let now = Utc::now();
        Self {
            id: 0,
            post_id,
            name,
            email,
            body,
            active: true,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_saved(&self) -> bool {
        self.id != 0
    }
}
