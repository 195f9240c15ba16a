use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::{Comment, Post, Tag};
use crate::error::RepoError;

/// Write access for entities the views persist.
#[async_trait]
pub trait BaseRepository<T>: Send + Sync {
    /// Save an entity (create when unsaved, update otherwise).
    async fn save(&self, entity: T) -> Result<T, RepoError>;
}

/// A post matched by full-text search with its relevance rank.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct SearchHit {
    pub post: Post,
    pub rank: f32,
}

/// Read access to posts.
///
/// Every method only sees publicly visible posts (published, publish time
/// passed) and returns them with author and tags loaded.
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Count visible posts, optionally restricted to one tag.
    async fn count_published(&self, tag_id: Option<i64>) -> Result<u64, RepoError>;

    /// A window of visible posts, newest first.
    async fn list_published(
        &self,
        tag_id: Option<i64>,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<Post>, RepoError>;

    /// Visible posts published on `date` with the given slug, oldest first.
    ///
    /// Slugs are not unique per day in storage, so more than one may match.
    async fn find_published_by_date(
        &self,
        date: NaiveDate,
        slug: &str,
    ) -> Result<Vec<Post>, RepoError>;

    async fn find_published_by_id(&self, id: i64) -> Result<Option<Post>, RepoError>;

    /// Up to `limit` visible posts other than `post` sharing at least one tag
    /// with it, most shared tags first, newer first on ties.
    async fn find_similar(&self, post: &Post, limit: u64) -> Result<Vec<Post>, RepoError>;

    /// Visible posts whose title or body match `query`, best match first.
    async fn search(&self, query: &str) -> Result<Vec<SearchHit>, RepoError>;
}

/// Tag lookup.
#[async_trait]
pub trait TagRepository: Send + Sync {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Tag>, RepoError>;
}

/// Comment repository.
#[async_trait]
pub trait CommentRepository: BaseRepository<Comment> {
    /// Active comments of a post, oldest first.
    async fn find_active_by_post(&self, post_id: i64) -> Result<Vec<Comment>, RepoError>;
}
