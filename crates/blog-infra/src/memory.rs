//! In-memory content store - used when no database is configured, and in tests.

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use tokio::sync::RwLock;

use blog_core::domain::{Comment, Post, Tag};
use blog_core::error::RepoError;
use blog_core::ports::{BaseRepository, CommentRepository, PostRepository, SearchHit, TagRepository};
use blog_core::views::rank_similar;

#[derive(Default)]
struct Catalog {
    posts: Vec<Post>,
    tags: Vec<Tag>,
    comments: Vec<Comment>,
    last_comment_id: i64,
}

impl Catalog {
    /// Visible posts, newest first.
    fn published(&self, tag_id: Option<i64>) -> Vec<&Post> {
        let now = Utc::now();
        let mut posts: Vec<&Post> = self
            .posts
            .iter()
            .filter(|p| p.is_public(now))
            .filter(|p| tag_id.is_none_or(|id| p.has_tag(id)))
            .collect();
        posts.sort_by(|a, b| b.publish.cmp(&a.publish));
        posts
    }
}

/// Content store holding posts, tags and comments in a `RwLock`.
///
/// Note: Data is lost on process restart.
#[derive(Default)]
pub struct InMemoryContentStore {
    catalog: RwLock<Catalog>,
}

impl InMemoryContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a post, registering any of its tags not yet known.
    pub async fn add_post(&self, post: Post) {
        let mut catalog = self.catalog.write().await;
        for tag in &post.tags {
            if !catalog.tags.iter().any(|t| t.id == tag.id) {
                catalog.tags.push(tag.clone());
            }
        }
        catalog.posts.push(post);
    }

    pub async fn add_tag(&self, tag: Tag) {
        self.catalog.write().await.tags.push(tag);
    }

    /// All stored comments of a post, active or not.
    pub async fn comments_of(&self, post_id: i64) -> Vec<Comment> {
        self.catalog
            .read()
            .await
            .comments
            .iter()
            .filter(|c| c.post_id == post_id)
            .cloned()
            .collect()
    }
}

fn tokens(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
}

/// Every query term must occur in the title or body. The rank is the number
/// of occurrences, with title hits counting double.
fn relevance(post: &Post, terms: &[String]) -> Option<f32> {
    let title: Vec<String> = tokens(&post.title).collect();
    let body: Vec<String> = tokens(&post.body).collect();

    let mut rank = 0.0;
    for term in terms {
        let in_title = title.iter().filter(|t| *t == term).count();
        let in_body = body.iter().filter(|t| *t == term).count();
        if in_title + in_body == 0 {
            return None;
        }
        rank += (2 * in_title + in_body) as f32;
    }
    Some(rank)
}

#[async_trait]
impl PostRepository for InMemoryContentStore {
    async fn count_published(&self, tag_id: Option<i64>) -> Result<u64, RepoError> {
        Ok(self.catalog.read().await.published(tag_id).len() as u64)
    }

    async fn list_published(
        &self,
        tag_id: Option<i64>,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<Post>, RepoError> {
        Ok(self
            .catalog
            .read()
            .await
            .published(tag_id)
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn find_published_by_date(
        &self,
        date: NaiveDate,
        slug: &str,
    ) -> Result<Vec<Post>, RepoError> {
        let mut matches: Vec<Post> = self
            .catalog
            .read()
            .await
            .published(None)
            .into_iter()
            .filter(|p| p.slug == slug && p.publish_date() == date)
            .cloned()
            .collect();
        matches.sort_by_key(|p| p.publish);
        Ok(matches)
    }

    async fn find_published_by_id(&self, id: i64) -> Result<Option<Post>, RepoError> {
        Ok(self
            .catalog
            .read()
            .await
            .published(None)
            .into_iter()
            .find(|p| p.id == id)
            .cloned())
    }

    async fn find_similar(&self, post: &Post, limit: u64) -> Result<Vec<Post>, RepoError> {
        let candidates = self
            .catalog
            .read()
            .await
            .published(None)
            .into_iter()
            .cloned()
            .collect();
        Ok(rank_similar(post, candidates, limit))
    }

    async fn search(&self, query: &str) -> Result<Vec<SearchHit>, RepoError> {
        let terms: Vec<String> = tokens(query).collect();
        if terms.is_empty() {
            return Ok(Vec::new());
        }

        let catalog = self.catalog.read().await;
        let mut hits: Vec<SearchHit> = catalog
            .published(None)
            .into_iter()
            .filter_map(|post| {
                relevance(post, &terms).map(|rank| SearchHit {
                    post: post.clone(),
                    rank,
                })
            })
            .collect();
        hits.sort_by(|a, b| b.rank.total_cmp(&a.rank));
        Ok(hits)
    }
}

#[async_trait]
impl TagRepository for InMemoryContentStore {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Tag>, RepoError> {
        Ok(self
            .catalog
            .read()
            .await
            .tags
            .iter()
            .find(|t| t.slug == slug)
            .cloned())
    }
}

#[async_trait]
impl BaseRepository<Comment> for InMemoryContentStore {
    async fn save(&self, mut comment: Comment) -> Result<Comment, RepoError> {
        let mut catalog = self.catalog.write().await;
        if !catalog.posts.iter().any(|p| p.id == comment.post_id) {
            return Err(RepoError::Constraint(format!(
                "post {} does not exist",
                comment.post_id
            )));
        }

        if comment.is_saved() {
            let existing = catalog
                .comments
                .iter_mut()
                .find(|c| c.id == comment.id)
                .ok_or(RepoError::NotFound)?;
            comment.updated_at = Utc::now();
            *existing = comment.clone();
        } else {
            catalog.last_comment_id += 1;
            comment.id = catalog.last_comment_id;
            catalog.comments.push(comment.clone());
        }
        Ok(comment)
    }
}

#[async_trait]
impl CommentRepository for InMemoryContentStore {
    async fn find_active_by_post(&self, post_id: i64) -> Result<Vec<Comment>, RepoError> {
        let mut comments: Vec<Comment> = self
            .comments_of(post_id)
            .await
            .into_iter()
            .filter(|c| c.active)
            .collect();
        comments.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(comments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blog_core::domain::{Author, PostStatus};
    use chrono::{Duration, TimeZone};

    fn post(id: i64, title: &str, body: &str, status: PostStatus) -> Post {
        let publish = Utc.with_ymd_and_hms(2024, 1, id as u32, 9, 0, 0).unwrap();
        Post {
            id,
            title: title.into(),
            slug: format!("post-{id}"),
            author: Author {
                id: 1,
                username: "admin".into(),
            },
            body: body.into(),
            publish,
            created_at: publish,
            updated_at: publish,
            status,
            tags: vec![],
        }
    }

    #[tokio::test]
    async fn test_drafts_and_future_posts_are_hidden() {
        let store = InMemoryContentStore::new();
        store.add_post(post(1, "Visible", "", PostStatus::Published)).await;
        store.add_post(post(2, "Draft", "", PostStatus::Draft)).await;
        let mut future = post(3, "Future", "", PostStatus::Published);
        future.publish = Utc::now() + Duration::days(1);
        store.add_post(future).await;

        assert_eq!(store.count_published(None).await.unwrap(), 1);
        assert!(store.find_published_by_id(2).await.unwrap().is_none());
        assert!(store.find_published_by_id(3).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_search_requires_every_term() {
        let store = InMemoryContentStore::new();
        store
            .add_post(post(1, "Rust traits", "Traits in depth", PostStatus::Published))
            .await;
        store
            .add_post(post(2, "Go interfaces", "Like traits", PostStatus::Published))
            .await;

        let hits = store.search("Traits").await.unwrap();
        assert_eq!(hits.iter().map(|h| h.post.id).collect::<Vec<_>>(), vec![1, 2]);

        let hits = store.search("rust traits").await.unwrap();
        assert_eq!(hits.len(), 1);

        assert!(store.search("python").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_save_assigns_ids() {
        let store = InMemoryContentStore::new();
        store.add_post(post(1, "A", "", PostStatus::Published)).await;

        let first = store
            .save(Comment::new(1, "a".into(), "a@x.io".into(), "1".into()))
            .await
            .unwrap();
        let second = store
            .save(Comment::new(1, "b".into(), "b@x.io".into(), "2".into()))
            .await
            .unwrap();

        assert_eq!((first.id, second.id), (1, 2));
        assert_eq!(store.comments_of(1).await.last(), Some(&second));
    }

    #[tokio::test]
    async fn test_save_rejects_unknown_post() {
        let store = InMemoryContentStore::new();
        let err = store
            .save(Comment::new(9, "a".into(), "a@x.io".into(), "1".into()))
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::Constraint(_)));
    }
}
