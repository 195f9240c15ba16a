use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{Author, Tag};

/// Publication state of a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    Draft,
    Published,
}

/// Post entity - a blog article, loaded together with its author and tags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub author: Author,
    pub body: String,
    pub publish: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub status: PostStatus,
    pub tags: Vec<Tag>,
}

impl Post {
    /// Calendar date the post is published under, used in its URL.
    pub fn publish_date(&self) -> NaiveDate {
        self.publish.date_naive()
    }

    /// Path of the detail page, e.g. `/2024/3/7/hello-world/`.
    pub fn absolute_path(&self) -> String {
        let date = self.publish_date();
        format!(
            "/{}/{}/{}/{}/",
            date.year(),
            date.month(),
            date.day(),
            self.slug
        )
    }

    /// A post is publicly visible once published and its publish time has passed.
    pub fn is_public(&self, now: DateTime<Utc>) -> bool {
        self.status == PostStatus::Published && self.publish <= now
    }

    pub fn has_tag(&self, tag_id: i64) -> bool {
        self.tags.iter().any(|t| t.id == tag_id)
    }

    /// Number of tags this post shares with `other`.
    pub fn shared_tag_count(&self, other: &Post) -> usize {
        self.tags.iter().filter(|t| other.has_tag(t.id)).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn post(status: PostStatus, publish: DateTime<Utc>) -> Post {
        Post {
            id: 1,
            title: "Hello".into(),
            slug: "hello-world".into(),
            author: Author {
                id: 1,
                username: "admin".into(),
            },
            body: "Body".into(),
            publish,
            created_at: publish,
            updated_at: publish,
            status,
            tags: vec![Tag::new(1, "rust", "rust"), Tag::new(2, "web", "web")],
        }
    }

    #[test]
    fn test_absolute_path_has_no_zero_padding() {
        let publish = Utc.with_ymd_and_hms(2024, 3, 7, 10, 0, 0).unwrap();
        let post = post(PostStatus::Published, publish);
        assert_eq!(post.absolute_path(), "/2024/3/7/hello-world/");
    }

    #[test]
    fn test_is_public() {
        let now = Utc::now();
        assert!(post(PostStatus::Published, now - Duration::hours(1)).is_public(now));
        assert!(!post(PostStatus::Published, now + Duration::hours(1)).is_public(now));
        assert!(!post(PostStatus::Draft, now - Duration::hours(1)).is_public(now));
    }

    #[test]
    fn test_shared_tag_count() {
        let now = Utc::now();
        let a = post(PostStatus::Published, now);
        let mut b = post(PostStatus::Published, now);
        b.tags = vec![Tag::new(2, "web", "web"), Tag::new(3, "db", "db")];
        assert_eq!(a.shared_tag_count(&b), 1);
    }
}
