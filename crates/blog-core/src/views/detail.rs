use std::collections::HashSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{Comment, Post};
use crate::error::DomainError;
use crate::forms::{self, CommentForm, FormState};
use crate::ports::{BaseRepository, CommentRepository, PostRepository};

/// How many similar posts the detail page shows.
pub const SIMILAR_POSTS_LIMIT: u64 = 4;

/// Path parameters identifying a post: publish date and slug.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PostKey {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub slug: String,
}

impl PostKey {
    pub fn date(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, self.day)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PostDetailContext {
    pub post: Post,
    pub comments: Vec<Comment>,
    pub similar_posts: Vec<Post>,
    pub form: FormState<CommentForm>,
}

/// Result of submitting a comment.
#[derive(Debug, Clone)]
pub enum CommentOutcome {
    /// Comment stored; redirect to the post.
    Created {
        comment: Comment,
        redirect_to: String,
    },
    /// Nothing stored; re-render the detail page with errors.
    Invalid(Box<PostDetailContext>),
}

/// Look up the published post identified by `key`.
///
/// Shared by the read and comment paths. An impossible date is NotFound,
/// and so is a key matching more than one post.
pub async fn resolve_post(posts: &dyn PostRepository, key: &PostKey) -> Result<Post, DomainError> {
    let not_found = || DomainError::not_found("post", &key.slug);
    let date = key.date().ok_or_else(not_found)?;

    let mut matches = posts.find_published_by_date(date, &key.slug).await?;
    if matches.len() > 1 {
        return Err(not_found());
    }
    matches.pop().ok_or_else(not_found)
}

/// Detail page: the post, its active comments, similar posts and an empty form.
pub async fn post_detail(
    posts: &dyn PostRepository,
    comments: &dyn CommentRepository,
    key: &PostKey,
) -> Result<PostDetailContext, DomainError> {
    let post = resolve_post(posts, key).await?;
    detail_context(posts, comments, post, FormState::unbound()).await
}

/// Validate and store a comment on the post identified by `key`.
pub async fn post_comment(
    posts: &dyn PostRepository,
    comments: &dyn CommentRepository,
    key: &PostKey,
    form: CommentForm,
) -> Result<CommentOutcome, DomainError> {
    let post = resolve_post(posts, key).await?;

    match forms::bind(form) {
        Ok(data) => {
            let comment = Comment::new(
                post.id,
                data.name.unwrap_or_default(),
                data.email.unwrap_or_default(),
                data.body.unwrap_or_default(),
            );
            let comment = comments.save(comment).await?;
            Ok(CommentOutcome::Created {
                comment,
                redirect_to: post.absolute_path(),
            })
        }
        Err(state) => {
            let context = detail_context(posts, comments, post, state).await?;
            Ok(CommentOutcome::Invalid(Box::new(context)))
        }
    }
}

async fn detail_context(
    posts: &dyn PostRepository,
    comments: &dyn CommentRepository,
    post: Post,
    form: FormState<CommentForm>,
) -> Result<PostDetailContext, DomainError> {
    let active = comments.find_active_by_post(post.id).await?;
    let similar_posts = posts.find_similar(&post, SIMILAR_POSTS_LIMIT).await?;

    Ok(PostDetailContext {
        post,
        comments: active,
        similar_posts,
        form,
    })
}

/// Rank `candidates` by tags shared with `post`, most shared first, newer
/// first on ties. Excludes `post` itself and posts sharing no tag.
///
/// For stores that rank in process rather than in a query.
pub fn rank_similar(post: &Post, candidates: Vec<Post>, limit: u64) -> Vec<Post> {
    let mut seen = HashSet::new();
    let mut scored: Vec<(usize, Post)> = candidates
        .into_iter()
        .filter(|c| c.id != post.id && seen.insert(c.id))
        .map(|c| (post.shared_tag_count(&c), c))
        .filter(|(shared, _)| *shared > 0)
        .collect();

    scored.sort_by(|(a_shared, a), (b_shared, b)| {
        b_shared
            .cmp(a_shared)
            .then_with(|| b.publish.cmp(&a.publish))
    });

    scored
        .into_iter()
        .take(usize::try_from(limit).unwrap_or(usize::MAX))
        .map(|(_, p)| p)
        .collect()
}
