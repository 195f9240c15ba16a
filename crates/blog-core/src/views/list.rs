use serde::{Deserialize, Serialize};

use crate::domain::{Post, Tag};
use crate::error::DomainError;
use crate::pagination::{self, POSTS_PER_PAGE, Page};
use crate::ports::{PostRepository, TagRepository};

/// Listing request: optional tag filter and raw `page` parameter.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostListRequest {
    pub tag_slug: Option<String>,
    pub page: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PostListContext {
    pub tag: Option<Tag>,
    pub page: Page<Post>,
}

/// Published posts, newest first, optionally filtered by tag.
///
/// An unknown tag slug or a page outside the listing is NotFound.
pub async fn post_list(
    posts: &dyn PostRepository,
    tags: &dyn TagRepository,
    request: PostListRequest,
) -> Result<PostListContext, DomainError> {
    let tag = match request.tag_slug.as_deref() {
        Some(slug) => Some(
            tags.find_by_slug(slug)
                .await?
                .ok_or_else(|| DomainError::not_found("tag", slug))?,
        ),
        None => None,
    };
    let tag_id = tag.as_ref().map(|t| t.id);

    let total = posts.count_published(tag_id).await?;
    let number = pagination::resolve_page(request.page.as_deref(), total, POSTS_PER_PAGE)?;
    let items = posts
        .list_published(
            tag_id,
            pagination::offset(number, POSTS_PER_PAGE),
            POSTS_PER_PAGE,
        )
        .await?;

    Ok(PostListContext {
        tag,
        page: Page::new(
            items,
            number,
            pagination::num_pages(total, POSTS_PER_PAGE),
            total,
        ),
    })
}
