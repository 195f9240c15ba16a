//! Post listing, detail and comment handlers.

use actix_web::{HttpResponse, web};
use blog_core::forms::CommentForm;
use blog_core::views::{self, CommentOutcome, PostKey, PostListRequest};
use blog_shared::dto::ListQuery;

use super::redirect;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// GET /
pub async fn post_list(
    state: web::Data<AppState>,
    query: web::Query<ListQuery>,
) -> AppResult<HttpResponse> {
    list(&state, None, query.into_inner()).await
}

/// GET /tag/{tag_slug}/
pub async fn post_list_by_tag(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<ListQuery>,
) -> AppResult<HttpResponse> {
    list(&state, Some(path.into_inner()), query.into_inner()).await
}

async fn list(state: &AppState, tag_slug: Option<String>, query: ListQuery) -> AppResult<HttpResponse> {
    let request = PostListRequest {
        tag_slug,
        page: query.page,
    };
    let context = views::post_list(state.posts.as_ref(), state.tags.as_ref(), request).await?;

    Ok(HttpResponse::Ok().json(context))
}

/// GET /{year}/{month}/{day}/{slug}/
pub async fn post_detail(
    state: web::Data<AppState>,
    path: web::Path<PostKey>,
) -> AppResult<HttpResponse> {
    let context =
        views::post_detail(state.posts.as_ref(), state.comments.as_ref(), &path).await?;

    Ok(HttpResponse::Ok().json(context))
}

/// POST /{year}/{month}/{day}/{slug}/
pub async fn post_comment(
    state: web::Data<AppState>,
    path: web::Path<PostKey>,
    form: web::Form<CommentForm>,
) -> AppResult<HttpResponse> {
    let outcome = views::post_comment(
        state.posts.as_ref(),
        state.comments.as_ref(),
        &path,
        form.into_inner(),
    )
    .await?;

    match outcome {
        CommentOutcome::Created {
            comment,
            redirect_to,
        } => {
            tracing::info!(
                post_id = comment.post_id,
                comment_id = comment.id,
                "Comment created"
            );
            Ok(redirect(&redirect_to))
        }
        CommentOutcome::Invalid(context) => {
            tracing::debug!(slug = %path.slug, "Comment rejected by validation");
            Ok(HttpResponse::Ok().json(context))
        }
    }
}
