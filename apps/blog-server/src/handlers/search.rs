//! Search handler.

use actix_web::{HttpResponse, web};
use blog_core::views::{self, SearchRequest};
use blog_shared::dto::SearchQuery;

use crate::middleware::error::AppResult;
use crate::state::AppState;

/// GET /search/?query=...
pub async fn post_search(
    state: web::Data<AppState>,
    query: web::Query<SearchQuery>,
) -> AppResult<HttpResponse> {
    let request = SearchRequest {
        query: query.into_inner().query,
    };
    let context = views::post_search(state.posts.as_ref(), request).await?;

    Ok(HttpResponse::Ok().json(context))
}
