//! Share-by-email handlers.

use actix_web::{HttpRequest, HttpResponse, web};
use blog_core::forms::EmailPostForm;
use blog_core::views::{self, ShareOutcome, ShareRequest};
use blog_infra::mask_email;

use super::redirect;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// GET /{post_id}/share/
pub async fn share_form(
    state: web::Data<AppState>,
    path: web::Path<i64>,
) -> AppResult<HttpResponse> {
    let context = views::share_form(state.posts.as_ref(), path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(context))
}

/// POST /{post_id}/share/
pub async fn share_post(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<i64>,
    form: web::Form<EmailPostForm>,
) -> AppResult<HttpResponse> {
    let base_url = {
        let info = req.connection_info();
        format!("{}://{}", info.scheme(), info.host())
    };
    let post_id = path.into_inner();
    let request = ShareRequest {
        post_id,
        base_url,
        form: form.into_inner(),
    };

    let outcome = views::post_share(
        state.posts.as_ref(),
        state.mailer.as_ref(),
        &state.share,
        request,
    )
    .await?;

    match outcome {
        ShareOutcome::Sent {
            message,
            redirect_to,
        } => {
            tracing::info!(post_id, to = %mask_email(&message.to), "Post shared");
            Ok(redirect(&redirect_to))
        }
        ShareOutcome::Invalid(context) => Ok(HttpResponse::Ok().json(context)),
    }
}
