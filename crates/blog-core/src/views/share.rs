use serde::Serialize;

use crate::domain::Post;
use crate::error::DomainError;
use crate::forms::{self, EmailPostForm, FormState};
use crate::ports::{MailMessage, Mailer, PostRepository};

/// Mail settings for recommendations, fixed at startup.
#[derive(Debug, Clone)]
pub struct ShareSettings {
    /// Address recommendations are sent from.
    pub sender: String,
}

/// A submitted share form.
#[derive(Debug, Clone)]
pub struct ShareRequest {
    pub post_id: i64,
    /// Scheme and host the request came in on, e.g. `https://blog.example.com`.
    pub base_url: String,
    pub form: EmailPostForm,
}

#[derive(Debug, Clone, Serialize)]
pub struct ShareContext {
    pub post: Post,
    pub form: FormState<EmailPostForm>,
}

#[derive(Debug, Clone)]
pub enum ShareOutcome {
    /// Message delivered; redirect to the post.
    Sent {
        message: MailMessage,
        redirect_to: String,
    },
    /// Nothing sent; re-render the form with errors.
    Invalid(ShareContext),
}

pub async fn resolve_shared_post(
    posts: &dyn PostRepository,
    post_id: i64,
) -> Result<Post, DomainError> {
    posts
        .find_published_by_id(post_id)
        .await?
        .ok_or_else(|| DomainError::not_found("post", post_id))
}

/// Share page: the post and an empty form. Never sends anything.
pub async fn share_form(
    posts: &dyn PostRepository,
    post_id: i64,
) -> Result<ShareContext, DomainError> {
    let post = resolve_shared_post(posts, post_id).await?;
    Ok(ShareContext {
        post,
        form: FormState::unbound(),
    })
}

/// Validate the form and mail a recommendation of the post to `to`.
pub async fn post_share(
    posts: &dyn PostRepository,
    mailer: &dyn Mailer,
    settings: &ShareSettings,
    request: ShareRequest,
) -> Result<ShareOutcome, DomainError> {
    let post = resolve_shared_post(posts, request.post_id).await?;

    let form = match forms::bind(request.form) {
        Ok(form) => form,
        Err(state) => return Ok(ShareOutcome::Invalid(ShareContext { post, form: state })),
    };

    let message = compose_share_message(settings, &post, &request.base_url, &form);
    mailer.send(&message).await?;

    Ok(ShareOutcome::Sent {
        message,
        redirect_to: post.absolute_path(),
    })
}

/// Build the recommendation message for a validated form.
pub fn compose_share_message(
    settings: &ShareSettings,
    post: &Post,
    base_url: &str,
    form: &EmailPostForm,
) -> MailMessage {
    let name = form.name.as_deref().unwrap_or_default();
    let email = form.email.as_deref().unwrap_or_default();
    let comment = form.comment.as_deref().unwrap_or_default();
    let url = format!("{}{}", base_url.trim_end_matches('/'), post.absolute_path());

    MailMessage {
        from: settings.sender.clone(),
        to: form.to.clone().unwrap_or_default(),
        subject: format!("{name} ({email}) recommends you reading {}", post.title),
        body: format!("Read \"{}\" at {url}\n\n{name}'s comments: {comment}", post.title),
    }
}
