//! View dispatch core - one function per route.
//!
//! Each view takes the ports it needs plus a typed request and returns a typed
//! context for the renderer. Write views return an outcome: either the redirect
//! target after the side effect, or the context to re-render with form errors.

mod detail;
mod list;
mod search;
mod share;

pub use detail::{
    CommentOutcome, PostDetailContext, PostKey, SIMILAR_POSTS_LIMIT, post_comment, post_detail,
    rank_similar, resolve_post,
};
pub use list::{PostListContext, PostListRequest, post_list};
pub use search::{SearchContext, SearchRequest, post_search};
pub use share::{
    ShareContext, ShareOutcome, ShareRequest, ShareSettings, compose_share_message, post_share,
    resolve_shared_post, share_form,
};
