//! Ports - trait definitions for external dependencies.
//! These are the "interfaces" that infrastructure must implement.

mod mail;
mod repository;

pub use mail::{MailError, MailMessage, Mailer};
pub use repository::{BaseRepository, CommentRepository, PostRepository, SearchHit, TagRepository};
