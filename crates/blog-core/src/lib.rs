//! # Blog Core
//!
//! The domain layer of the blog.
//! Entities, the ports infrastructure must implement, form validation and the
//! per-route view functions. Nothing in here talks to a database or a socket.

pub mod domain;
pub mod error;
pub mod forms;
pub mod pagination;
pub mod ports;
pub mod views;

pub use error::DomainError;
