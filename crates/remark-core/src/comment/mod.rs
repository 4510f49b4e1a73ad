//! Comment model module
//!
//! Handles the comment data model, sanitizing, and validation.

pub mod model;
pub mod sanitize;
pub mod validator;
pub mod builder;

pub use model::*;
pub use validator::{CommentValidator, DEFAULT_MAX_COMMENT_SIZE};
pub use builder::CommentBuilder;
