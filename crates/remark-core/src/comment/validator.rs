//! Comment validation

use super::model::Comment;
use crate::error::{RemarkError, Result};

/// Maximum comment length in characters (default)
pub const DEFAULT_MAX_COMMENT_SIZE: usize = 2000;

/// Validator for incoming comments
#[derive(Debug, Clone, Copy)]
pub struct CommentValidator {
    max_size: usize,
}

impl CommentValidator {
    /// Create a new validator with default settings
    pub fn new() -> Self {
        Self {
            max_size: DEFAULT_MAX_COMMENT_SIZE,
        }
    }

    /// Create a validator with a custom max size, zero means default
    pub fn with_max_size(max_size: usize) -> Self {
        let max_size = if max_size == 0 {
            DEFAULT_MAX_COMMENT_SIZE
        } else {
            max_size
        };
        Self { max_size }
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Validate the raw author text
    pub fn validate_content(&self, orig: &str) -> Result<()> {
        if orig.is_empty() {
            return Err(RemarkError::Validation("empty comment text".to_string()));
        }

        let size = orig.chars().count();
        if size > self.max_size {
            return Err(RemarkError::Validation(format!(
                "comment text exceeded max allowed size {} ({})",
                self.max_size, size
            )));
        }

        Ok(())
    }

    /// Validate a complete comment
    pub fn validate(&self, comment: &Comment) -> Result<()> {
        self.validate_content(&comment.orig)?;

        if comment.user.id.is_empty() || comment.user.name.is_empty() {
            return Err(RemarkError::Validation("empty user info".to_string()));
        }

        Ok(())
    }
}

impl Default for CommentValidator {
    fn default() -> Self {
        Self::new()
    }
}
