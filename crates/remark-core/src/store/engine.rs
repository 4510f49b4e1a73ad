//! Storage engine trait

use crate::comment::Comment;
use crate::error::Result;
use crate::types::{CommentId, DeleteMode, Locator, PostInfo};

/// Trait for comment storage engines
///
/// Implementations must be safe for concurrent use across distinct comment IDs.
/// Lookups of an absent site, locator or ID fail with `RemarkError::NotFound`;
/// creating a duplicate ID fails with `RemarkError::AlreadyExists`.
pub trait Engine: Send + Sync {
    /// Store a new comment, returning its ID
    fn create(&self, comment: Comment) -> Result<CommentId>;

    /// Get a comment by locator and ID
    fn get(&self, locator: &Locator, id: &CommentId) -> Result<Comment>;

    /// Replace an existing comment
    fn put(&self, locator: &Locator, comment: Comment) -> Result<()>;

    /// Remove a comment, physically or as a tombstone
    fn delete(&self, locator: &Locator, id: &CommentId, mode: DeleteMode) -> Result<()>;

    /// Number of comments on a post
    fn count(&self, locator: &Locator) -> Result<usize>;

    /// Posts of a site with their comment counts, zero limit means all
    fn list(&self, site_id: &str, limit: usize, skip: usize) -> Result<Vec<PostInfo>>;

    /// Most recent comments of a site, newest first
    fn last(&self, site_id: &str, max: usize) -> Result<Vec<Comment>>;

    /// Start a bulk write to `site_id`; engines may defer persistence until
    /// the matching [`end_bulk`](Engine::end_bulk)
    fn begin_bulk(&self, _site_id: &str) {}

    /// Finish a bulk write and persist deferred changes
    fn end_bulk(&self, _site_id: &str) -> Result<()> {
        Ok(())
    }
}
