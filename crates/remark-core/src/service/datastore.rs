//! Comment store service

use super::locks::ScopedLocks;
use crate::admin::AdminStore;
use crate::comment::{Comment, CommentValidator, Edit};
use crate::config::ServiceConfig;
use crate::error::{RemarkError, Result};
use crate::store::Engine;
use crate::types::{CommentId, DeleteMode, Locator, PostInfo};
use chrono::Utc;
use std::sync::{Arc, PoisonError};
use std::time::Duration;
use tracing::{debug, warn};

/// User allowed to vote for their own comments, for testing and administration
pub const DEV_USER_ID: &str = "dev";

/// Fields a comment author may change
#[derive(Debug, Clone, Default)]
pub struct EditRequest {
    pub text: String,
    pub orig: String,
    pub summary: String,
    pub delete: bool,
}

/// Comment service wrapping a storage engine
///
/// Prepares new comments (ID, timestamp, sanitizing, IP hashing) and
/// serializes vote updates per post URL.
pub struct DataStore {
    engine: Arc<dyn Engine>,
    admin: Arc<dyn AdminStore>,
    edit_duration: Duration,
    validator: CommentValidator,
    locks: ScopedLocks,
}

impl DataStore {
    /// Create a service with default settings
    pub fn new(engine: Arc<dyn Engine>, admin: Arc<dyn AdminStore>) -> Self {
        Self::with_config(engine, admin, &ServiceConfig::default())
    }

    pub fn with_config(
        engine: Arc<dyn Engine>,
        admin: Arc<dyn AdminStore>,
        config: &ServiceConfig,
    ) -> Self {
        Self {
            engine,
            admin,
            edit_duration: config.edit_duration(),
            validator: CommentValidator::with_max_size(config.max_comment_size),
            locks: ScopedLocks::new(),
        }
    }

    /// Set the edit window, zero disables it
    pub fn set_edit_duration(&mut self, edit_duration: Duration) {
        self.edit_duration = edit_duration;
    }

    pub fn set_max_comment_size(&mut self, max_size: usize) {
        self.validator = CommentValidator::with_max_size(max_size);
    }

    /// Prepare a new comment and store it
    pub fn create(&self, comment: Comment) -> Result<CommentId> {
        let comment = self
            .prepare_new_comment(comment)
            .map_err(|e| e.with_context("failed to prepare comment"))?;
        let locator = comment.locator.clone();
        self.engine
            .create(comment)
            .map_err(|e| e.with_context(format!("failed to create comment on {}", locator)))
    }

    /// Fill ID and time if empty, sanitize, and hash the author IP
    fn prepare_new_comment(&self, mut comment: Comment) -> Result<Comment> {
        if comment.id.is_empty() {
            comment.id = CommentId::generate();
        }
        if comment.has_zero_timestamp() {
            comment.timestamp = Utc::now();
        }
        comment.sanitize();

        let secret = self.admin.key(&comment.locator.site_id).map_err(|e| {
            e.with_context(format!("can't get secret for site {}", comment.locator.site_id))
        })?;
        comment.user.hash_ip(&secret);
        Ok(comment)
    }

    /// Pin or un-pin a comment
    pub fn set_pin(&self, locator: &Locator, id: &CommentId, status: bool) -> Result<()> {
        let lock = self.locks.lock_for(&locator.url);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        self.engine
            .get(locator, id)
            .and_then(|mut comment| {
                comment.pin = status;
                self.engine.put(locator, comment)
            })
            .map_err(|e| e.with_context(format!("can't set pin {} for {} on {}", status, id, locator)))
    }

    /// Vote for a comment
    ///
    /// Voting against an existing vote of the opposite direction removes that
    /// vote; changing up to down takes two calls.
    pub fn vote(
        &self,
        locator: &Locator,
        id: &CommentId,
        user_id: &str,
        upvote: bool,
    ) -> Result<Comment> {
        let lock = self.locks.lock_for(&locator.url);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        self.apply_vote(locator, id, user_id, upvote)
            .map_err(|e| e.with_context(format!("can't vote for {} on {}", id, locator)))
    }

    fn apply_vote(
        &self,
        locator: &Locator,
        id: &CommentId,
        user_id: &str,
        upvote: bool,
    ) -> Result<Comment> {
        let mut comment = self.engine.get(locator, id)?;

        if comment.user.id == user_id && user_id != DEV_USER_ID {
            return Err(RemarkError::Conflict(format!(
                "user {} can not vote for own comment {}",
                user_id, id
            )));
        }

        match comment.votes.get(user_id).copied() {
            Some(prev) if prev == upvote => {
                return Err(RemarkError::Conflict(format!(
                    "user {} already voted for {}",
                    user_id, id
                )));
            }
            Some(_) => {
                comment.votes.remove(user_id);
            }
            None => {
                comment.votes.insert(user_id.to_string(), upvote);
            }
        }
        comment.score += if upvote { 1 } else { -1 };

        debug!(
            "user {} voted {} for {} on {}, score {}",
            user_id,
            if upvote { "up" } else { "down" },
            id,
            locator,
            comment.score
        );
        self.engine.put(locator, comment.clone())?;
        Ok(comment)
    }

    /// Edit comment text or delete it
    ///
    /// Holds the same per-URL lock as [`vote`](Self::vote), so a concurrent
    /// vote is never overwritten by the stored copy of the comment.
    pub fn edit_comment(
        &self,
        locator: &Locator,
        id: &CommentId,
        req: EditRequest,
    ) -> Result<Comment> {
        let lock = self.locks.lock_for(&locator.url);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        self.apply_edit(locator, id, req)
            .map_err(|e| e.with_context(format!("can't edit {} on {}", id, locator)))
    }

    fn apply_edit(&self, locator: &Locator, id: &CommentId, req: EditRequest) -> Result<Comment> {
        let mut comment = self.engine.get(locator, id)?;

        if req.delete {
            comment.deleted = true;
            self.engine.delete(locator, id, DeleteMode::Soft)?;
            return Ok(comment);
        }

        let now = Utc::now();
        if !self.edit_duration.is_zero() {
            let elapsed = now.signed_duration_since(comment.timestamp);
            if elapsed.to_std().is_ok_and(|elapsed| elapsed > self.edit_duration) {
                return Err(RemarkError::Conflict(format!("too late to edit {}", id)));
            }
        }

        comment.text = req.text;
        comment.orig = req.orig;
        // edit time never precedes creation time, even for future-dated comments
        comment.edit = Some(Edit {
            timestamp: now.max(comment.timestamp),
            summary: req.summary,
        });
        comment.sanitize_content();

        self.engine.put(locator, comment.clone())?;
        Ok(comment)
    }

    /// Comment counts for the given post URLs, skipping failed lookups
    pub fn counts(&self, site_id: &str, post_urls: &[String]) -> Vec<PostInfo> {
        post_urls
            .iter()
            .filter_map(|url| {
                match self.engine.count(&Locator::new(site_id, url.as_str())) {
                    Ok(count) => Some(PostInfo {
                        url: url.clone(),
                        count,
                    }),
                    Err(e) => {
                        debug!("no count for {}/{}: {}", site_id, url, e);
                        None
                    }
                }
            })
            .collect()
    }

    /// Check comment size and user fields
    pub fn validate_comment(&self, comment: &Comment) -> Result<()> {
        self.validator.validate(comment)
    }

    /// Check if the user is in the site's admin list
    pub fn is_admin(&self, site_id: &str, user_id: &str) -> bool {
        self.admin.admins(site_id).iter().any(|a| a == user_id)
    }

    pub fn get(&self, locator: &Locator, id: &CommentId) -> Result<Comment> {
        self.engine.get(locator, id)
    }

    pub fn delete(&self, locator: &Locator, id: &CommentId, mode: DeleteMode) -> Result<()> {
        self.engine.delete(locator, id, mode).map_err(|e| {
            warn!("failed to delete {} on {}: {}", id, locator, e);
            e
        })
    }

    pub fn count(&self, locator: &Locator) -> Result<usize> {
        self.engine.count(locator)
    }

    pub fn list(&self, site_id: &str, limit: usize, skip: usize) -> Result<Vec<PostInfo>> {
        self.engine.list(site_id, limit, skip)
    }

    pub fn last(&self, site_id: &str, max: usize) -> Result<Vec<Comment>> {
        self.engine.last(site_id, max)
    }

    /// Defer persistence of `site_id` until [`end_bulk`](Self::end_bulk)
    pub fn begin_bulk(&self, site_id: &str) {
        self.engine.begin_bulk(site_id);
    }

    /// Persist everything written to `site_id` since [`begin_bulk`](Self::begin_bulk)
    pub fn end_bulk(&self, site_id: &str) -> Result<()> {
        self.engine
            .end_bulk(site_id)
            .map_err(|e| e.with_context(format!("can't flush site {}", site_id)))
    }

    /// Number of per-URL locks held by the service
    pub fn lock_count(&self) -> usize {
        self.locks.len()
    }
}
