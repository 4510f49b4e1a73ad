//! Per-site comment collection shared by the bundled engines

use crate::comment::Comment;
use crate::error::{RemarkError, Result};
use crate::types::{CommentId, DeleteMode, PostInfo};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// All comments of one site, grouped by post URL
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SiteData {
    /// Comments per post URL, in creation order
    #[serde(default)]
    pub posts: BTreeMap<String, Vec<Comment>>,
}

impl SiteData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a new comment, rejecting duplicate IDs within the post
    pub fn create(&mut self, comment: Comment) -> Result<CommentId> {
        let comments = self.posts.entry(comment.locator.url.clone()).or_default();
        if comments.iter().any(|c| c.id == comment.id) {
            return Err(RemarkError::AlreadyExists(format!(
                "key {} already in store",
                comment.id
            )));
        }
        let id = comment.id.clone();
        comments.push(comment);
        Ok(id)
    }

    pub fn get(&self, url: &str, id: &CommentId) -> Result<Comment> {
        self.find(url, id).cloned()
    }

    /// Replace a stored comment with the same ID
    pub fn put(&mut self, url: &str, comment: Comment) -> Result<()> {
        let existing = self.find_mut(url, &comment.id)?;
        *existing = comment;
        Ok(())
    }

    pub fn delete(&mut self, url: &str, id: &CommentId, mode: DeleteMode) -> Result<()> {
        match mode {
            DeleteMode::Soft => {
                let comment = self.find_mut(url, id)?;
                comment.deleted = true;
                comment.text.clear();
                comment.orig.clear();
                comment.score = 0;
                comment.votes.clear();
                comment.edit = None;
                comment.pin = false;
            }
            DeleteMode::Hard => {
                let comments = self.post(url)?;
                let before = comments.len();
                comments.retain(|c| &c.id != id);
                if comments.len() == before {
                    return Err(not_found(url, id));
                }
            }
        }
        Ok(())
    }

    /// Number of live comments on a post
    pub fn count(&self, url: &str) -> Result<usize> {
        let comments = self
            .posts
            .get(url)
            .ok_or_else(|| RemarkError::NotFound(format!("post {}", url)))?;
        Ok(comments.iter().filter(|c| !c.deleted).count())
    }

    pub fn list(&self, limit: usize, skip: usize) -> Vec<PostInfo> {
        let posts = self.posts.iter().skip(skip).map(|(url, comments)| PostInfo {
            url: url.clone(),
            count: comments.iter().filter(|c| !c.deleted).count(),
        });
        if limit == 0 {
            posts.collect()
        } else {
            posts.take(limit).collect()
        }
    }

    /// Newest live comments across all posts
    pub fn last(&self, max: usize) -> Vec<Comment> {
        let mut comments: Vec<&Comment> = self
            .posts
            .values()
            .flatten()
            .filter(|c| !c.deleted)
            .collect();
        comments.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        comments.into_iter().take(max).cloned().collect()
    }

    fn find(&self, url: &str, id: &CommentId) -> Result<&Comment> {
        self.posts
            .get(url)
            .and_then(|comments| comments.iter().find(|c| &c.id == id))
            .ok_or_else(|| not_found(url, id))
    }

    fn find_mut(&mut self, url: &str, id: &CommentId) -> Result<&mut Comment> {
        self.posts
            .get_mut(url)
            .and_then(|comments| comments.iter_mut().find(|c| &c.id == id))
            .ok_or_else(|| not_found(url, id))
    }

    fn post(&mut self, url: &str) -> Result<&mut Vec<Comment>> {
        self.posts
            .get_mut(url)
            .ok_or_else(|| RemarkError::NotFound(format!("post {}", url)))
    }
}

fn not_found(url: &str, id: &CommentId) -> RemarkError {
    RemarkError::NotFound(format!("comment {} on {}", id, url))
}
