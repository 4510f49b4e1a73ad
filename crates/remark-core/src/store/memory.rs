//! In-memory storage engine

use super::engine::Engine;
use super::site::SiteData;
use crate::comment::Comment;
use crate::error::{RemarkError, Result};
use crate::types::{CommentId, DeleteMode, Locator, PostInfo};
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

/// In-memory comment storage, used for tests and embedding
#[derive(Default)]
pub struct MemoryEngine {
    sites: RwLock<HashMap<String, SiteData>>,
}

impl MemoryEngine {
    /// Create a new empty engine
    pub fn new() -> Self {
        Self::default()
    }

    fn read<T>(&self, site_id: &str, f: impl FnOnce(&SiteData) -> Result<T>) -> Result<T> {
        let sites = self.sites.read().unwrap_or_else(PoisonError::into_inner);
        let site = sites
            .get(site_id)
            .ok_or_else(|| RemarkError::NotFound(format!("site {:?}", site_id)))?;
        f(site)
    }

    fn write<T>(&self, site_id: &str, f: impl FnOnce(&mut SiteData) -> Result<T>) -> Result<T> {
        let mut sites = self.sites.write().unwrap_or_else(PoisonError::into_inner);
        let site = sites
            .get_mut(site_id)
            .ok_or_else(|| RemarkError::NotFound(format!("site {:?}", site_id)))?;
        f(site)
    }
}

impl Engine for MemoryEngine {
    fn create(&self, comment: Comment) -> Result<CommentId> {
        let mut sites = self.sites.write().unwrap_or_else(PoisonError::into_inner);
        sites
            .entry(comment.locator.site_id.clone())
            .or_default()
            .create(comment)
    }

    fn get(&self, locator: &Locator, id: &CommentId) -> Result<Comment> {
        self.read(&locator.site_id, |site| site.get(&locator.url, id))
    }

    fn put(&self, locator: &Locator, comment: Comment) -> Result<()> {
        self.write(&locator.site_id, |site| site.put(&locator.url, comment))
    }

    fn delete(&self, locator: &Locator, id: &CommentId, mode: DeleteMode) -> Result<()> {
        self.write(&locator.site_id, |site| site.delete(&locator.url, id, mode))
    }

    fn count(&self, locator: &Locator) -> Result<usize> {
        self.read(&locator.site_id, |site| site.count(&locator.url))
    }

    fn list(&self, site_id: &str, limit: usize, skip: usize) -> Result<Vec<PostInfo>> {
        self.read(site_id, |site| Ok(site.list(limit, skip)))
    }

    fn last(&self, site_id: &str, max: usize) -> Result<Vec<Comment>> {
        self.read(site_id, |site| Ok(site.last(max)))
    }
}
