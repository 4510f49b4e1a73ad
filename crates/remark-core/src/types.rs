//! Core type definitions for remark-rs

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a comment within a post thread
///
/// Generated IDs are UUID v4 strings; imported comments keep the source identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommentId(pub String);

impl CommentId {
    /// Generate a new random CommentId
    pub fn generate() -> Self {
        CommentId(Uuid::new_v4().to_string())
    }

    /// Create a CommentId from a string
    pub fn from_string(s: impl Into<String>) -> Self {
        CommentId(s.into())
    }

    /// True when no identifier has been assigned yet
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CommentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for CommentId {
    fn from(s: String) -> Self {
        CommentId(s)
    }
}

impl From<&str> for CommentId {
    fn from(s: &str) -> Self {
        CommentId(s.to_string())
    }
}

/// Identifies the page a comment thread belongs to
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Locator {
    /// Site identifier
    pub site_id: String,
    /// Page URL
    pub url: String,
}

impl Locator {
    pub fn new(site_id: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            site_id: site_id.into(),
            url: url.into(),
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.site_id, self.url)
    }
}

/// Comment count for a single post
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostInfo {
    pub url: String,
    pub count: usize,
}

/// How the storage engine removes a comment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteMode {
    /// Physically remove the record
    Hard,
    /// Keep the record as a tombstone
    Soft,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comment_id_generate() {
        let id1 = CommentId::generate();
        let id2 = CommentId::generate();
        assert!(!id1.is_empty());
        assert_ne!(id1, id2);
        assert!(Uuid::parse_str(id1.as_str()).is_ok());
    }

    #[test]
    fn test_comment_id_serializes_as_string() {
        let id = CommentId::from_string("299619020");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"299619020\"");
    }

    #[test]
    fn test_locator_display() {
        let locator = Locator::new("radio-t", "https://radio-t.com/p/1");
        assert_eq!(locator.to_string(), "radio-t/https://radio-t.com/p/1");
    }
}
