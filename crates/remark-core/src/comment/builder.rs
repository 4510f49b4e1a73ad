//! Comment builder for fluent API

use super::model::Comment;
use crate::types::{CommentId, Locator};
use chrono::{DateTime, Utc};

/// Builder for creating comments with fluent API
///
/// Fields left unset keep the values that `DataStore::create` fills in
/// (ID, timestamp), so a built comment is ready to be created.
pub struct CommentBuilder {
    comment: Comment,
}

impl CommentBuilder {
    /// Create a new builder for a comment on the given page
    pub fn new(locator: Locator) -> Self {
        Self {
            comment: Comment {
                locator,
                ..Default::default()
            },
        }
    }

    /// Set an explicit comment ID
    pub fn id(mut self, id: impl Into<CommentId>) -> Self {
        self.comment.id = id.into();
        self
    }

    /// Reply to another comment
    pub fn parent(mut self, parent_id: impl Into<String>) -> Self {
        self.comment.parent_id = parent_id.into();
        self
    }

    /// Set both rendered text and raw input to the same value
    pub fn text(mut self, text: impl Into<String>) -> Self {
        let text = text.into();
        self.comment.orig = text.clone();
        self.comment.text = text;
        self
    }

    /// Set the raw author input only
    pub fn orig(mut self, orig: impl Into<String>) -> Self {
        self.comment.orig = orig.into();
        self
    }

    /// Set the author
    pub fn user(mut self, id: impl Into<String>, name: impl Into<String>) -> Self {
        self.comment.user.id = id.into();
        self.comment.user.name = name.into();
        self
    }

    /// Set the author's clear IP, hashed on create
    pub fn ip(mut self, ip: impl Into<String>) -> Self {
        self.comment.user.ip = ip.into();
        self
    }

    /// Set the creation time
    pub fn timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.comment.timestamp = timestamp;
        self
    }

    /// Build the comment
    pub fn build(self) -> Comment {
        self.comment
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_basic_builder() {
        let comment = CommentBuilder::new(Locator::new("site", "https://example.com/1"))
            .text("Test comment")
            .user("u1", "User One")
            .build();

        assert_eq!(comment.text, "Test comment");
        assert_eq!(comment.orig, "Test comment");
        assert_eq!(comment.user.id, "u1");
        assert!(comment.id.is_empty());
        assert!(comment.has_zero_timestamp());
        assert!(comment.edit.is_none());
    }

    #[test]
    fn test_builder_with_explicit_fields() {
        let ts = Utc.with_ymd_and_hms(2018, 1, 1, 9, 30, 0).unwrap();
        let comment = CommentBuilder::new(Locator::new("site", "https://example.com/1"))
            .id("c1")
            .parent("p1")
            .text("reply")
            .ip("10.0.0.1")
            .timestamp(ts)
            .build();

        assert_eq!(comment.id.as_str(), "c1");
        assert_eq!(comment.parent_id, "p1");
        assert_eq!(comment.user.ip, "10.0.0.1");
        assert_eq!(comment.timestamp, ts);
    }
}
