//! Comment data models

use super::sanitize::{escape_text, sanitize_html};
use crate::types::{CommentId, Locator};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Context string for deriving the per-site IP hashing key
const IP_HASH_CONTEXT: &str = "remark-rs 2024 user ip hash";

/// A comment attached to a page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    /// Comment identifier, unique within the thread
    pub id: CommentId,
    /// Page the thread belongs to
    pub locator: Locator,
    /// Parent comment for replies, empty for top-level comments
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub parent_id: String,
    /// Sanitized HTML
    pub text: String,
    /// Raw author input
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub orig: String,
    /// Creation time
    pub timestamp: DateTime<Utc>,
    /// Author
    pub user: User,
    /// Net vote score
    #[serde(default)]
    pub score: i32,
    /// Votes by user ID, true for upvote
    #[serde(default)]
    pub votes: HashMap<String, bool>,
    /// Pinned by an admin
    #[serde(default)]
    pub pin: bool,
    /// Soft-delete flag
    #[serde(default)]
    pub deleted: bool,
    /// Last edit, absent on unedited comments
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edit: Option<Edit>,
}

impl Comment {
    /// True when no creation time has been assigned
    pub fn has_zero_timestamp(&self) -> bool {
        self.timestamp == DateTime::<Utc>::default()
    }

    /// Clear markup from the body fields and escape the display name; the user ID is kept as is
    pub fn sanitize(&mut self) {
        self.sanitize_content();
        self.user.name = escape_text(&self.user.name);
    }

    /// Sanitize only the author-editable body fields
    pub fn sanitize_content(&mut self) {
        self.text = sanitize_html(&self.text);
        self.orig = sanitize_html(&self.orig);
    }
}

/// Comment author
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Stable per-site pseudonymous ID
    pub id: String,
    /// Display name
    pub name: String,
    /// Keyed hash of the author's IP once stored
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub ip: String,
}

impl User {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ip: String::new(),
        }
    }

    /// Replace the clear IP with its hash keyed by the site secret
    pub fn hash_ip(&mut self, secret: &str) {
        if self.ip.is_empty() {
            return;
        }
        self.ip = hash_value(&self.ip, secret);
    }
}

/// Edit information for a changed comment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edit {
    pub timestamp: DateTime<Utc>,
    pub summary: String,
}

/// Deterministic keyed hash of `value`, hex encoded
pub fn hash_value(value: &str, secret: &str) -> String {
    let key = blake3::derive_key(IP_HASH_CONTEXT, secret.as_bytes());
    blake3::keyed_hash(&key, value.as_bytes()).to_hex().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_comment() -> Comment {
        Comment {
            id: CommentId::from_string("c1"),
            locator: Locator::new("radio-t", "https://radio-t.com/p/1"),
            text: "some text".to_string(),
            orig: "some text".to_string(),
            user: User {
                id: "user1".to_string(),
                name: "User One".to_string(),
                ip: "127.0.0.1".to_string(),
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_zero_timestamp() {
        let mut comment = create_test_comment();
        assert!(comment.has_zero_timestamp());
        comment.timestamp = Utc::now();
        assert!(!comment.has_zero_timestamp());
    }

    #[test]
    fn test_hash_ip_deterministic() {
        let mut u1 = create_test_comment().user;
        let mut u2 = create_test_comment().user;
        u1.hash_ip("secret");
        u2.hash_ip("secret");
        assert_eq!(u1.ip, u2.ip);
        assert_ne!(u1.ip, "127.0.0.1");
        assert_eq!(u1.ip.len(), 64);

        let mut u3 = create_test_comment().user;
        u3.hash_ip("other-secret");
        assert_ne!(u1.ip, u3.ip);
    }

    #[test]
    fn test_hash_ip_empty_stays_empty() {
        let mut user = User::new("user1", "User One");
        user.hash_ip("secret");
        assert!(user.ip.is_empty());
    }

    #[test]
    fn test_sanitize_strips_script() {
        let mut comment = create_test_comment();
        comment.text = "<p>hello</p><script>alert(1)</script>".to_string();
        comment.orig = "hi <script>alert(1)</script>".to_string();
        comment.user.name = "<b>bad</b>".to_string();
        comment.sanitize();
        assert_eq!(comment.text, "<p>hello</p>");
        assert!(!comment.orig.contains("<script>"));
        assert_eq!(comment.user.name, "&lt;b&gt;bad&lt;/b&gt;");
    }

    #[test]
    fn test_sanitize_keeps_user_id() {
        let mut comment = create_test_comment();
        comment.user.id = "tom&jerry".to_string();
        comment.user.name = "Tom & Jerry".to_string();
        comment.sanitize();
        assert_eq!(comment.user.id, "tom&jerry");
        assert_eq!(comment.user.name, "Tom &amp; Jerry");
    }

    #[test]
    fn test_comment_serialization() {
        let mut comment = create_test_comment();
        comment.votes.insert("user2".to_string(), true);
        comment.edit = Some(Edit {
            timestamp: Utc::now(),
            summary: "typo".to_string(),
        });
        let json = serde_json::to_string(&comment).unwrap();
        let comment2: Comment = serde_json::from_str(&json).unwrap();
        assert_eq!(comment, comment2);
    }

    #[test]
    fn test_original_comment_has_no_edit() {
        let json = serde_json::to_string(&create_test_comment()).unwrap();
        assert!(!json.contains("\"edit\""));
    }
}
