//! Error types for remark-rs

use thiserror::Error;

/// Main error type for the comment store
#[derive(Debug, Error)]
pub enum RemarkError {
    /// Site secret or other provisioning data is missing
    #[error("Configuration error: {0}")]
    Config(String),

    /// Comment fields failed validation
    #[error("Validation error: {0}")]
    Validation(String),

    /// Request conflicts with the current comment state
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Comment, post or site not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Duplicate key on create
    #[error("Already exists: {0}")]
    AlreadyExists(String),

    /// Opaque storage engine failure
    #[error("Storage error: {0}")]
    Storage(String),

    /// Malformed import source
    #[error("Parse error: {0}")]
    Parse(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Generic error with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<RemarkError>,
    },
}

/// Coarse error classes callers map to responses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    Validation,
    Conflict,
    NotFound,
    Persistence,
}

impl ErrorKind {
    /// Server-side failures worth retrying later, as opposed to rejected requests
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorKind::Configuration | ErrorKind::Persistence)
    }
}

impl RemarkError {
    /// Add context to an error
    pub fn with_context(self, context: impl Into<String>) -> Self {
        RemarkError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Classify the error, looking through any context wrappers
    pub fn kind(&self) -> ErrorKind {
        match self {
            RemarkError::Config(_) => ErrorKind::Configuration,
            RemarkError::Validation(_) => ErrorKind::Validation,
            RemarkError::Conflict(_) => ErrorKind::Conflict,
            RemarkError::NotFound(_) => ErrorKind::NotFound,
            RemarkError::AlreadyExists(_)
            | RemarkError::Storage(_)
            | RemarkError::Parse(_)
            | RemarkError::Io(_)
            | RemarkError::Serde(_) => ErrorKind::Persistence,
            RemarkError::WithContext { source, .. } => source.kind(),
        }
    }
}

/// Result type alias for remark-rs
pub type Result<T> = std::result::Result<T, RemarkError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RemarkError::NotFound("comment c1".to_string());
        assert_eq!(err.to_string(), "Not found: comment c1");
    }

    #[test]
    fn test_error_with_context() {
        let err = RemarkError::Conflict("already voted".to_string());
        let err = err.with_context("vote on site1/https://example.com/post");
        assert!(err.to_string().contains("site1/https://example.com/post"));
        assert!(err.to_string().contains("already voted"));
    }

    #[test]
    fn test_kind_looks_through_context() {
        let err = RemarkError::Validation("empty".to_string())
            .with_context("outer")
            .with_context("outermost");
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_retryable_kinds() {
        assert!(RemarkError::Storage("disk".into()).kind().is_retryable());
        assert!(RemarkError::AlreadyExists("c1".into()).kind().is_retryable());
        assert!(RemarkError::Config("no secret".into()).kind().is_retryable());
        assert!(!RemarkError::Conflict("self vote".into()).kind().is_retryable());
        assert!(!RemarkError::NotFound("c1".into()).kind().is_retryable());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: RemarkError = io_err.into();
        assert!(matches!(err, RemarkError::Io(_)));
        assert_eq!(err.kind(), ErrorKind::Persistence);
    }
}
