//! Unified Error Type System
//!
//! Centralized error types for the entire application.
//!
//! ## Error Taxonomy
//!
//! - **InvalidInput**: caller misuse (empty fragment list) - surfaced
//!   immediately, never retried
//! - **Config**: missing credential or bad setting - fail fast at the start
//!   of the affected flow
//! - **Api / Transport / MalformedResponse**: non-transient provider
//!   failures - surfaced immediately with the provider message
//! - **RetriesExhausted**: the rate-limit attempt budget ran out
//! - **NoJsonFound / Schema**: extraction-time failures - surfaced with a
//!   generic user message, raw text retained for diagnostic logging only
//!
//! Rate limiting itself is not an error variant: it is a transient
//! [`ModelOutcome`](crate::ai::ModelOutcome) handled inside the retry
//! governor and only becomes `RetriesExhausted` once the budget is spent.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TreeError {
    // -------------------------------------------------------------------------
    // Caller / configuration errors
    // -------------------------------------------------------------------------
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("configuration error: {0}")]
    Config(String),

    // -------------------------------------------------------------------------
    // Model call errors
    // -------------------------------------------------------------------------
    /// Provider returned an error envelope or an unusable response body.
    #[error("API error: {0}")]
    Api(String),

    /// Request never produced an HTTP response (timeout, connect, DNS).
    #[error("transport failure: {0}")]
    Transport(String),

    /// HTTP 200 but the expected completion field path was absent.
    #[error("malformed provider response: {0}")]
    MalformedResponse(String),

    #[error("rate limited: max retries exceeded after {attempts} attempts")]
    RetriesExhausted { attempts: u32 },

    #[error("generation cancelled")]
    Cancelled,

    // -------------------------------------------------------------------------
    // Extraction errors
    // -------------------------------------------------------------------------
    #[error("no JSON payload found in model output")]
    NoJsonFound,

    #[error("invalid tree structure at {path}: {message}")]
    Schema { path: String, message: String },

    // -------------------------------------------------------------------------
    // Store / system errors
    // -------------------------------------------------------------------------
    #[error("unknown tree id: {0}")]
    UnknownTree(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, TreeError>;

impl TreeError {
    /// Create a schema validation error for a specific node path.
    pub fn schema(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Schema {
            path: path.into(),
            message: message.into(),
        }
    }

    /// True for failures produced while recovering JSON from model output.
    pub fn is_extraction(&self) -> bool {
        matches!(self, Self::NoJsonFound | Self::Schema { .. })
    }

    /// Message suitable for end users.
    ///
    /// Extraction failures collapse to a single retry suggestion; the raw
    /// model text stays in the debug log and is never surfaced here.
    pub fn user_message(&self) -> String {
        if self.is_extraction() {
            "failed to parse knowledge tree structure, please try again".to_string()
        } else {
            self.to_string()
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extraction_errors_get_generic_user_message() {
        let err = TreeError::NoJsonFound;
        assert_eq!(
            err.user_message(),
            "failed to parse knowledge tree structure, please try again"
        );

        let err = TreeError::schema("children[0]", "missing title");
        assert!(err.is_extraction());
        assert!(!err.user_message().contains("children[0]"));
    }

    #[test]
    fn test_non_extraction_errors_keep_their_message() {
        let err = TreeError::Api("quota exhausted".to_string());
        assert_eq!(err.user_message(), "API error: quota exhausted");
        assert!(!err.is_extraction());
    }

    #[test]
    fn test_schema_error_names_path() {
        let err = TreeError::schema("children[2].children[0]", "missing or empty title");
        assert_eq!(
            err.to_string(),
            "invalid tree structure at children[2].children[0]: missing or empty title"
        );
    }
}
