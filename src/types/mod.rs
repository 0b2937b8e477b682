pub mod error;
pub mod utils;

pub use error::{ErrorCategory, ErrorClassifier, LlmError, PlanError, Result};
pub use utils::{capitalize_first, estimate_tokens, json_text, truncate_chars};

// =============================================================================
// Domain Newtypes
// =============================================================================

use serde::{Deserialize, Serialize};
use std::fmt;

/// Type-safe wrapper for session IDs
///
/// A session is identified by the name of the dataset it analyzes; uploading
/// a file with a different name starts a new session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Derive a filesystem-safe identifier from a dataset name
    pub fn from_dataset_name(name: &str) -> Self {
        let sanitized: String = name
            .trim()
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                    c.to_ascii_lowercase()
                } else {
                    '_'
                }
            })
            .collect();
        let sanitized = sanitized.trim_matches(|c| c == '.' || c == '_');
        if sanitized.is_empty() {
            Self("dataset".to_string())
        } else {
            Self(sanitized.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for SessionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for SessionId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
