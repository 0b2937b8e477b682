//! Unified Error Type System
//!
//! A single error enum (`PlanError`) for the whole crate. The three kinds a
//! user sees at the surface are:
//!
//! - **Configuration**: missing or invalid settings, detected at startup
//! - **Input**: the uploaded dataset is empty or malformed
//! - **Generation**: a model call failed or its response did not match the
//!   agent's declared output fields; always names the failing stage
//!
//! Provider failures are classified into an `ErrorCategory` so the CLI can
//! print a useful hint. Nothing in the crate retries on any category.

use std::time::Duration;
use thiserror::Error;

// =============================================================================
// Error Categories
// =============================================================================

/// Provider failure categories, used for user-facing hints
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Provider rejected the request rate
    RateLimit,
    /// API key rejected
    Auth,
    /// Could not reach the provider
    Network,
    /// Provider returned a 5xx or the model does not exist
    ServiceUnavailable,
    /// Request rejected as malformed (often context too long)
    BadRequest,
    /// Response body was not usable JSON
    ParseError,
    Unknown,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RateLimit => write!(f, "RATE_LIMIT"),
            Self::Auth => write!(f, "AUTH"),
            Self::Network => write!(f, "NETWORK"),
            Self::ServiceUnavailable => write!(f, "UNAVAILABLE"),
            Self::BadRequest => write!(f, "BAD_REQUEST"),
            Self::ParseError => write!(f, "PARSE_ERROR"),
            Self::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

impl ErrorCategory {
    /// Short remediation hint shown below the error message
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::RateLimit => Some("The provider is rate limiting requests; wait and run again"),
            Self::Auth => Some("Check that OPENAI_API_KEY is set to a valid key"),
            Self::Network => Some("Check network connectivity and the configured base URL"),
            Self::ServiceUnavailable => {
                Some("The provider or model is unavailable; check the model name")
            }
            Self::BadRequest => {
                Some("The request was rejected; large datasets may exceed the model context")
            }
            Self::ParseError | Self::Unknown => None,
        }
    }
}

// =============================================================================
// LLM Error
// =============================================================================

/// Provider error with category and provider context
#[derive(Debug, Clone)]
pub struct LlmError {
    pub category: ErrorCategory,
    pub message: String,
    pub provider: Option<String>,
}

impl std::fmt::Display for LlmError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(provider) = &self.provider {
            write!(f, "[{}:{}] {}", provider, self.category, self.message)
        } else {
            write!(f, "[{}] {}", self.category, self.message)
        }
    }
}

impl std::error::Error for LlmError {}

impl LlmError {
    pub fn new(category: ErrorCategory, message: impl Into<String>) -> Self {
        Self {
            category,
            message: message.into(),
            provider: None,
        }
    }

    pub fn with_provider(
        category: ErrorCategory,
        message: impl Into<String>,
        provider: impl Into<String>,
    ) -> Self {
        Self {
            category,
            message: message.into(),
            provider: Some(provider.into()),
        }
    }
}

// =============================================================================
// Error Classifier
// =============================================================================

pub struct ErrorClassifier;

impl ErrorClassifier {
    /// Classify an HTTP status returned by a provider
    pub fn classify_http_status(status: u16, message: &str, provider: &str) -> LlmError {
        let category = match status {
            429 => ErrorCategory::RateLimit,
            401 | 403 => ErrorCategory::Auth,
            400 | 413 | 422 => ErrorCategory::BadRequest,
            404 | 500 | 502 | 503 | 504 => ErrorCategory::ServiceUnavailable,
            _ => ErrorCategory::Unknown,
        };
        LlmError::with_provider(category, message, provider)
    }

    /// Classify a transport failure from reqwest
    pub fn classify_transport(err: &reqwest::Error, provider: &str) -> LlmError {
        let category = if err.is_connect() || err.is_timeout() {
            ErrorCategory::Network
        } else if err.is_decode() {
            ErrorCategory::ParseError
        } else {
            ErrorCategory::Unknown
        };
        LlmError::with_provider(category, err.to_string(), provider)
    }
}

// =============================================================================
// Application Error
// =============================================================================

#[derive(Debug, Error)]
pub enum PlanError {
    // -------------------------------------------------------------------------
    // System Errors (auto From impl)
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    // -------------------------------------------------------------------------
    // Surface Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Input error: {0}")]
    Input(String),

    /// A model call failed or its response did not fit the stage's signature
    #[error("{stage} agent failed: {message}")]
    Generation {
        stage: String,
        message: String,
        /// Provider failure category, when the stage failed on a model call
        category: Option<ErrorCategory>,
    },

    // -------------------------------------------------------------------------
    // LLM Errors
    // -------------------------------------------------------------------------
    #[error("LLM error: {0}")]
    Llm(LlmError),

    #[error("Timeout after {duration:?}: {operation}")]
    Timeout {
        operation: String,
        duration: Duration,
    },

    // -------------------------------------------------------------------------
    // Pipeline Errors
    // -------------------------------------------------------------------------
    #[error("Insufficient data to generate PRD: missing {}", missing.join(", "))]
    PipelineIncomplete { missing: Vec<String> },

    /// An agent asked for output that is not yet produced
    #[error("Stage '{consumer}' cannot read output of '{producer}'")]
    StageOrder { consumer: String, producer: String },

    /// A result was appended to the pipeline state out of order
    #[error("Result for '{stage}' is out of order; expected '{expected}'")]
    OutOfOrder { stage: String, expected: String },

    /// A prior result was read for evidence it does not carry
    #[error("{producer} result carries no evidence")]
    MissingEvidence { producer: String },

    #[error("Session error: {0}")]
    Session(String),
}

impl From<LlmError> for PlanError {
    fn from(err: LlmError) -> Self {
        PlanError::Llm(err)
    }
}

impl From<csv::Error> for PlanError {
    fn from(err: csv::Error) -> Self {
        let location = err
            .position()
            .map(|p| format!(" (line {})", p.line()))
            .unwrap_or_default();
        PlanError::Input(format!("malformed CSV{}: {}", location, err))
    }
}

impl From<figment::Error> for PlanError {
    fn from(err: figment::Error) -> Self {
        PlanError::Configuration(err.to_string())
    }
}

impl From<toml::ser::Error> for PlanError {
    fn from(err: toml::ser::Error) -> Self {
        PlanError::Configuration(format!("failed to serialize config: {}", err))
    }
}

pub type Result<T> = std::result::Result<T, PlanError>;

// =============================================================================
// Helper Functions
// =============================================================================

impl PlanError {
    pub fn timeout(operation: impl Into<String>, duration: Duration) -> Self {
        Self::Timeout {
            operation: operation.into(),
            duration,
        }
    }

    pub fn generation(stage: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Generation {
            stage: stage.into(),
            message: message.into(),
            category: None,
        }
    }

    pub fn llm_with_category(category: ErrorCategory, message: impl Into<String>) -> Self {
        Self::Llm(LlmError::new(category, message))
    }

    /// Wrap any failure raised while a stage was running as a generation error
    /// for that stage. Configuration and input errors pass through unchanged.
    pub fn in_stage(self, stage: &str) -> Self {
        match self {
            Self::Generation { .. } | Self::Configuration(_) | Self::Input(_) => self,
            other => Self::Generation {
                stage: stage.to_string(),
                category: other.category(),
                message: other.to_string(),
            },
        }
    }

    /// Name of the stage that failed, for generation errors
    pub fn stage(&self) -> Option<&str> {
        match self {
            Self::Generation { stage, .. } => Some(stage),
            _ => None,
        }
    }

    /// Category of the underlying provider failure, when known
    pub fn category(&self) -> Option<ErrorCategory> {
        match self {
            Self::Llm(e) => Some(e.category),
            Self::Timeout { .. } => Some(ErrorCategory::Network),
            Self::Generation { category, .. } => *category,
            _ => None,
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
    fn test_error_category_display() {
        assert_eq!(ErrorCategory::RateLimit.to_string(), "RATE_LIMIT");
        assert_eq!(ErrorCategory::Auth.to_string(), "AUTH");
        assert_eq!(ErrorCategory::ServiceUnavailable.to_string(), "UNAVAILABLE");
    }

    #[test]
    fn test_classify_http_status() {
        let cases = [
            (429, ErrorCategory::RateLimit),
            (401, ErrorCategory::Auth),
            (403, ErrorCategory::Auth),
            (400, ErrorCategory::BadRequest),
            (503, ErrorCategory::ServiceUnavailable),
            (418, ErrorCategory::Unknown),
        ];
        for (status, expected) in cases {
            let err = ErrorClassifier::classify_http_status(status, "body", "openai");
            assert_eq!(err.category, expected, "status {}", status);
            assert_eq!(err.provider.as_deref(), Some("openai"));
        }
    }

    #[test]
    fn test_llm_error_display() {
        let err = LlmError::with_provider(ErrorCategory::Auth, "invalid key", "openai");
        assert_eq!(err.to_string(), "[openai:AUTH] invalid key");

        let err = LlmError::new(ErrorCategory::Unknown, "boom");
        assert_eq!(err.to_string(), "[UNKNOWN] boom");
    }

    #[test]
    fn test_in_stage_wraps_provider_errors() {
        let err = PlanError::Llm(LlmError::new(ErrorCategory::RateLimit, "slow down"));
        let wrapped = err.in_stage("Quality");
        assert_eq!(wrapped.stage(), Some("Quality"));
        assert!(wrapped.to_string().starts_with("Quality agent failed:"));
    }

    #[test]
    fn test_in_stage_keeps_surface_errors() {
        let err = PlanError::Configuration("missing key".into()).in_stage("Schema");
        assert!(matches!(err, PlanError::Configuration(_)));

        let err = PlanError::generation("Profile", "bad field").in_stage("Schema");
        assert_eq!(err.stage(), Some("Profile"));
    }

    #[test]
    fn test_pipeline_incomplete_message() {
        let err = PlanError::PipelineIncomplete {
            missing: vec!["deployment".into(), "business_communication".into()],
        };
        assert_eq!(
            err.to_string(),
            "Insufficient data to generate PRD: missing deployment, business_communication"
        );
    }

    #[test]
    fn test_category_hints() {
        assert!(ErrorCategory::Auth.hint().is_some());
        assert!(ErrorCategory::Unknown.hint().is_none());
        let err = PlanError::timeout("schema", Duration::from_secs(5));
        assert_eq!(err.category(), Some(ErrorCategory::Network));

        let wrapped = PlanError::llm_with_category(ErrorCategory::Auth, "401").in_stage("Schema");
        assert_eq!(wrapped.category(), Some(ErrorCategory::Auth));
        assert_eq!(wrapped.stage(), Some("Schema"));
    }
}
