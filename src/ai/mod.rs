//! AI Integration Layer
//!
//! LLM providers, prompt construction and response handling shared by all agents.

pub mod metrics;
pub mod prompt;
pub mod provider;
pub mod timeout;
pub mod validation;

pub use metrics::{MetricsCollector, MetricsSummary, StageMetrics};
pub use prompt::{PromptBuilder, PromptSection};
pub use provider::{
    LlmProvider, LlmResponse, ProviderConfig, ResponseMetadata, ResponseTiming, SharedProvider,
    TokenUsage, create_provider,
};
pub use timeout::with_timeout;
pub use validation::{JsonRepairer, extract_json_from_response};
