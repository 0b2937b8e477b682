//! Configuration Types
//!
//! All configuration structures with sensible defaults.
//! Supports global (~/.config/dataplan/) and project (.dataplan/) level configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::ai::provider::ProviderConfig;
use crate::constants::{analysis, llm};
use crate::types::{PlanError, Result};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Configuration version
    pub version: String,

    /// LLM provider settings
    pub llm: LlmConfig,

    /// Dataset loading and evidence extraction
    pub analysis: AnalysisConfig,

    /// Where sessions and documents are written
    pub output: OutputConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            llm: LlmConfig::default(),
            analysis: AnalysisConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

impl Config {
    /// Validate configuration values are within acceptable ranges.
    /// Returns `PlanError::Configuration` on validation failure.
    pub fn validate(&self) -> Result<()> {
        if !llm::SUPPORTED_PROVIDERS.contains(&self.llm.provider.as_str()) {
            return Err(PlanError::Configuration(format!(
                "Unknown provider: {}. Supported: {}",
                self.llm.provider,
                llm::SUPPORTED_PROVIDERS.join(", ")
            )));
        }

        if self.llm.model.trim().is_empty() {
            return Err(PlanError::Configuration(
                "LLM model must not be empty (set OPENAI_MODEL or llm.model)".to_string(),
            ));
        }

        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(PlanError::Configuration(format!(
                "LLM temperature must be between 0.0 and 2.0, got {}",
                self.llm.temperature
            )));
        }

        if self.llm.timeout_secs == 0 {
            return Err(PlanError::Configuration(
                "LLM timeout_secs must be greater than 0".to_string(),
            ));
        }

        if self.analysis.max_rows == 0 || self.analysis.max_sample_values == 0 {
            return Err(PlanError::Configuration(
                "analysis.max_rows and analysis.max_sample_values must be greater than 0"
                    .to_string(),
            ));
        }

        Ok(())
    }

    /// Check that the selected provider has the credentials it needs.
    ///
    /// Called before any dataset is read or any agent runs.
    pub fn validate_credentials(&self) -> Result<()> {
        if self.llm.provider == "openai" && !self.llm.has_api_key() {
            return Err(PlanError::Configuration(
                "OPENAI_API_KEY is not set. Export it or add it to a .env file".to_string(),
            ));
        }
        Ok(())
    }
}

// =============================================================================
// LLM Configuration
// =============================================================================

#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Provider name: "openai" or "ollama"
    pub provider: String,

    /// Model name
    pub model: String,

    /// Custom API endpoint (OpenAI-compatible gateways, remote Ollama)
    pub base_url: Option<String>,

    /// API key; read from OPENAI_API_KEY, never written back out
    #[serde(skip_serializing)]
    pub api_key: Option<String>,

    /// Per-call timeout in seconds
    pub timeout_secs: u64,

    pub temperature: f32,

    pub max_tokens: usize,
}

impl std::fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmConfig")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("timeout_secs", &self.timeout_secs)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: llm::DEFAULT_PROVIDER.to_string(),
            model: llm::DEFAULT_MODEL.to_string(),
            base_url: None,
            api_key: None,
            timeout_secs: llm::DEFAULT_TIMEOUT_SECS,
            temperature: 0.0,
            max_tokens: llm::DEFAULT_MAX_TOKENS,
        }
    }
}

impl LlmConfig {
    pub fn has_api_key(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }

    /// Settings handed to the provider factory
    pub fn provider_config(&self) -> ProviderConfig {
        ProviderConfig {
            provider: self.provider.clone(),
            model: Some(self.model.clone()),
            timeout_secs: self.timeout_secs,
            temperature: self.temperature,
            api_key: self.api_key.clone(),
            api_base: self.base_url.clone(),
            max_tokens: self.max_tokens,
        }
    }
}

// =============================================================================
// Analysis Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Rows beyond this are dropped at load time
    pub max_rows: usize,

    /// Non-null sample values shown per column
    pub max_sample_values: usize,

    /// Columns described in detail to the model; the rest are summarized
    pub max_prompt_columns: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            max_rows: analysis::MAX_ROWS,
            max_sample_values: analysis::MAX_SAMPLE_VALUES,
            max_prompt_columns: analysis::MAX_PROMPT_COLUMNS,
        }
    }
}

// =============================================================================
// Output Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory holding session caches and generated documents
    pub dir: PathBuf,

    /// File name used for the PRD download
    pub prd_file_name: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(".dataplan"),
            prd_file_name: crate::constants::report::PRD_FILE_NAME.to_string(),
        }
    }
}

impl OutputConfig {
    pub fn sessions_dir(&self) -> PathBuf {
        self.dir.join("sessions")
    }
}

// =============================================================================
// Tests
// =============================================================================
