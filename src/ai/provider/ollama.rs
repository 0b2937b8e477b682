//! Ollama Local LLM Provider
//!
//! Runs the pipeline against a locally served model. Useful for trying the
//! tool on sensitive data without sending it to a hosted API.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use super::{
    ErrorClassifier, LlmProvider, LlmResponse, ProviderConfig, ResponseMetadata, ResponseTiming,
    TokenUsage, prompt_utils,
};
use crate::ai::validation::extract_json_from_response;
use crate::types::{ErrorCategory, LlmError, PlanError, Result};

const DEFAULT_API_BASE: &str = "http://localhost:11434";
const DEFAULT_MODEL: &str = "llama3.1:8b";
const PROVIDER: &str = "ollama";

/// Ollama Local LLM Provider
#[derive(Debug)]
pub struct OllamaProvider {
    api_base: String,
    model: String,
    temperature: f32,
    num_predict: usize,
    client: reqwest::Client,
}

impl OllamaProvider {
    pub fn new(config: ProviderConfig) -> Result<Self> {
        let api_base = config
            .api_base
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());
        let api_base = Self::validate_endpoint(&api_base)?;

        // The default OpenAI model name means nothing to Ollama
        let model = config
            .model
            .filter(|m| !m.starts_with("gpt-"))
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| {
                PlanError::Configuration(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            api_base,
            model,
            temperature: config.temperature,
            num_predict: config.max_tokens,
            client,
        })
    }

    /// Only http/https endpoints; warn when the data leaves this machine.
    fn validate_endpoint(endpoint: &str) -> Result<String> {
        let url = url::Url::parse(endpoint).map_err(|e| {
            PlanError::Configuration(format!("Invalid Ollama endpoint URL '{}': {}", endpoint, e))
        })?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(PlanError::Configuration(format!(
                "Ollama endpoint must use http or https scheme, got: {}",
                url.scheme()
            )));
        }

        if let Some(host) = url.host_str()
            && !matches!(host, "localhost" | "127.0.0.1" | "[::1]")
        {
            warn!(
                "Ollama endpoint is not localhost: {}. Dataset samples will be sent there.",
                host
            );
        }

        Ok(url.as_str().trim_end_matches('/').to_string())
    }

    fn build_request(&self, prompt: &str, schema: &Value) -> OllamaRequest {
        OllamaRequest {
            model: self.model.clone(),
            prompt: prompt_utils::build_schema_prompt(prompt, schema),
            stream: false,
            options: OllamaOptions {
                temperature: self.temperature,
                num_predict: self.num_predict,
            },
            format: "json".to_string(),
        }
    }
}

#[async_trait]
impl LlmProvider for OllamaProvider {
    async fn generate(&self, prompt: &str, schema: &Value) -> Result<LlmResponse> {
        info!(
            "Generating with Ollama (model: {}, temperature: {})",
            self.model, self.temperature
        );

        let start_time = Instant::now();
        let request = self.build_request(prompt, schema);
        let url = format!("{}/api/generate", self.api_base);

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    PlanError::Llm(LlmError::with_provider(
                        ErrorCategory::Network,
                        format!(
                            "Failed to connect to Ollama at {}. Is Ollama running? Start with: ollama serve",
                            self.api_base
                        ),
                        PROVIDER,
                    ))
                } else {
                    ErrorClassifier::classify_transport(&e, PROVIDER).into()
                }
            })?;

        let elapsed = start_time.elapsed();

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ErrorClassifier::classify_http_status(
                status.as_u16(),
                &format!("Ollama API error ({}): {}", status, body),
                PROVIDER,
            )
            .into());
        }

        let response_body: OllamaResponse = response
            .json()
            .await
            .map_err(|e| ErrorClassifier::classify_transport(&e, PROVIDER))?;

        let usage = TokenUsage::from_ollama(
            response_body.prompt_eval_count.unwrap_or(0),
            response_body.eval_count.unwrap_or(0),
        );

        debug!("Received response from Ollama, parsing JSON");
        let content = extract_json_from_response(&response_body.response)?;

        Ok(LlmResponse::with_metrics(
            content,
            usage,
            ResponseTiming::from_duration(elapsed),
            ResponseMetadata {
                model: self.model.clone(),
                provider: PROVIDER.to_string(),
            },
        ))
    }

    fn name(&self) -> &str {
        PROVIDER
    }

    fn model(&self) -> &str {
        &self.model
    }
}

// Request/Response types

#[derive(Debug, Serialize)]
struct OllamaRequest {
    model: String,
    prompt: String,
    stream: bool,
    options: OllamaOptions,
    format: String,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    temperature: f32,
    num_predict: usize,
}

#[derive(Debug, Deserialize)]
struct OllamaResponse {
    response: String,
    #[serde(default)]
    prompt_eval_count: Option<u32>,
    #[serde(default)]
    eval_count: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(api_base: Option<&str>, model: Option<&str>) -> ProviderConfig {
        ProviderConfig {
            provider: "ollama".to_string(),
            api_base: api_base.map(String::from),
            model: model.map(String::from),
            ..Default::default()
        }
    }

    #[test]
    fn test_default_config() {
        let provider = OllamaProvider::new(config(None, None)).unwrap();
        assert_eq!(provider.api_base, DEFAULT_API_BASE);
        assert_eq!(provider.model, DEFAULT_MODEL);
    }

    #[test]
    fn test_openai_model_name_replaced() {
        let provider = OllamaProvider::new(config(None, Some("gpt-4.1"))).unwrap();
        assert_eq!(provider.model, DEFAULT_MODEL);

        let provider = OllamaProvider::new(config(None, Some("mistral:7b"))).unwrap();
        assert_eq!(provider.model, "mistral:7b");
    }

    #[test]
    fn test_rejects_non_http_scheme() {
        let err = OllamaProvider::new(config(Some("file:///etc/passwd"), None)).unwrap_err();
        assert!(matches!(err, PlanError::Configuration(_)));
    }

    #[test]
    fn test_rejects_unparseable_url() {
        assert!(OllamaProvider::new(config(Some("not a url"), None)).is_err());
    }

    #[test]
    fn test_request_uses_json_format() {
        let provider = OllamaProvider::new(config(None, None)).unwrap();
        let request = provider.build_request("hello", &serde_json::Value::Null);
        assert_eq!(request.format, "json");
        assert!(!request.stream);
        assert!(request.prompt.contains("hello"));
    }
}
