//! Pipeline Metrics Collection
//!
//! Tracks model usage per stage so the report can show what a run cost.
//!
//! ```ignore
//! let metrics = MetricsCollector::new();
//! metrics.record_stage("schema", &response);
//! let summary = metrics.summary();
//! ```

use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};

use crate::ai::provider::LlmResponse;

/// Usage metrics collector, shared by reference with the supervisor.
#[derive(Default)]
pub struct MetricsCollector {
    api_calls: AtomicU32,
    input_tokens: AtomicU64,
    output_tokens: AtomicU64,
    total_latency_ms: AtomicU64,
    stages: Mutex<Vec<StageMetrics>>,
}

/// Usage of one stage's model call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageMetrics {
    pub stage: String,
    pub model: String,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub latency_ms: u64,
}

/// Totals across all recorded stages
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetricsSummary {
    pub api_calls: u32,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub total_tokens: u64,
    pub total_latency_ms: u64,
    pub stages: Vec<StageMetrics>,
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one stage's response and return its metrics entry
    pub fn record_stage(&self, stage: &str, response: &LlmResponse) -> StageMetrics {
        let entry = StageMetrics {
            stage: stage.to_string(),
            model: response.metadata.model.clone(),
            input_tokens: response.usage.input_tokens as u64,
            output_tokens: response.usage.output_tokens as u64,
            latency_ms: response.timing.total_ms,
        };

        self.api_calls.fetch_add(1, Ordering::Relaxed);
        self.input_tokens
            .fetch_add(entry.input_tokens, Ordering::Relaxed);
        self.output_tokens
            .fetch_add(entry.output_tokens, Ordering::Relaxed);
        self.total_latency_ms
            .fetch_add(entry.latency_ms, Ordering::Relaxed);

        let mut stages = self.stages.lock().unwrap_or_else(|poisoned| {
            tracing::error!("Metrics stages mutex poisoned, recovering");
            poisoned.into_inner()
        });
        stages.push(entry.clone());
        entry
    }

    pub fn summary(&self) -> MetricsSummary {
        let input_tokens = self.input_tokens.load(Ordering::Relaxed);
        let output_tokens = self.output_tokens.load(Ordering::Relaxed);
        let stages = self
            .stages
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone();

        MetricsSummary {
            api_calls: self.api_calls.load(Ordering::Relaxed),
            input_tokens,
            output_tokens,
            total_tokens: input_tokens + output_tokens,
            total_latency_ms: self.total_latency_ms.load(Ordering::Relaxed),
            stages,
        }
    }
}

impl MetricsSummary {
    /// One-line summary for the CLI footer
    pub fn display(&self) -> String {
        format!(
            "{} API calls, {} tokens (input: {}, output: {}), {:.1}s in model calls",
            self.api_calls,
            self.total_tokens,
            self.input_tokens,
            self.output_tokens,
            self.total_latency_ms as f64 / 1000.0
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::provider::{ResponseMetadata, ResponseTiming, TokenUsage};
    use serde_json::json;
    use std::time::Duration;

    fn response(input: u32, output: u32, ms: u64) -> LlmResponse {
        LlmResponse::with_metrics(
            json!({}),
            TokenUsage::from_openai(input, output),
            ResponseTiming::from_duration(Duration::from_millis(ms)),
            ResponseMetadata {
                model: "gpt-4.1".into(),
                provider: "openai".into(),
            },
        )
    }

    #[test]
    fn test_records_per_stage() {
        let metrics = MetricsCollector::new();
        metrics.record_stage("schema", &response(100, 40, 500));
        let entry = metrics.record_stage("profile", &response(200, 60, 1500));
        assert_eq!(entry.stage, "profile");
        assert_eq!(entry.model, "gpt-4.1");

        let summary = metrics.summary();
        assert_eq!(summary.api_calls, 2);
        assert_eq!(summary.total_tokens, 400);
        assert_eq!(summary.total_latency_ms, 2000);
        assert_eq!(summary.stages.len(), 2);
        assert_eq!(summary.stages[0].stage, "schema");
    }

    #[test]
    fn test_display() {
        let metrics = MetricsCollector::new();
        metrics.record_stage("schema", &response(10, 5, 250));
        let text = metrics.summary().display();
        assert!(text.contains("1 API calls"));
        assert!(text.contains("15 tokens"));
    }
}
