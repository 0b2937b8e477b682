//! Reason-then-answer model call shared by every agent.
//!
//! One prompt, one provider call, one validation pass. A failure at any
//! step becomes a generation error for the stage; nothing is retried.

use tracing::{debug, info};

use super::{AgentContext, AgentResult, Prepared};
use crate::pipeline::Stage;
use crate::signatures::Signature;
use crate::types::{PlanError, Result, estimate_tokens};

pub struct Predictor {
    stage: Stage,
    signature: &'static Signature,
}

impl Predictor {
    pub fn new(stage: Stage, signature: &'static Signature) -> Self {
        Self { stage, signature }
    }

    pub async fn predict(&self, ctx: &AgentContext<'_>, prepared: Prepared) -> Result<AgentResult> {
        let stage_name = self.stage.display_name();

        let prompt = self
            .signature
            .render_prompt(&prepared.inputs)
            .map_err(|e| match e {
                PlanError::Generation { message, .. } => PlanError::generation(stage_name, message),
                other => other.in_stage(stage_name),
            })?;
        let schema = self.signature.json_schema();
        debug!(
            "{}: prompt ~{} tokens via {}/{}",
            self.signature.name,
            estimate_tokens(&prompt),
            ctx.provider.name(),
            ctx.provider.model()
        );

        let response = ctx
            .provider
            .generate(&prompt, &schema)
            .await
            .map_err(|e| e.in_stage(stage_name))?;

        // billed whether or not the response parses
        let metrics = ctx.metrics.record_stage(self.stage.key(), &response);

        let parsed = self
            .signature
            .parse_output(&response.content)
            .map_err(|e| e.in_stage(stage_name))?;

        info!(
            "{} agent produced {} fields ({} tokens, {} ms)",
            stage_name,
            parsed.fields.len(),
            metrics.input_tokens + metrics.output_tokens,
            metrics.latency_ms
        );

        Ok(
            AgentResult::new(self.stage, parsed.fields, parsed.reasoning, prepared.evidence)
                .with_metrics(metrics),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::{MetricsCollector, SharedProvider};
    use crate::config::Config;
    use crate::pipeline::PipelineState;
    use crate::signatures::QUALITY_RECOMMENDER;
    use crate::testing::ScriptedProvider;
    use serde_json::json;
    use std::sync::Arc;

    fn prepared() -> Prepared {
        Prepared::new(vec![
            ("dataset_summary", "t: 4 rows x 2 columns".into()),
            ("detected_issues", "No quality issues detected".into()),
        ])
        .with_evidence(json!({"issues": []}))
    }

    async fn run(provider: ScriptedProvider, prepared: Prepared) -> Result<AgentResult> {
        run_with(provider, prepared, &MetricsCollector::new()).await
    }

    async fn run_with(
        provider: ScriptedProvider,
        prepared: Prepared,
        metrics: &MetricsCollector,
    ) -> Result<AgentResult> {
        let provider: SharedProvider = Arc::new(provider);
        let config = Config::default();
        let state = PipelineState::new();
        let ctx = AgentContext::new(
            None,
            state.view_for(Stage::Quality),
            &config,
            &provider,
            metrics,
        );
        Predictor::new(Stage::Quality, &QUALITY_RECOMMENDER)
            .predict(&ctx, prepared)
            .await
    }

    #[tokio::test]
    async fn test_predict_success() {
        let result = run(ScriptedProvider::new(), prepared()).await.unwrap();
        assert_eq!(result.stage, Stage::Quality);
        let names: Vec<&str> = result.fields.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["overall_assessment", "recommendations"]);
        assert!(!result.reasoning.is_empty());
        assert_eq!(result.evidence, Some(json!({"issues": []})));
        assert_eq!(result.metrics.unwrap().stage, "quality");
    }

    #[tokio::test]
    async fn test_provider_failure_names_stage() {
        let provider = ScriptedProvider::new().failing_on("QualityRecommender");
        let err = run(provider, prepared()).await.unwrap_err();
        assert_eq!(err.stage(), Some("Quality"));
    }

    #[tokio::test]
    async fn test_unparseable_response_names_stage() {
        let provider =
            ScriptedProvider::new().respond("QualityRecommender", json!({"reasoning": "x"}));
        let metrics = MetricsCollector::new();
        let err = run_with(provider, prepared(), &metrics).await.unwrap_err();
        assert_eq!(err.stage(), Some("Quality"));
        assert!(err.to_string().contains("missing output field"));

        // the rejected call is still counted
        let summary = metrics.summary();
        assert_eq!(summary.api_calls, 1);
        assert_eq!(summary.stages[0].stage, "quality");
    }

    #[tokio::test]
    async fn test_missing_input_names_stage() {
        let err = run(
            ScriptedProvider::new(),
            Prepared::new(vec![("dataset_summary", "x".into())]),
        )
        .await
        .unwrap_err();
        assert_eq!(err.stage(), Some("Quality"));
        assert!(err.to_string().contains("detected_issues"));
    }
}
