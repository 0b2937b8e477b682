//! Scripted provider for tests.
//!
//! Answers by `schema.title` (the signature name). Unscripted signatures get
//! a response synthesized from the schema itself, so every declared field
//! is present and valid.

use async_trait::async_trait;
use serde_json::{Map, Value, json};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use crate::ai::{LlmProvider, LlmResponse};
use crate::types::{ErrorCategory, LlmError, PlanError, Result};

#[derive(Default)]
pub struct ScriptedProvider {
    responses: HashMap<String, Value>,
    failures: Vec<String>,
    delays: HashMap<String, Duration>,
    calls: Mutex<Vec<(String, String)>>,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(mut self, signature: &str, content: Value) -> Self {
        self.responses.insert(signature.to_string(), content);
        self
    }

    pub fn failing_on(mut self, signature: &str) -> Self {
        self.failures.push(signature.to_string());
        self
    }

    pub fn delayed_on(mut self, signature: &str, delay: Duration) -> Self {
        self.delays.insert(signature.to_string(), delay);
        self
    }

    /// Signature names in call order
    pub fn calls(&self) -> Vec<String> {
        self.lock().iter().map(|(name, _)| name.clone()).collect()
    }

    /// Prompt sent for the most recent call of `signature`
    pub fn prompt_for(&self, signature: &str) -> Option<String> {
        self.lock()
            .iter()
            .rev()
            .find(|(name, _)| name == signature)
            .map(|(_, prompt)| prompt.clone())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<(String, String)>> {
        self.calls.lock().unwrap_or_else(|p| p.into_inner())
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    async fn generate(&self, prompt: &str, schema: &Value) -> Result<LlmResponse> {
        let title = schema["title"].as_str().unwrap_or_default().to_string();
        self.lock().push((title.clone(), prompt.to_string()));

        if let Some(delay) = self.delays.get(&title) {
            tokio::time::sleep(*delay).await;
        }
        if self.failures.contains(&title) {
            return Err(PlanError::Llm(LlmError::with_provider(
                ErrorCategory::ServiceUnavailable,
                format!("scripted failure for {}", title),
                "scripted",
            )));
        }

        let content = self
            .responses
            .get(&title)
            .cloned()
            .unwrap_or_else(|| synthesize(schema));
        Ok(LlmResponse::content_only(content))
    }

    fn name(&self) -> &str {
        "scripted"
    }

    fn model(&self) -> &str {
        "scripted-model"
    }
}

/// Smallest valid instance of a response schema
pub fn synthesize(schema: &Value) -> Value {
    match schema["type"].as_str() {
        Some("object") => {
            let mut object = Map::new();
            if let Some(properties) = schema["properties"].as_object() {
                for (name, sub) in properties {
                    let value = match sub["type"].as_str() {
                        Some("string") if sub.get("enum").is_none() => {
                            json!(format!("{} for {}", name, schema["title"].as_str().unwrap_or("item")))
                        }
                        _ => synthesize(sub),
                    };
                    object.insert(name.clone(), value);
                }
            }
            Value::Object(object)
        }
        Some("array") => json!([]),
        Some("integer") => schema["minimum"].clone(),
        _ => schema["enum"][0].clone(),
    }
}

/// Datasets, canned agent outputs and a ready-made agent context
pub mod fixtures {
    use serde_json::{Map, Value, json};
    use std::collections::BTreeMap;
    use std::sync::Arc;

    use super::ScriptedProvider;
    use crate::agents::{AgentContext, AgentResult, agent_for};
    use crate::ai::{MetricsCollector, SharedProvider};
    use crate::config::{AnalysisConfig, Config};
    use crate::dataset::{ColumnKind, Dataset};
    use crate::pipeline::{PipelineState, Stage};
    use crate::signatures::DEPLOYMENT_PLANNER;

    pub fn dataset(name: &str, csv: &str) -> Dataset {
        Dataset::from_bytes(name, csv.as_bytes(), &AnalysisConfig::default())
            .expect("fixture csv")
    }

    pub fn small_dataset() -> Dataset {
        dataset(
            "small",
            "id,price,region\n1,9.5,north\n2,12.0,south\n3,11.25,north\n4,10.0,east\n",
        )
    }

    /// 100 rows x 5 columns, no missing values, `revenue` as the target
    pub fn sales_dataset() -> Dataset {
        let regions = ["north", "south", "east", "west"];
        let mut csv = String::from("order_id,region,units,discount,revenue\n");
        for i in 0..100 {
            let units = 1 + (i * 7) % 20;
            let discount = ((i * 3) % 10) as f64 / 100.0;
            let revenue = units as f64 * 25.0 * (1.0 - discount);
            csv.push_str(&format!(
                "{},{},{},{:.2},{:.2}\n",
                1000 + i,
                regions[i % 4],
                units,
                discount,
                revenue
            ));
        }
        dataset("sales", &csv)
    }

    fn business_type(dataset: &Dataset, name: &str) -> &'static str {
        match dataset.column(name) {
            Some(c) if c.kind() == ColumnKind::Integer && c.unique_count() == dataset.row_count() => {
                "Identifier"
            }
            Some(c) if c.kind().is_numeric() => "Numeric Metric",
            Some(c) if c.kind() == ColumnKind::Datetime => "Date/Time",
            Some(c) if c.kind() == ColumnKind::Boolean => "Boolean",
            _ => "Categorical",
        }
    }

    /// Last numeric column that is not an identifier
    pub fn target_column(dataset: &Dataset) -> String {
        dataset
            .columns()
            .iter()
            .rev()
            .find(|c| business_type(dataset, c.name()) == "Numeric Metric")
            .map(|c| c.name().to_string())
            .unwrap_or_else(|| "None".to_string())
    }

    pub fn schema_fields(columns: &[(&str, &str)]) -> Value {
        let columns: Vec<Value> = columns
            .iter()
            .map(|(name, business_type)| {
                json!({
                    "column_name": name,
                    "business_type": business_type,
                    "confidence": "high",
                    "rationale": format!("{} values fit {}", name, business_type),
                    "recommendation": "Keep"
                })
            })
            .collect();
        json!({ "columns": columns })
    }

    pub fn advisor_fields(use_case: &str, target: &str, score: i64) -> Value {
        json!({
            "detected_use_case": use_case,
            "target_variable": target,
            "target_reasoning": format!("{} is a continuous outcome driven by the other columns.", target),
            "suitability_score": score,
            "alternative_use_case": "None",
            "feature_plan": format!("## 1. Data Preparation\n- scale {}", target),
            "training_recommendations": "Start with linear regression, then gradient boosting.",
            "mlflow_setup": "One experiment per target; log RMSE and MAE."
        })
    }

    pub fn deployment_fields() -> Value {
        let mut fields = Map::new();
        for field in DEPLOYMENT_PLANNER.outputs {
            fields.insert(field.name.to_string(), json!(format!("{} details", field.name)));
        }
        let mut fields = Value::Object(fields);
        fields["team_requirements"] = json!("2 data scientists, 1 MLOps engineer");
        fields["implementation_roadmap"] = json!("POC 4 weeks, Development 8 weeks");
        fields["cost_estimation"] = json!("$4k/month");
        fields["risk_mitigation"] = json!("data drift");
        fields["success_metrics"] = json!("RMSE below 5%");
        fields
    }

    pub fn business_fields() -> Value {
        json!({
            "executive_summary": "Executive summary: forecast revenue per order.",
            "risk_matrix": "| Risk | Impact | Likelihood |\n|---|---|---|\n| Drift | High | Medium |",
            "timeline_visual": "gantt\n    title Delivery\n    POC :a1, 2025-01-01, 4w",
            "budget_justification": "Payback in 6 months.",
            "stakeholder_talking_points": "## Executives\n- faster pricing decisions"
        })
    }

    pub fn prd_fields() -> Value {
        json!({
            "prd_document": "# Product Requirements Document\n\n## 1. Executive Summary\nPredict revenue."
        })
    }

    /// Plausible, valid output fields for a stage over `dataset`
    pub fn canned_fields(stage: Stage, dataset: &Dataset) -> Value {
        match stage {
            Stage::Schema => {
                let columns: Vec<(&str, &str)> = dataset
                    .columns()
                    .iter()
                    .map(|c| (c.name(), business_type(dataset, c.name())))
                    .collect();
                schema_fields(&columns)
            }
            Stage::Profile => {
                let insight = |name: &str, pattern: &str| {
                    json!({
                        "column_name": name,
                        "pattern_detected": pattern,
                        "insight": format!("{} is stable", name),
                        "actionable_suggestion": "No action needed"
                    })
                };
                let numeric: Vec<Value> = dataset
                    .columns()
                    .iter()
                    .filter(|c| c.kind().is_numeric())
                    .map(|c| insight(c.name(), "normal"))
                    .collect();
                let categorical: Vec<Value> = dataset
                    .columns()
                    .iter()
                    .filter(|c| c.kind().is_categorical())
                    .map(|c| insight(c.name(), "low cardinality"))
                    .collect();
                json!({
                    "numeric_insights": numeric,
                    "categorical_insights": categorical,
                    "overall_observation": "Well-formed transactional data."
                })
            }
            Stage::Quality => json!({
                "recommendations": [],
                "overall_assessment": "The data is usable as is."
            }),
            Stage::MlAdvisor => advisor_fields("regression", &target_column(dataset), 82),
            Stage::Deployment => deployment_fields(),
            Stage::BusinessCommunication => business_fields(),
            Stage::Prd => prd_fields(),
        }
    }

    fn to_fields(stage: Stage, fields: Value) -> BTreeMap<String, Value> {
        let mut content = fields;
        content["reasoning"] = json!("scripted");
        agent_for(stage)
            .signature()
            .parse_output(&content)
            .expect("canned fields match the signature")
            .fields
    }

    pub fn result(stage: Stage, fields: Value) -> AgentResult {
        AgentResult::new(stage, to_fields(stage, fields), "scripted".into(), None)
    }

    pub fn schema_result(columns: &[(&str, &str)]) -> AgentResult {
        result(Stage::Schema, schema_fields(columns))
    }

    pub fn advisor_result(use_case: &str, target: &str, score: i64) -> AgentResult {
        result(Stage::MlAdvisor, advisor_fields(use_case, target, score))
    }

    impl ScriptedProvider {
        /// Answers every signature with `canned_fields` for `dataset`
        pub fn scenario(dataset: &Dataset) -> Self {
            Stage::ALL.into_iter().fold(Self::new(), |provider, stage| {
                let mut content = canned_fields(stage, dataset);
                content["reasoning"] = json!(format!("reasoning for {}", stage));
                provider.respond(agent_for(stage).signature().name, content)
            })
        }
    }

    pub struct Fixture {
        pub config: Config,
        pub provider: SharedProvider,
        pub metrics: MetricsCollector,
        pub state: PipelineState,
    }

    impl Fixture {
        pub fn new() -> Self {
            Self {
                config: Config::default(),
                provider: Arc::new(ScriptedProvider::new()),
                metrics: MetricsCollector::new(),
                state: PipelineState::new(),
            }
        }

        /// State holding every analysis stage up to and including `last`,
        /// with real evidence and canned fields
        pub fn with_analysis_through(dataset: &Dataset, last: Stage) -> Self {
            let mut fx = Self::new();
            for stage in Stage::ANALYSIS.into_iter().filter(|s| *s <= last) {
                let prepared = agent_for(stage)
                    .prepare(&fx.context(dataset, stage))
                    .expect("fixture prepare");
                let fields = to_fields(stage, canned_fields(stage, dataset));
                let result = AgentResult::new(stage, fields, "scripted".into(), prepared.evidence);
                fx.state.insert(result).expect("fixture order");
            }
            fx
        }

        pub fn replace_fields(&mut self, stage: Stage, fields: Value) {
            let mut results: Vec<AgentResult> = std::mem::take(&mut self.state).into();
            results[stage.position()].fields = to_fields(stage, fields);
            self.state = PipelineState::try_from(results).expect("fixture order");
        }

        pub fn context<'a>(&'a self, dataset: &'a Dataset, stage: Stage) -> AgentContext<'a> {
            AgentContext::new(
                Some(dataset),
                self.state.view_for(stage),
                &self.config,
                &self.provider,
                &self.metrics,
            )
        }

        pub fn context_without_dataset(&self, stage: Stage) -> AgentContext<'_> {
            AgentContext::new(
                None,
                self.state.view_for(stage),
                &self.config,
                &self.provider,
                &self.metrics,
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signatures::{ML_USE_CASE_ADVISOR, SCHEMA_INTERPRETER};

    #[test]
    fn test_synthesized_responses_validate() {
        for sig in [&SCHEMA_INTERPRETER, &ML_USE_CASE_ADVISOR] {
            let content = synthesize(&sig.json_schema());
            assert!(sig.parse_output(&content).is_ok(), "{}", sig.name);
        }
    }

    #[tokio::test]
    async fn test_records_calls() {
        let provider = ScriptedProvider::new().failing_on("B");
        provider
            .generate("p1", &json!({"title": "A", "type": "object"}))
            .await
            .unwrap();
        assert!(
            provider
                .generate("p2", &json!({"title": "B", "type": "object"}))
                .await
                .is_err()
        );
        assert_eq!(provider.calls(), vec!["A", "B"]);
        assert_eq!(provider.prompt_for("A").as_deref(), Some("p1"));
    }
}
