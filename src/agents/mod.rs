//! Pipeline Agents
//!
//! Each agent pairs one signature with the reason-then-answer call in
//! `predictor`. Agents differ only in how they prepare inputs:
//!
//! | Stage | Reads |
//! |-------|-------|
//! | schema | dataset |
//! | profile | dataset |
//! | quality | dataset |
//! | ml_advisor | dataset, schema, profile, quality |
//! | deployment | dataset, quality, ml_advisor |
//! | business_communication | ml_advisor, deployment |
//! | prd | quality, ml_advisor, deployment, business_communication |

pub mod business;
pub mod deployment;
pub mod ml_advisor;
pub mod predictor;
pub mod prd;
pub mod profile;
pub mod quality;
pub mod schema;

pub use business::BusinessCommunicationAgent;
pub use deployment::DeploymentAgent;
pub use ml_advisor::MlAdvisorAgent;
pub use prd::PrdAgent;
pub use predictor::Predictor;
pub use profile::ProfileAgent;
pub use quality::QualityAgent;
pub use schema::SchemaAgent;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::ai::{MetricsCollector, SharedProvider, StageMetrics};
use crate::config::Config;
use crate::dataset::Dataset;
use crate::pipeline::{PriorResults, Stage};
use crate::signatures::Signature;
use crate::types::{PlanError, Result, json_text};

// =============================================================================
// Agent Result
// =============================================================================

/// Output of one agent invocation. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentResult {
    pub stage: Stage,
    /// Exactly the signature's declared output fields
    pub fields: BTreeMap<String, Value>,
    /// Model reasoning produced before the answer
    pub reasoning: String,
    /// Locally computed facts the prompt was built from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evidence: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics: Option<StageMetrics>,
}

impl AgentResult {
    pub fn new(
        stage: Stage,
        fields: BTreeMap<String, Value>,
        reasoning: String,
        evidence: Option<Value>,
    ) -> Self {
        Self {
            stage,
            fields,
            reasoning,
            evidence,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: StageMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Field rendered as text; empty when absent
    pub fn text(&self, name: &str) -> String {
        self.fields.get(name).map(json_text).unwrap_or_default()
    }

    pub fn integer(&self, name: &str) -> Option<i64> {
        self.fields.get(name).and_then(Value::as_i64)
    }

    /// List-of-records field; empty when absent or not a list
    pub fn records(&self, name: &str) -> &[Value] {
        self.fields
            .get(name)
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Deserialize the evidence payload
    pub fn evidence_as<T: serde::de::DeserializeOwned>(&self) -> Result<T> {
        let evidence = self.evidence.clone().ok_or_else(|| PlanError::MissingEvidence {
            producer: self.stage.display_name().to_string(),
        })?;
        Ok(serde_json::from_value(evidence)?)
    }
}

// =============================================================================
// Agent Context
// =============================================================================

/// Everything an agent may read while preparing its inputs
pub struct AgentContext<'a> {
    dataset: Option<&'a Dataset>,
    pub prior: PriorResults<'a>,
    pub config: &'a Config,
    pub provider: &'a SharedProvider,
    pub metrics: &'a MetricsCollector,
}

impl<'a> AgentContext<'a> {
    pub fn new(
        dataset: Option<&'a Dataset>,
        prior: PriorResults<'a>,
        config: &'a Config,
        provider: &'a SharedProvider,
        metrics: &'a MetricsCollector,
    ) -> Self {
        Self {
            dataset,
            prior,
            config,
            provider,
            metrics,
        }
    }

    /// The loaded dataset; PRD synthesis runs without one
    pub fn dataset(&self) -> Result<&'a Dataset> {
        self.dataset.ok_or_else(|| {
            PlanError::generation(
                self.prior.consumer().display_name(),
                "no dataset is loaded for this stage",
            )
        })
    }
}

/// Prompt inputs plus the evidence they were derived from
#[derive(Debug, Clone, Default)]
pub struct Prepared {
    pub inputs: Vec<(&'static str, String)>,
    pub evidence: Option<Value>,
}

impl Prepared {
    pub fn new(inputs: Vec<(&'static str, String)>) -> Self {
        Self {
            inputs,
            evidence: None,
        }
    }

    pub fn with_evidence(mut self, evidence: Value) -> Self {
        self.evidence = Some(evidence);
        self
    }
}

// =============================================================================
// Agent Trait
// =============================================================================

#[async_trait]
pub trait Agent: Send + Sync {
    fn stage(&self) -> Stage;

    fn signature(&self) -> &'static Signature;

    /// Build the named inputs the signature declares
    fn prepare(&self, ctx: &AgentContext<'_>) -> Result<Prepared>;

    /// Format, call the model once, validate the response
    async fn analyze(&self, ctx: &AgentContext<'_>) -> Result<AgentResult> {
        let prepared = self.prepare(ctx)?;
        Predictor::new(self.stage(), self.signature())
            .predict(ctx, prepared)
            .await
    }
}

/// Agent for a stage
pub fn agent_for(stage: Stage) -> Box<dyn Agent> {
    match stage {
        Stage::Schema => Box::new(SchemaAgent),
        Stage::Profile => Box::new(ProfileAgent),
        Stage::Quality => Box::new(QualityAgent),
        Stage::MlAdvisor => Box::new(MlAdvisorAgent),
        Stage::Deployment => Box::new(DeploymentAgent),
        Stage::BusinessCommunication => Box::new(BusinessCommunicationAgent),
        Stage::Prd => Box::new(PrdAgent),
    }
}

/// Render a numbered or bulleted list, or `empty` when there is nothing
pub(crate) fn list_or(lines: Vec<String>, empty: &str) -> String {
    if lines.is_empty() {
        empty.to_string()
    } else {
        lines.join("\n")
    }
}
