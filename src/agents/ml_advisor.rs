//! ML Advisor Agent
//!
//! Detects the use case and target, scores ML readiness and writes the
//! feature-engineering plan in a single call. The planning instructions
//! carry the focus notes for every supported use case; the model applies
//! the one matching its own detection.

use std::collections::HashMap;

use super::profile::ProfileEvidence;
use super::quality::quality_report;
use super::schema::{SchemaEvidence, interpretations};
use super::{Agent, AgentContext, AgentResult, Prepared};
use crate::constants::advisor::{KEY_COLUMNS, LOW_CARDINALITY, NULL_FLAG_PCT, SUMMARY_COLUMNS};
use crate::dataset::ColumnFacts;
use crate::pipeline::Stage;
use crate::signatures::{ML_USE_CASE_ADVISOR, Signature};
use crate::types::Result;

const BASE_PLAN: &str = "Write the feature_plan as markdown with these sections:
## 1. Data Preparation
- train/validation/test split ratios, preprocessing, feature transformations per column
## 2. Model Training
- a named baseline model, stronger candidate algorithms, training sequence
## 3. Evaluation & Validation
- primary metrics, cross-validation strategy, holdout evaluation
## 4. Hyperparameter Tuning
- key parameters and the search strategy (grid, random or bayesian)
## 5. MLflow Tracking
- experiment setup, parameters and metrics to log, artifact storage
## 6. Deployment & Monitoring
- serialization format, monitoring metrics, retraining triggers
Keep each bullet concise and actionable.";

const USE_CASE_FOCUS: &[(&str, &str)] = &[
    (
        "classification",
        "class imbalance handling, precision/recall tradeoffs, ROC-AUC, confusion matrix analysis",
    ),
    (
        "regression",
        "RMSE, MAE, R², residual analysis, outlier detection and handling",
    ),
    (
        "clustering",
        "silhouette score, elbow method, feature scaling requirements, cluster interpretation",
    ),
];

pub fn planning_instructions() -> String {
    let mut text = String::from(BASE_PLAN);
    text.push_str("\n\nApply the focus matching the detected use case:");
    for (use_case, focus) in USE_CASE_FOCUS {
        text.push_str(&format!("\n- {}: {}", use_case, focus));
    }
    text
}

/// `"<use case> | Target: <target> | Score: <n>/100"`
pub fn use_case_line(advisor: &AgentResult) -> String {
    format!(
        "{} | Target: {} | Score: {}/100",
        advisor.text("detected_use_case"),
        advisor.text("target_variable"),
        advisor.integer("suitability_score").unwrap_or_default()
    )
}

fn type_mix(columns: &[ColumnFacts]) -> String {
    let mut counts: Vec<(String, usize)> = Vec::new();
    for column in columns {
        let kind = column.kind.to_string();
        match counts.iter_mut().find(|(k, _)| *k == kind) {
            Some((_, n)) => *n += 1,
            None => counts.push((kind, 1)),
        }
    }
    counts
        .iter()
        .map(|(k, n)| format!("{} {}", n, k))
        .collect::<Vec<_>>()
        .join(", ")
}

pub struct MlAdvisorAgent;

impl Agent for MlAdvisorAgent {
    fn stage(&self) -> Stage {
        Stage::MlAdvisor
    }

    fn signature(&self) -> &'static Signature {
        &ML_USE_CASE_ADVISOR
    }

    fn prepare(&self, ctx: &AgentContext<'_>) -> Result<Prepared> {
        let schema = ctx.prior.get(Stage::Schema)?;
        let profile: ProfileEvidence = ctx.prior.get(Stage::Profile)?.evidence_as()?;
        let quality = quality_report(ctx.prior.get(Stage::Quality)?)?;
        let evidence: SchemaEvidence = schema.evidence_as()?;

        let business_types: HashMap<String, String> = interpretations(schema)
            .into_iter()
            .map(|c| (c.column_name, c.business_type))
            .collect();
        let business_type = |facts: &ColumnFacts| {
            business_types
                .get(&facts.name)
                .cloned()
                .unwrap_or_else(|| facts.kind.to_string())
        };

        let summary = &evidence.summary;
        let overview = format!(
            "Dataset: {} rows, {} columns, {:.1}MB; column types: {}",
            summary.total_rows,
            summary.total_columns,
            summary.memory_usage_mb,
            type_mix(&evidence.columns)
        );

        let key_columns = evidence
            .columns
            .iter()
            .take(KEY_COLUMNS)
            .map(|c| {
                let mut line = format!(
                    "{} ({}, {}% nulls, {} unique",
                    c.name,
                    business_type(c),
                    c.null_percentage,
                    c.unique_count
                );
                if let Some(shape) = profile.shape_of(&c.name) {
                    line.push_str(&format!(", {}", shape));
                }
                line.push(')');
                line
            })
            .collect::<Vec<_>>()
            .join("; ");

        let column_summary = evidence
            .columns
            .iter()
            .take(SUMMARY_COLUMNS)
            .map(|c| {
                let mut line = format!("- {}: {}, {}", c.name, business_type(c), c.kind);
                if c.unique_count < LOW_CARDINALITY {
                    line.push_str(&format!(", {} categories", c.unique_count));
                } else if c.unique_count == summary.total_rows {
                    line.push_str(", unique identifier");
                }
                if c.null_percentage > NULL_FLAG_PCT {
                    line.push_str(&format!(", {}% nulls", c.null_percentage));
                }
                line
            })
            .collect::<Vec<_>>()
            .join("\n");

        Ok(Prepared::new(vec![
            ("dataset_overview", overview),
            ("key_columns", key_columns),
            ("quality_issues", quality.summary.describe()),
            ("column_summary", column_summary),
            ("planning_instructions", planning_instructions()),
        ]))
    }
}
