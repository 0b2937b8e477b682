//! Schema Agent
//!
//! Sends per-column structural facts and asks the model for each column's
//! business type, confidence and keep/drop recommendation.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{Agent, AgentContext, AgentResult, Prepared};
use crate::dataset::{ColumnFacts, Dataset, DatasetSummary};
use crate::pipeline::Stage;
use crate::signatures::{SCHEMA_INTERPRETER, Signature};
use crate::types::Result;

/// Evidence kept with the schema result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaEvidence {
    pub summary: DatasetSummary,
    pub columns: Vec<ColumnFacts>,
}

impl SchemaEvidence {
    pub fn collect(dataset: &Dataset, max_samples: usize) -> Self {
        Self {
            summary: dataset.summary(),
            columns: dataset
                .columns()
                .iter()
                .map(|c| ColumnFacts::from_column(c, max_samples))
                .collect(),
        }
    }
}

/// One column as interpreted by the model
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnInterpretation {
    pub column_name: String,
    pub business_type: String,
    pub confidence: String,
    pub rationale: String,
    pub recommendation: String,
}

impl ColumnInterpretation {
    fn from_record(record: &Value) -> Self {
        let field = |name: &str| record[name].as_str().unwrap_or_default().to_string();
        Self {
            column_name: field("column_name"),
            business_type: field("business_type"),
            confidence: field("confidence"),
            rationale: field("rationale"),
            recommendation: field("recommendation"),
        }
    }
}

/// Interpretations listed in a schema result
pub fn interpretations(result: &AgentResult) -> Vec<ColumnInterpretation> {
    result
        .records("columns")
        .iter()
        .map(ColumnInterpretation::from_record)
        .collect()
}

pub struct SchemaAgent;

impl Agent for SchemaAgent {
    fn stage(&self) -> Stage {
        Stage::Schema
    }

    fn signature(&self) -> &'static Signature {
        &SCHEMA_INTERPRETER
    }

    fn prepare(&self, ctx: &AgentContext<'_>) -> Result<Prepared> {
        let dataset = ctx.dataset()?;
        let evidence = SchemaEvidence::collect(dataset, ctx.config.analysis.max_sample_values);
        let limit = ctx.config.analysis.max_prompt_columns;

        let mut facts: Vec<String> = evidence
            .columns
            .iter()
            .take(limit)
            .map(|c| {
                format!(
                    "- {}: type={}, nulls={} ({}%), unique={}/{}, samples=[{}]",
                    c.name,
                    c.kind,
                    c.null_count,
                    c.null_percentage,
                    c.unique_count,
                    evidence.summary.total_rows,
                    c.sample_values.join(", ")
                )
            })
            .collect();
        if evidence.columns.len() > limit {
            facts.push(format!(
                "... {} more columns not shown: {}",
                evidence.columns.len() - limit,
                evidence.columns[limit..]
                    .iter()
                    .map(|c| c.name.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            ));
        }

        Ok(Prepared::new(vec![
            ("dataset_summary", evidence.summary.describe()),
            ("column_facts", facts.join("\n")),
        ])
        .with_evidence(serde_json::to_value(&evidence)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures;

    #[test]
    fn test_prepare_lists_every_column() {
        let dataset = fixtures::small_dataset();
        let fx = fixtures::Fixture::new();
        let ctx = fx.context(&dataset, Stage::Schema);
        let prepared = SchemaAgent.prepare(&ctx).unwrap();

        let facts = &prepared.inputs[1].1;
        assert!(facts.contains("- id: type=integer"));
        assert!(facts.contains("- region: type=text"));
        assert!(prepared.inputs[0].1.starts_with("small: 4 rows x 3 columns"));

        let evidence: SchemaEvidence =
            serde_json::from_value(prepared.evidence.unwrap()).unwrap();
        assert_eq!(evidence.columns.len(), 3);
    }

    #[test]
    fn test_prepare_caps_prompt_columns() {
        let dataset = fixtures::small_dataset();
        let mut fx = fixtures::Fixture::new();
        fx.config.analysis.max_prompt_columns = 1;
        let ctx = fx.context(&dataset, Stage::Schema);
        let prepared = SchemaAgent.prepare(&ctx).unwrap();
        assert!(prepared.inputs[1].1.contains("... 2 more columns not shown: price, region"));
    }

    #[test]
    fn test_interpretations() {
        let result = fixtures::schema_result(&[("id", "Identifier"), ("price", "Numeric Metric")]);
        let cols = interpretations(&result);
        assert_eq!(cols.len(), 2);
        assert_eq!(cols[1].business_type, "Numeric Metric");
    }
}
