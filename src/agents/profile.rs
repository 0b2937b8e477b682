//! Profile Agent

use serde::{Deserialize, Serialize};

use super::{Agent, AgentContext, Prepared, list_or};
use crate::dataset::{CategoricalSummary, Dataset, NumericSummary};
use crate::pipeline::Stage;
use crate::signatures::{STATISTICAL_INSIGHTS, Signature};
use crate::types::Result;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileEvidence {
    pub numeric: Vec<NumericSummary>,
    pub categorical: Vec<CategoricalSummary>,
}

impl ProfileEvidence {
    pub fn collect(dataset: &Dataset) -> Self {
        let mut evidence = Self::default();
        for column in dataset.columns() {
            if column.kind().is_numeric() {
                if let Some(summary) =
                    NumericSummary::from_values(column.name(), &column.numeric_values())
                {
                    evidence.numeric.push(summary);
                }
            } else if column.kind().is_categorical() {
                evidence.categorical.push(CategoricalSummary::from_column(column));
            }
        }
        evidence
    }

    /// Shape label of a numeric column, if it was profiled
    pub fn shape_of(&self, column: &str) -> Option<&'static str> {
        self.numeric
            .iter()
            .find(|s| s.column == column)
            .map(|s| s.shape.label())
    }
}

fn describe_numeric(s: &NumericSummary) -> String {
    format!(
        "- {}: count={}, mean={:.3}, median={:.3}, std={:.3}, min={}, max={}, q25={:.3}, q75={:.3}, skewness={:.3} ({})",
        s.column,
        s.count,
        s.mean,
        s.median,
        s.std,
        s.min,
        s.max,
        s.q25,
        s.q75,
        s.skewness,
        s.shape.label()
    )
}

fn describe_categorical(s: &CategoricalSummary) -> String {
    let top: Vec<String> = s
        .top_values
        .iter()
        .map(|(value, count)| format!("{} ({})", value, count))
        .collect();
    format!(
        "- {}: cardinality={}, non-null={}, top values: {}",
        s.column,
        s.cardinality,
        s.total_count,
        top.join(", ")
    )
}

pub struct ProfileAgent;

impl Agent for ProfileAgent {
    fn stage(&self) -> Stage {
        Stage::Profile
    }

    fn signature(&self) -> &'static Signature {
        &STATISTICAL_INSIGHTS
    }

    fn prepare(&self, ctx: &AgentContext<'_>) -> Result<Prepared> {
        let evidence = ProfileEvidence::collect(ctx.dataset()?);
        let limit = ctx.config.analysis.max_prompt_columns;

        let numeric = list_or(
            evidence.numeric.iter().take(limit).map(describe_numeric).collect(),
            "No numeric columns",
        );
        let categorical = list_or(
            evidence
                .categorical
                .iter()
                .take(limit)
                .map(describe_categorical)
                .collect(),
            "No categorical columns",
        );

        Ok(Prepared::new(vec![
            ("numeric_profiles", numeric),
            ("categorical_profiles", categorical),
        ])
        .with_evidence(serde_json::to_value(&evidence)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::DistributionShape;
    use crate::testing::fixtures;

    #[test]
    fn test_collect_splits_by_kind() {
        let evidence = ProfileEvidence::collect(&fixtures::small_dataset());
        let numeric: Vec<&str> = evidence.numeric.iter().map(|s| s.column.as_str()).collect();
        assert_eq!(numeric, vec!["id", "price"]);
        assert_eq!(evidence.categorical.len(), 1);
        assert_eq!(evidence.categorical[0].top_value.as_deref(), Some("north"));
        assert_eq!(evidence.shape_of("id"), Some(DistributionShape::Normal.label()));
        assert_eq!(evidence.shape_of("region"), None);
    }

    #[test]
    fn test_prepare_inputs() {
        let dataset = fixtures::small_dataset();
        let fx = fixtures::Fixture::new();
        let prepared = ProfileAgent.prepare(&fx.context(&dataset, Stage::Profile)).unwrap();
        assert_eq!(prepared.inputs[0].0, "numeric_profiles");
        assert!(prepared.inputs[0].1.contains("- price: count=4"));
        assert!(prepared.inputs[1].1.contains("north (2)"));
    }

    #[test]
    fn test_prepare_without_categoricals() {
        let dataset = fixtures::dataset("nums", "a,b\n1,2\n3,4\n");
        let fx = fixtures::Fixture::new();
        let prepared = ProfileAgent.prepare(&fx.context(&dataset, Stage::Profile)).unwrap();
        assert_eq!(prepared.inputs[1].1, "No categorical columns");
    }
}
