//! PRD Agent
//!
//! Synthesizes the requirements document from the completed analysis. Only
//! prior results are read; the dataset itself is not needed.

use super::ml_advisor::use_case_line;
use super::quality::quality_report;
use super::{Agent, AgentContext, Prepared, list_or};
use crate::constants::threading::{
    PRD_BUDGET, PRD_EXECUTIVE, PRD_FEATURE_PLAN, PRD_RISKS, PRD_SERVING, PRD_SETUP,
};
use crate::pipeline::Stage;
use crate::signatures::{PRD_GENERATOR, Signature};
use crate::types::{Result, truncate_chars};

pub struct PrdAgent;

impl Agent for PrdAgent {
    fn stage(&self) -> Stage {
        Stage::Prd
    }

    fn signature(&self) -> &'static Signature {
        &PRD_GENERATOR
    }

    fn prepare(&self, ctx: &AgentContext<'_>) -> Result<Prepared> {
        let quality = quality_report(ctx.prior.get(Stage::Quality)?)?;
        let advisor = ctx.prior.get(Stage::MlAdvisor)?;
        let deployment = ctx.prior.get(Stage::Deployment)?;
        let business = ctx.prior.get(Stage::BusinessCommunication)?;

        let clip = |text: String, max: usize| truncate_chars(&text, max).to_string();

        let feature_engineering = format!(
            "{}\n\nTraining: {}",
            clip(advisor.text("feature_plan"), PRD_FEATURE_PLAN),
            advisor.text("training_recommendations")
        );
        let deployment_strategy = format!(
            "{}\n\n{}",
            clip(deployment.text("databricks_setup"), PRD_SETUP),
            clip(deployment.text("serving_strategy"), PRD_SERVING)
        );
        let business_summary = format!(
            "{}\n\nRisks:\n{}\n\nBudget:\n{}",
            clip(business.text("executive_summary"), PRD_EXECUTIVE),
            clip(business.text("risk_matrix"), PRD_RISKS),
            clip(business.text("budget_justification"), PRD_BUDGET)
        );
        let quality_issues = format!(
            "{}\n{}",
            quality.summary.describe(),
            list_or(
                quality
                    .issues
                    .iter()
                    .map(|i| format!("- [{}] {}", i.severity, i.description))
                    .collect(),
                "",
            )
        );

        Ok(Prepared::new(vec![
            ("ml_use_case", use_case_line(advisor)),
            ("feature_engineering", feature_engineering),
            ("deployment_strategy", deployment_strategy),
            ("business_summary", business_summary),
            ("quality_issues", quality_issues.trim_end().to_string()),
        ]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures;

    #[test]
    fn test_prepare_without_dataset() {
        let dataset = fixtures::small_dataset();
        let fx = fixtures::Fixture::with_analysis_through(&dataset, Stage::BusinessCommunication);
        let ctx = fx.context_without_dataset(Stage::Prd);
        let prepared = PrdAgent.prepare(&ctx).unwrap();

        let names: Vec<&str> = prepared.inputs.iter().map(|(n, _)| *n).collect();
        assert_eq!(
            names,
            vec![
                "ml_use_case",
                "feature_engineering",
                "deployment_strategy",
                "business_summary",
                "quality_issues"
            ]
        );
        assert_eq!(prepared.inputs[4].1, "No quality issues detected");
        assert!(prepared.inputs[3].1.starts_with("Executive summary"));
    }

    #[test]
    fn test_prepare_incomplete_state() {
        let dataset = fixtures::small_dataset();
        let fx = fixtures::Fixture::with_analysis_through(&dataset, Stage::MlAdvisor);
        assert!(PrdAgent.prepare(&fx.context_without_dataset(Stage::Prd)).is_err());
    }
}
