//! Deployment Agent

use super::ml_advisor::use_case_line;
use super::quality::quality_report;
use super::{Agent, AgentContext, Prepared};
use crate::pipeline::Stage;
use crate::signatures::{DEPLOYMENT_PLANNER, Signature};
use crate::types::Result;

pub struct DeploymentAgent;

impl Agent for DeploymentAgent {
    fn stage(&self) -> Stage {
        Stage::Deployment
    }

    fn signature(&self) -> &'static Signature {
        &DEPLOYMENT_PLANNER
    }

    fn prepare(&self, ctx: &AgentContext<'_>) -> Result<Prepared> {
        let dataset = ctx.dataset()?;
        let advisor = ctx.prior.get(Stage::MlAdvisor)?;
        let quality = quality_report(ctx.prior.get(Stage::Quality)?)?;

        let data_summary = format!(
            "{}\nQuality: {}",
            dataset.summary().describe(),
            quality.summary.describe()
        );

        Ok(Prepared::new(vec![
            ("ml_use_case", use_case_line(advisor)),
            ("feature_plan", advisor.text("feature_plan")),
            ("training_plan", advisor.text("training_recommendations")),
            ("data_summary", data_summary),
        ]))
    }
}
