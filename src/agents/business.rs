//! Business Communication Agent

use super::ml_advisor::use_case_line;
use super::{Agent, AgentContext, Prepared};
use crate::constants::threading::DEPLOYMENT_SUMMARY_PART;
use crate::pipeline::Stage;
use crate::signatures::{BUSINESS_COMMUNICATION, Signature};
use crate::types::{Result, truncate_chars};

pub struct BusinessCommunicationAgent;

impl Agent for BusinessCommunicationAgent {
    fn stage(&self) -> Stage {
        Stage::BusinessCommunication
    }

    fn signature(&self) -> &'static Signature {
        &BUSINESS_COMMUNICATION
    }

    fn prepare(&self, ctx: &AgentContext<'_>) -> Result<Prepared> {
        let advisor = ctx.prior.get(Stage::MlAdvisor)?;
        let deployment = ctx.prior.get(Stage::Deployment)?;

        let part = |field: &str| {
            truncate_chars(&deployment.text(field), DEPLOYMENT_SUMMARY_PART).to_string()
        };
        let deployment_summary = format!(
            "Team: {}\nTimeline: {}\nCosts: {}",
            part("team_requirements"),
            part("implementation_roadmap"),
            part("cost_estimation")
        );

        Ok(Prepared::new(vec![
            ("ml_use_case", use_case_line(advisor)),
            ("deployment_summary", deployment_summary),
            ("technical_risks", deployment.text("risk_mitigation")),
            ("success_metrics", deployment.text("success_metrics")),
        ]))
    }
}
