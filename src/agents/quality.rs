//! Quality Agent
//!
//! Issues are detected locally; the model explains and prioritizes fixes.
//! The detected report is kept as evidence so later stages and the report
//! read the same issue list the model saw.

use super::{Agent, AgentContext, AgentResult, Prepared, list_or};
use crate::dataset::{QualityIssue, QualityReport};
use crate::pipeline::Stage;
use crate::signatures::{QUALITY_RECOMMENDER, Signature};
use crate::types::Result;

fn describe_issue(issue: &QualityIssue) -> String {
    let mut line = format!(
        "- [{}] id={} type={} column={} count={} ({}%): {}",
        issue.severity,
        issue.id,
        issue.issue_type,
        issue.column.as_deref().unwrap_or("(all)"),
        issue.count,
        issue.percentage,
        issue.description
    );
    if !issue.samples.is_empty() {
        line.push_str(&format!("; samples: {}", issue.samples.join(", ")));
    }
    line
}

/// Detected issues stored with a quality result
pub fn quality_report(result: &AgentResult) -> Result<QualityReport> {
    result.evidence_as()
}

pub struct QualityAgent;

impl Agent for QualityAgent {
    fn stage(&self) -> Stage {
        Stage::Quality
    }

    fn signature(&self) -> &'static Signature {
        &QUALITY_RECOMMENDER
    }

    fn prepare(&self, ctx: &AgentContext<'_>) -> Result<Prepared> {
        let dataset = ctx.dataset()?;
        let report = QualityReport::detect(dataset);

        let issues = list_or(
            report.issues.iter().map(describe_issue).collect(),
            "No quality issues detected",
        );
        let header = format!("{}\n\n{}", report.summary.describe(), issues);

        Ok(Prepared::new(vec![
            ("dataset_summary", dataset.summary().describe()),
            ("detected_issues", header),
        ])
        .with_evidence(serde_json::to_value(&report)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Severity;
    use crate::testing::fixtures;

    #[test]
    fn test_clean_dataset() {
        let dataset = fixtures::small_dataset();
        let fx = fixtures::Fixture::new();
        let prepared = QualityAgent.prepare(&fx.context(&dataset, Stage::Quality)).unwrap();
        assert!(prepared.inputs[1].1.starts_with("No quality issues detected"));

        let report: QualityReport = serde_json::from_value(prepared.evidence.unwrap()).unwrap();
        assert_eq!(report.summary.total_issues, 0);
    }

    #[test]
    fn test_issues_listed() {
        let dataset = fixtures::dataset("gaps", "a,b\n1,\n2,\n3,x\n1,\n");
        let fx = fixtures::Fixture::new();
        let prepared = QualityAgent.prepare(&fx.context(&dataset, Stage::Quality)).unwrap();
        let text = &prepared.inputs[1].1;
        assert!(text.contains("[critical] id=missing_values:b"));

        let report: QualityReport = serde_json::from_value(prepared.evidence.unwrap()).unwrap();
        assert_eq!(report.issues[0].severity, Severity::Critical);
    }
}
