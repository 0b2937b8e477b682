//! Analysis report
//!
//! A read-only view over a [`PipelineState`]: one section per completed
//! stage plus a run summary. The same section bodies feed the terminal
//! output, `--output report.md` and the PRD appendix.

pub mod document;

pub use document::Document;

use serde::Serialize;
use serde_json::Value;

use crate::agents::profile::ProfileEvidence;
use crate::agents::quality::quality_report;
use crate::agents::schema::{SchemaEvidence, interpretations};
use crate::agents::{AgentResult, agent_for};
use crate::dataset::QualitySummary;
use crate::pipeline::{PipelineState, Stage};
use crate::types::{Result, capitalize_first, json_text};

/// Section heading used for a stage in reports and the PRD appendix
pub fn section_title(stage: Stage) -> &'static str {
    match stage {
        Stage::Schema => "Schema Analysis",
        Stage::Profile => "Statistical Profile",
        Stage::Quality => "Data Quality",
        Stage::MlAdvisor => "ML Use Case",
        Stage::Deployment => "Deployment Plan",
        Stage::BusinessCommunication => "Business Communication",
        Stage::Prd => "Product Requirements",
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Complete,
    Partial,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportSummary {
    pub status: RunStatus,
    pub stages_completed: usize,
    pub stages_total: usize,
    pub use_case: Option<String>,
    pub target: Option<String>,
    pub suitability: Option<i64>,
    pub issues: Option<QualitySummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportSection {
    pub stage: Stage,
    pub title: &'static str,
    /// Markdown body without the heading
    pub body: String,
}

pub struct Report<'a> {
    state: &'a PipelineState,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    summary: ReportSummary,
    results: Vec<&'a AgentResult>,
}

impl<'a> Report<'a> {
    pub fn from_state(state: &'a PipelineState) -> Self {
        Self { state }
    }

    pub fn summary(&self) -> ReportSummary {
        let advisor = self.state.get(Stage::MlAdvisor);
        let non_empty = |s: String| (!s.is_empty()).then_some(s);
        ReportSummary {
            status: if self.state.is_complete() {
                RunStatus::Complete
            } else {
                RunStatus::Partial
            },
            stages_completed: Stage::ANALYSIS
                .iter()
                .filter(|s| self.state.contains(**s))
                .count(),
            stages_total: Stage::ANALYSIS.len(),
            use_case: advisor.and_then(|a| non_empty(a.text("detected_use_case"))),
            target: advisor.and_then(|a| non_empty(a.text("target_variable"))),
            suitability: advisor.and_then(|a| a.integer("suitability_score")),
            issues: self
                .state
                .get(Stage::Quality)
                .and_then(|q| quality_report(q).ok())
                .map(|r| r.summary),
        }
    }

    /// Sections of the completed analysis stages, in pipeline order
    pub fn sections(&self) -> Vec<ReportSection> {
        Stage::ANALYSIS
            .iter()
            .filter_map(|stage| self.state.get(*stage))
            .map(|result| ReportSection {
                stage: result.stage,
                title: section_title(result.stage),
                body: render_section(result),
            })
            .collect()
    }

    pub fn markdown(&self, dataset_name: &str) -> String {
        let summary = self.summary();
        let mut out = format!("# Data Analysis Report: {}\n\n", dataset_name);
        out.push_str(&summary_markdown(&summary));
        for section in self.sections() {
            out.push_str(&format!("\n## {}\n\n{}\n", section.title, section.body));
        }
        out
    }

    pub fn to_json(&self) -> Result<String> {
        let report = JsonReport {
            summary: self.summary(),
            results: self.state.iter().collect(),
        };
        Ok(serde_json::to_string_pretty(&report)?)
    }
}

fn summary_markdown(summary: &ReportSummary) -> String {
    let status = match summary.status {
        RunStatus::Complete => "complete",
        RunStatus::Partial => "partial",
    };
    let mut out = format!(
        "- **Status:** {} ({}/{} stages)\n",
        status, summary.stages_completed, summary.stages_total
    );
    if let Some(use_case) = &summary.use_case {
        out.push_str(&format!("- **Use case:** {}\n", use_case));
    }
    if let Some(target) = &summary.target {
        out.push_str(&format!("- **Target:** {}\n", target));
    }
    if let Some(score) = summary.suitability {
        out.push_str(&format!("- **ML suitability:** {}/100\n", score));
    }
    if let Some(issues) = &summary.issues {
        out.push_str(&format!("- **Quality:** {}\n", issues.describe()));
    }
    out
}

// =============================================================================
// Section rendering
// =============================================================================

pub(crate) fn render_section(result: &AgentResult) -> String {
    let body = match result.stage {
        Stage::Schema => render_schema(result),
        Stage::Profile => render_profile(result),
        Stage::Quality => render_quality(result),
        Stage::MlAdvisor => render_advisor(result),
        Stage::Deployment | Stage::BusinessCommunication | Stage::Prd => {
            render_declared_fields(result)
        }
    };
    body.trim_end().to_string()
}

/// Table cell text: one line, pipes escaped
fn cell(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .replace('|', "\\|")
}

fn field_heading(name: &str) -> String {
    capitalize_first(&name.replace('_', " "))
}

fn render_schema(result: &AgentResult) -> String {
    let mut out = String::new();
    let evidence: Option<SchemaEvidence> = result.evidence_as().ok();
    if let Some(evidence) = &evidence {
        out.push_str(&format!("Dataset: {}\n\n", evidence.summary.describe()));
    }

    out.push_str("| Column | Type | Nulls | Business Type | Confidence | Recommendation |\n");
    out.push_str("|---|---|---|---|---|---|\n");
    let columns = interpretations(result);
    for column in &columns {
        let facts = evidence
            .as_ref()
            .and_then(|e| e.columns.iter().find(|c| c.name == column.column_name));
        let (kind, nulls) = match facts {
            Some(f) => (f.kind.to_string(), format!("{}%", f.null_percentage)),
            None => ("-".to_string(), "-".to_string()),
        };
        out.push_str(&format!(
            "| {} | {} | {} | {} | {} | {} |\n",
            cell(&column.column_name),
            kind,
            nulls,
            cell(&column.business_type),
            cell(&column.confidence),
            cell(&column.recommendation)
        ));
    }

    let rationales: Vec<String> = columns
        .iter()
        .filter(|c| !c.rationale.is_empty())
        .map(|c| format!("- **{}**: {}", c.column_name, c.rationale))
        .collect();
    if !rationales.is_empty() {
        out.push_str(&format!("\n{}\n", rationales.join("\n")));
    }
    out
}

fn render_insights(records: &[Value]) -> String {
    records
        .iter()
        .map(|r| {
            let mut line = format!(
                "- **{}** ({}): {}",
                json_text(&r["column_name"]),
                json_text(&r["pattern_detected"]),
                json_text(&r["insight"])
            );
            let suggestion = json_text(&r["actionable_suggestion"]);
            if !suggestion.is_empty() {
                line.push_str(&format!(" Suggestion: {}", suggestion));
            }
            line
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_profile(result: &AgentResult) -> String {
    let mut out = String::new();
    if let Ok(evidence) = result.evidence_as::<ProfileEvidence>() {
        if !evidence.numeric.is_empty() {
            out.push_str("| Column | Mean | Median | Std | Min | Max | Shape |\n");
            out.push_str("|---|---|---|---|---|---|---|\n");
            for n in &evidence.numeric {
                out.push_str(&format!(
                    "| {} | {:.2} | {:.2} | {:.2} | {:.2} | {:.2} | {} |\n",
                    cell(&n.column),
                    n.mean,
                    n.median,
                    n.std,
                    n.min,
                    n.max,
                    n.shape.label()
                ));
            }
            out.push('\n');
        }
        if !evidence.categorical.is_empty() {
            out.push_str("| Column | Unique | Top Value |\n|---|---|---|\n");
            for c in &evidence.categorical {
                let top = match &c.top_value {
                    Some(v) => format!("{} ({})", cell(v), c.top_frequency),
                    None => "-".to_string(),
                };
                out.push_str(&format!("| {} | {} | {} |\n", cell(&c.column), c.cardinality, top));
            }
            out.push('\n');
        }
    }

    for (field, heading) in [
        ("numeric_insights", "Numeric Insights"),
        ("categorical_insights", "Categorical Insights"),
    ] {
        let records = result.records(field);
        if !records.is_empty() {
            out.push_str(&format!("### {}\n\n{}\n\n", heading, render_insights(records)));
        }
    }
    out.push_str(&result.text("overall_observation"));
    out
}

fn render_quality(result: &AgentResult) -> String {
    let mut out = String::new();
    if let Ok(report) = quality_report(result) {
        out.push_str(&format!("{}\n\n", report.summary.describe()));
        for issue in &report.issues {
            out.push_str(&format!("- [{}] {}\n", issue.severity, issue.description));
        }
        if !report.issues.is_empty() {
            out.push('\n');
        }
    }

    let recommendations = result.records("recommendations");
    if !recommendations.is_empty() {
        out.push_str("### Recommendations\n\n");
        for r in recommendations {
            out.push_str(&format!(
                "**{}**: {}\n\n",
                json_text(&r["issue_id"]),
                json_text(&r["recommended_action"])
            ));
            let impact = json_text(&r["impact_description"]);
            if !impact.is_empty() {
                out.push_str(&format!("Impact: {}\n\n", impact));
            }
            let code = json_text(&r["code_snippet"]);
            if !code.trim().is_empty() {
                out.push_str(&format!("```python\n{}\n```\n\n", code.trim()));
            }
        }
    }
    out.push_str(&result.text("overall_assessment"));
    out
}

fn render_advisor(result: &AgentResult) -> String {
    let mut out = format!(
        "- **Use case:** {}\n- **Target:** {}\n- **ML suitability:** {}/100\n- **Alternative:** {}\n\n{}\n\n",
        result.text("detected_use_case"),
        result.text("target_variable"),
        result.integer("suitability_score").unwrap_or_default(),
        result.text("alternative_use_case"),
        result.text("target_reasoning")
    );
    for (field, heading) in [
        ("feature_plan", "Feature Engineering Plan"),
        ("training_recommendations", "Training Recommendations"),
        ("mlflow_setup", "MLflow Setup"),
    ] {
        out.push_str(&format!("### {}\n\n{}\n\n", heading, result.text(field).trim()));
    }
    out
}

/// Every declared output as its own subsection, in declaration order
fn render_declared_fields(result: &AgentResult) -> String {
    let signature = agent_for(result.stage).signature();
    if signature.outputs.len() == 1 {
        return result.text(signature.outputs[0].name);
    }
    signature
        .outputs
        .iter()
        .map(|field| {
            format!(
                "### {}\n\n{}\n\n",
                field_heading(field.name),
                result.text(field.name).trim()
            )
        })
        .collect()
}
