//! Stage Progress
//!
//! Prints one line when a stage starts and one when it finishes or fails.

use console::style;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::agents::AgentResult;
use crate::pipeline::{Stage, StageObserver};
use crate::types::PlanError;

/// Terminal observer for supervisor runs; silent when `quiet`
pub struct ConsoleProgress {
    quiet: bool,
    finished: AtomicUsize,
}

impl ConsoleProgress {
    pub fn new(quiet: bool) -> Self {
        Self {
            quiet,
            finished: AtomicUsize::new(0),
        }
    }

    /// Stages finished so far
    pub fn finished(&self) -> usize {
        self.finished.load(Ordering::Relaxed)
    }
}

impl StageObserver for ConsoleProgress {
    fn stage_started(&self, stage: Stage) {
        if !self.quiet {
            println!("{} {}", style("▸").cyan(), started_line(stage));
        }
    }

    fn stage_finished(&self, stage: Stage, result: &AgentResult, elapsed: Duration) {
        self.finished.fetch_add(1, Ordering::Relaxed);
        if self.quiet {
            return;
        }
        let tokens = result
            .metrics
            .as_ref()
            .map(|m| m.input_tokens + m.output_tokens);
        println!(
            "{} {}",
            style("✓").green(),
            finished_line(stage, elapsed, tokens)
        );
    }

    fn stage_failed(&self, stage: Stage, error: &PlanError) {
        eprintln!("{} {}", style("✗").red(), failed_line(stage, error));
    }
}

fn started_line(stage: Stage) -> String {
    format!("Running {} Agent...", stage.display_name())
}

fn finished_line(stage: Stage, elapsed: Duration, tokens: Option<u64>) -> String {
    let mut line = format!(
        "{} Agent ({}",
        stage.display_name(),
        format_duration(elapsed)
    );
    if let Some(tokens) = tokens.filter(|t| *t > 0) {
        line.push_str(&format!(", {} tokens", tokens));
    }
    line.push(')');
    line
}

fn failed_line(stage: Stage, error: &PlanError) -> String {
    let message = match error {
        PlanError::Generation { message, .. } => message.clone(),
        other => other.to_string(),
    };
    format!("{} Agent failed: {}", stage.display_name(), message)
}

/// Format a duration as human-readable text
pub fn format_duration(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    if secs < 60 {
        format!("{:.1}s", elapsed.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m", secs / 3600, (secs % 3600) / 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lines() {
        assert_eq!(started_line(Stage::MlAdvisor), "Running ML Advisor Agent...");
        assert_eq!(
            finished_line(Stage::Schema, Duration::from_millis(1500), Some(1200)),
            "Schema Agent (1.5s, 1200 tokens)"
        );
        assert_eq!(
            finished_line(Stage::Profile, Duration::from_millis(200), Some(0)),
            "Profile Agent (0.2s)"
        );
    }

    #[test]
    fn test_failed_line_uses_inner_message() {
        let error = PlanError::generation("Deployment", "model returned no JSON".to_string());
        assert_eq!(
            failed_line(Stage::Deployment, &error),
            "Deployment Agent failed: model returned no JSON"
        );
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_secs(30)), "30.0s");
        assert_eq!(format_duration(Duration::from_secs(90)), "1m 30s");
        assert_eq!(format_duration(Duration::from_secs(3700)), "1h 1m");
    }

    #[test]
    fn test_counts_finished_stages() {
        let progress = ConsoleProgress::new(true);
        let result = crate::testing::fixtures::result(
            Stage::Prd,
            serde_json::json!({ "prd_document": "# PRD" }),
        );
        progress.stage_finished(Stage::Prd, &result, Duration::ZERO);
        assert_eq!(progress.finished(), 1);
    }
}
