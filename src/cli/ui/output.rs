use console::style;

use crate::ai::MetricsSummary;
use crate::pipeline::SessionInfo;
use crate::report::{Report, RunStatus};

pub struct Output {
    quiet: bool,
}

impl Output {
    pub fn new(quiet: bool) -> Self {
        Self { quiet }
    }

    pub fn success(&self, message: &str) {
        if !self.quiet {
            println!("{} {}", style("✓").green(), message);
        }
    }

    pub fn error(&self, message: &str) {
        eprintln!("{} {}", style("✗").red(), message);
    }

    pub fn warning(&self, message: &str) {
        eprintln!("{} {}", style("⚠").yellow(), message);
    }

    pub fn info(&self, message: &str) {
        if !self.quiet {
            println!("{} {}", style("ℹ").blue(), message);
        }
    }

    pub fn header(&self, message: &str) {
        println!("\n{}", style(message).bold().underlined());
    }

    pub fn section(&self, message: &str) {
        println!("\n{}", style(message).bold());
        println!("{}", "─".repeat(40));
    }

    /// Terminal rendering of an analysis report
    pub fn report(&self, report: &Report<'_>, dataset_name: &str) {
        self.header(&format!("Data Analysis Report: {}", dataset_name));

        let summary = report.summary();
        let status = match summary.status {
            RunStatus::Complete => style("complete").green(),
            RunStatus::Partial => style("partial").yellow(),
        };
        println!(
            "Status: {} ({}/{} stages)",
            status, summary.stages_completed, summary.stages_total
        );
        if let (Some(use_case), Some(target)) = (&summary.use_case, &summary.target) {
            println!("Use case: {} → target {}", style(use_case).cyan(), target);
        }
        if let Some(score) = summary.suitability {
            println!("ML suitability: {}/100", score);
        }
        if let Some(issues) = &summary.issues {
            let line = issues.describe();
            if issues.critical > 0 {
                println!("Quality: {}", style(line).red());
            } else {
                println!("Quality: {}", line);
            }
        }

        for section in report.sections() {
            self.section(section.title);
            println!("{}", section.body);
        }
    }

    pub fn metrics(&self, metrics: &MetricsSummary) {
        if !self.quiet && metrics.api_calls > 0 {
            println!("{} {}", style("ℹ").blue(), style(metrics.display()).dim());
        }
    }

    pub fn sessions(&self, sessions: &[SessionInfo]) {
        if sessions.is_empty() {
            println!("No sessions yet. Run 'dataplan analyze <file.csv>' first.");
            return;
        }
        self.header("Sessions");
        for info in sessions {
            println!(
                "  {:<24} {:<28} {}  {}",
                style(info.id.as_str()).bold(),
                info.status(),
                info.model,
                style(info.updated_at.format("%Y-%m-%d %H:%M")).dim()
            );
        }
    }
}

impl Default for Output {
    fn default() -> Self {
        Self::new(false)
    }
}
