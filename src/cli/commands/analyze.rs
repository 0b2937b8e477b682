//! Analyze Command
//!
//! Runs the six analysis stages over a CSV file and prints the report.
//!
//! Usage:
//!   dataplan analyze sales.csv
//!   dataplan analyze sales.csv --format json --output report.json
//!   dataplan analyze sales.csv --prd

use clap::ValueEnum;
use std::path::{Path, PathBuf};

use crate::cli::util::{CommandContext, GlobalOptions};
use crate::dataset::Dataset;
use crate::pipeline::Session;
use crate::report::Report;
use crate::types::{PlanError, Result, SessionId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ReportFormat {
    #[default]
    Text,
    Markdown,
    Json,
}

pub struct AnalyzeOptions {
    pub file: PathBuf,
    pub fresh: bool,
    pub format: ReportFormat,
    pub output: Option<PathBuf>,
    /// `Some(None)` writes the PRD to the default location
    pub prd: Option<Option<PathBuf>>,
}

pub async fn run(options: AnalyzeOptions, global: &GlobalOptions) -> Result<()> {
    let ctx = CommandContext::load(global)?;
    let dataset = Dataset::from_path(&options.file, &ctx.config.analysis)?;
    let id = SessionId::from_dataset_name(dataset.name());

    if options.fresh {
        ctx.store.forget(&id).await?;
    }

    let supervisor = ctx.supervisor()?;
    let mut session = match ctx.reusable_session(&id).await? {
        Some(session) => {
            ctx.output.info(&format!(
                "Reusing analysis from session '{}' (use --fresh to rerun)",
                id
            ));
            session
        }
        None => {
            let mut session = Session::new(dataset.name(), &ctx.config.llm.model);
            match supervisor.run_pipeline(&dataset).await {
                Ok(state) => {
                    session.record_success(state, supervisor.metrics());
                    ctx.store.put(session.clone()).await?;
                }
                Err(failure) => {
                    session.record_failure(&failure, supervisor.metrics());
                    ctx.store.put(session).await?;
                    return Err(failure.error);
                }
            }
            ctx.output.metrics(&supervisor.metrics());
            session
        }
    };

    render(&ctx, &session, options.format, options.output.as_deref())?;

    if let Some(prd_path) = options.prd {
        let path = prd_path.unwrap_or_else(|| ctx.default_prd_path());
        let written = session.prd(&supervisor).await?.write_to(&path)?;
        ctx.store.put(session).await?;
        ctx.output
            .success(&format!("PRD written to {}", written.display()));
    }
    Ok(())
}

fn render(
    ctx: &CommandContext,
    session: &Session,
    format: ReportFormat,
    output: Option<&Path>,
) -> Result<()> {
    let report = Report::from_state(&session.state);
    let rendered = match (format, output) {
        (ReportFormat::Json, _) => report.to_json()?,
        (ReportFormat::Markdown, _) | (ReportFormat::Text, Some(_)) => {
            report.markdown(&session.dataset_name)
        }
        (ReportFormat::Text, None) => {
            ctx.output.report(&report, &session.dataset_name);
            return Ok(());
        }
    };

    match output {
        Some(path) => {
            write_file(path, &rendered)?;
            ctx.output
                .success(&format!("Report written to {}", path.display()));
        }
        None => println!("{}", rendered),
    }
    Ok(())
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, content).map_err(|e| {
        PlanError::Io(std::io::Error::new(
            e.kind(),
            format!("{}: {}", path.display(), e),
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_file_creates_parents() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("reports/run.md");
        write_file(&path, "# Report").unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), "# Report");
    }
}
