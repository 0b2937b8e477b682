//! Status Command
//!
//! Lists cached sessions, or shows one session's stages and failure.

use console::style;

use crate::cli::ui::Output;
use crate::cli::util::{GlobalOptions, session_id_for};
use crate::config::ConfigLoader;
use crate::pipeline::{SessionCache, Stage};
use crate::report::Report;
use crate::types::{PlanError, Result};

pub async fn run(session: Option<&str>, json: bool, global: &GlobalOptions) -> Result<()> {
    let mut config = ConfigLoader::resolve()?;
    global.apply(&mut config);
    let cache = SessionCache::new(config.output.sessions_dir());
    let output = Output::new(global.quiet);

    let Some(target) = session else {
        let sessions = cache.list().await?;
        if json {
            println!("{}", serde_json::to_string_pretty(&sessions)?);
        } else {
            output.sessions(&sessions);
        }
        return Ok(());
    };

    let id = session_id_for(target);
    let session = cache
        .load(&id)
        .await?
        .ok_or_else(|| PlanError::Session(format!("no session '{}'", id)))?;
    let report = Report::from_state(&session.state);

    if json {
        let status = serde_json::json!({
            "session": session.info(),
            "summary": report.summary(),
            "failure": session.failure,
            "metrics": session.metrics,
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    output.header(&format!("Session {}", session.id));
    println!("Dataset:  {}", session.dataset_name);
    println!("Model:    {}", session.model);
    println!("Created:  {}", session.created_at.format("%Y-%m-%d %H:%M:%S"));
    println!("Updated:  {}", session.updated_at.format("%Y-%m-%d %H:%M:%S"));
    println!("Status:   {}", session.info().status());
    println!();

    for stage in Stage::ANALYSIS {
        let mark = if session.state.contains(stage) {
            style("✓").green()
        } else {
            style("·").dim()
        };
        println!("  {} {}", mark, stage.display_name());
    }
    let prd = if session.document.is_some() {
        style("✓").green()
    } else {
        style("·").dim()
    };
    println!("  {} {}", prd, Stage::Prd.display_name());

    if let Some(failure) = &session.failure {
        println!();
        output.error(&failure.message);
    }
    if let Some(metrics) = &session.metrics {
        println!();
        output.metrics(metrics);
    }
    Ok(())
}
