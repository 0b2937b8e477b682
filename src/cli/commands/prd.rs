//! PRD Command
//!
//! Writes the Product Requirements Document for a session. The cached
//! document is reused unless `--regenerate` is given; a CSV path with no
//! completed session is analyzed first.
//!
//! Usage:
//!   dataplan prd sales.csv
//!   dataplan prd sales --output docs/prd.md --regenerate

use std::path::{Path, PathBuf};

use crate::cli::util::{CommandContext, GlobalOptions, session_id_for};
use crate::dataset::Dataset;
use crate::pipeline::Session;
use crate::types::{PlanError, Result, SessionId};

pub async fn run(
    target: &str,
    output: Option<PathBuf>,
    regenerate: bool,
    global: &GlobalOptions,
) -> Result<()> {
    let ctx = CommandContext::load(global)?;
    let id = session_id_for(target);
    let supervisor = ctx.supervisor()?;

    let mut session = match ctx.reusable_session(&id).await? {
        Some(session) => session,
        None => {
            let path = Path::new(target);
            if !path.is_file() {
                let cached = ctx.store.get(&id).await?;
                return Err(unusable_session(&id, cached.as_ref(), &ctx.config.llm.model));
            }

            ctx.output.info(&format!(
                "No reusable analysis for '{}'; analyzing first",
                id
            ));
            let dataset = Dataset::from_path(path, &ctx.config.analysis)?;
            let mut session = Session::new(dataset.name(), &ctx.config.llm.model);
            match supervisor.run_pipeline(&dataset).await {
                Ok(state) => session.record_success(state, supervisor.metrics()),
                Err(failure) => {
                    session.record_failure(&failure, supervisor.metrics());
                    ctx.store.put(session).await?;
                    return Err(failure.error);
                }
            }
            session
        }
    };

    if regenerate {
        session.document = None;
    }
    let path = output.unwrap_or_else(|| ctx.default_prd_path());
    let written = session.prd(&supervisor).await?.write_to(&path)?;
    ctx.store.put(session).await?;

    ctx.output.metrics(&supervisor.metrics());
    ctx.output
        .success(&format!("PRD written to {}", written.display()));
    Ok(())
}

/// Error for a session name that has no results usable with `model`
fn unusable_session(id: &SessionId, cached: Option<&Session>, model: &str) -> PlanError {
    match cached {
        None => PlanError::Session(format!(
            "no session '{}'; run 'dataplan analyze <file.csv>' first",
            id
        )),
        Some(session) if !session.is_complete() => PlanError::PipelineIncomplete {
            missing: session
                .state
                .missing_analysis()
                .iter()
                .map(|s| s.key().to_string())
                .collect(),
        },
        Some(session) => PlanError::Session(format!(
            "session '{}' was produced by {}, not {}; pass --model {} or analyze the CSV again",
            id, session.model, model, session.model
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::Stage;
    use crate::testing::fixtures::{self, Fixture};

    #[test]
    fn test_unusable_session_errors() {
        let id = SessionId::from_dataset_name("small");
        let err = unusable_session(&id, None, "gpt-4.1");
        assert!(err.to_string().contains("no session 'small'"));

        let dataset = fixtures::small_dataset();
        let fx = Fixture::with_analysis_through(&dataset, Stage::Quality);
        let mut session = Session::new("small", "gpt-4.1");
        session.state = fx.state.clone();
        match unusable_session(&id, Some(&session), "gpt-4.1") {
            PlanError::PipelineIncomplete { missing } => {
                assert_eq!(missing, vec!["ml_advisor", "deployment", "business_communication"]);
            }
            other => panic!("unexpected error: {:?}", other),
        }

        let fx = Fixture::with_analysis_through(&dataset, Stage::BusinessCommunication);
        let mut session = Session::new("small", "gpt-4o");
        session.record_success(fx.state.clone(), Default::default());
        let err = unusable_session(&id, Some(&session), "gpt-4.1");
        assert!(err.to_string().contains("was produced by gpt-4o, not gpt-4.1"));
    }
}
