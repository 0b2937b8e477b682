//! Pipeline Supervisor
//!
//! Runs the analysis stages strictly in order, one model call at a time,
//! threading each result into the state later stages read from. The first
//! failure stops the run; the results produced before it are returned with
//! the error.
//!
//! ```text
//! schema → profile → quality → ml_advisor → deployment → business_communication
//!                                                              │
//!                                   generate_prd(&state) ──────┘→ Document
//! ```

pub mod session;
pub mod state;

pub use session::{Session, SessionCache, SessionInfo, SessionStore};
pub use state::{PipelineState, PriorResults, Stage};

use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{error, info};

use crate::agents::{Agent, AgentContext, AgentResult, agent_for};
use crate::ai::{MetricsCollector, MetricsSummary, SharedProvider, with_timeout};
use crate::config::Config;
use crate::dataset::Dataset;
use crate::report::Document;
use crate::types::{PlanError, Result};

/// A run that stopped at a failing stage
#[derive(Debug, Error)]
#[error("{error}")]
pub struct PipelineFailure {
    /// Results of the stages that completed before the failure
    pub partial: PipelineState,
    pub error: PlanError,
}

/// Progress callbacks, e.g. for terminal output
pub trait StageObserver: Send + Sync {
    fn stage_started(&self, _stage: Stage) {}
    fn stage_finished(&self, _stage: Stage, _result: &AgentResult, _elapsed: Duration) {}
    fn stage_failed(&self, _stage: Stage, _error: &PlanError) {}
}

pub struct Supervisor {
    provider: SharedProvider,
    config: Config,
    metrics: MetricsCollector,
    observer: Option<Box<dyn StageObserver>>,
}

impl Supervisor {
    pub fn new(provider: SharedProvider, config: Config) -> Self {
        Self {
            provider,
            config,
            metrics: MetricsCollector::new(),
            observer: None,
        }
    }

    pub fn with_observer(mut self, observer: Box<dyn StageObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn metrics(&self) -> MetricsSummary {
        self.metrics.summary()
    }

    fn stage_timeout(&self) -> Duration {
        Duration::from_secs(self.config.llm.timeout_secs)
    }

    /// Run every analysis stage once, in order.
    pub async fn run_pipeline(
        &self,
        dataset: &Dataset,
    ) -> std::result::Result<PipelineState, PipelineFailure> {
        info!(
            "Starting pipeline for '{}' ({} rows x {} columns) with {}/{}",
            dataset.name(),
            dataset.row_count(),
            dataset.column_count(),
            self.provider.name(),
            self.provider.model()
        );
        let started = Instant::now();
        let mut state = PipelineState::new();

        for stage in Stage::ANALYSIS {
            let agent = agent_for(stage);
            let outcome = self.run_stage(agent.as_ref(), Some(dataset), &state).await;
            let appended = outcome.and_then(|result| state.insert(result));
            if let Err(error) = appended {
                error!("Pipeline stopped at {}: {}", stage.display_name(), error);
                return Err(PipelineFailure {
                    partial: state,
                    error,
                });
            }
        }

        info!(
            "Pipeline complete in {:.1}s: {}",
            started.elapsed().as_secs_f64(),
            self.metrics.summary().display()
        );
        Ok(state)
    }

    /// Synthesize the PRD from a complete state.
    pub async fn generate_prd(&self, state: &PipelineState) -> Result<Document> {
        let missing = state.missing_analysis();
        if !missing.is_empty() {
            return Err(PlanError::PipelineIncomplete {
                missing: missing.iter().map(|s| s.key().to_string()).collect(),
            });
        }
        let agent = agent_for(Stage::Prd);
        let prd = self.run_stage(agent.as_ref(), None, state).await?;
        Ok(Document::new(state, prd))
    }

    async fn run_stage(
        &self,
        agent: &dyn Agent,
        dataset: Option<&Dataset>,
        state: &PipelineState,
    ) -> Result<AgentResult> {
        let stage = agent.stage();
        if let Some(observer) = &self.observer {
            observer.stage_started(stage);
        }
        info!("Running {} agent", stage.display_name());

        let ctx = AgentContext::new(
            dataset,
            state.view_for(stage),
            &self.config,
            &self.provider,
            &self.metrics,
        );
        let started = Instant::now();
        let outcome = with_timeout(
            self.stage_timeout(),
            agent.analyze(&ctx),
            &format!("{} agent", stage.display_name()),
        )
        .await
        .map_err(|e| e.in_stage(stage.display_name()));

        if let Some(observer) = &self.observer {
            match &outcome {
                Ok(result) => observer.stage_finished(stage, result, started.elapsed()),
                Err(e) => observer.stage_failed(stage, e),
            }
        }
        outcome
    }
}
