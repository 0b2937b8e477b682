//! dataplan - ML Planning From Tabular Data
//!
//! Loads a CSV dataset, runs a fixed sequence of model-backed agents over
//! it and synthesizes a Product Requirements Document from their results.
//!
//! ## Pipeline
//!
//! - **Analysis**: schema, profile, quality, ml_advisor, deployment,
//!   business_communication, each a single structured model call
//! - **PRD**: generated on request from the six completed results
//! - **Sessions**: results cached per dataset name and reused
//!
//! ## Quick Start
//!
//! ```ignore
//! use dataplan::{ConfigLoader, Dataset, Supervisor, create_provider};
//!
//! let config = ConfigLoader::load(|_| {})?;
//! let provider = create_provider(&config.llm.provider_config())?;
//! let dataset = Dataset::from_path("sales.csv".as_ref(), &config.analysis)?;
//! let supervisor = Supervisor::new(provider, config);
//! let state = supervisor.run_pipeline(&dataset).await?;
//! let document = supervisor.generate_prd(&state).await?;
//! ```
//!
//! ## Modules
//!
//! - [`dataset`]: CSV loading, type inference, descriptive evidence
//! - [`signatures`]: model-facing input/output contracts
//! - [`agents`]: one agent per stage
//! - [`pipeline`]: supervisor, state and sessions
//! - [`report`]: report view and PRD document
//! - [`ai`]: LLM providers, prompt building, response repair

pub mod agents;
pub mod ai;
pub mod cli;
pub mod config;
pub mod constants;
pub mod dataset;
pub mod pipeline;
pub mod report;
pub mod signatures;
pub mod types;

#[cfg(test)]
mod testing;

// =============================================================================
// Core Re-exports
// =============================================================================

pub use config::{Config, ConfigLoader};
pub use types::error::{ErrorCategory, LlmError, PlanError, Result};

pub use agents::{Agent, AgentResult};
pub use dataset::Dataset;
pub use pipeline::{
    PipelineFailure, PipelineState, Session, SessionCache, SessionStore, Stage, Supervisor,
};
pub use report::{Document, Report};

// =============================================================================
// AI Re-exports
// =============================================================================

pub use ai::{LlmProvider, LlmResponse, MetricsCollector, SharedProvider, create_provider};
