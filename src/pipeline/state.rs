//! Pipeline stages and the accumulated results of one run.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::agents::AgentResult;
use crate::types::{PlanError, Result};

/// Pipeline stage, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Schema,
    Profile,
    Quality,
    MlAdvisor,
    Deployment,
    BusinessCommunication,
    Prd,
}

impl Stage {
    pub const ALL: [Stage; 7] = [
        Stage::Schema,
        Stage::Profile,
        Stage::Quality,
        Stage::MlAdvisor,
        Stage::Deployment,
        Stage::BusinessCommunication,
        Stage::Prd,
    ];

    /// Stages `run_pipeline` executes; the PRD is synthesized on request
    pub const ANALYSIS: [Stage; 6] = [
        Stage::Schema,
        Stage::Profile,
        Stage::Quality,
        Stage::MlAdvisor,
        Stage::Deployment,
        Stage::BusinessCommunication,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Self::Schema => "schema",
            Self::Profile => "profile",
            Self::Quality => "quality",
            Self::MlAdvisor => "ml_advisor",
            Self::Deployment => "deployment",
            Self::BusinessCommunication => "business_communication",
            Self::Prd => "prd",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Schema => "Schema",
            Self::Profile => "Profile",
            Self::Quality => "Quality",
            Self::MlAdvisor => "ML Advisor",
            Self::Deployment => "Deployment",
            Self::BusinessCommunication => "Business Communication",
            Self::Prd => "PRD",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.key() == key)
    }

    pub fn position(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// Results accumulated over one run.
///
/// Append-only: results must arrive in stage order, and nothing is removed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<AgentResult>", into = "Vec<AgentResult>")]
pub struct PipelineState {
    results: Vec<AgentResult>,
}

impl PipelineState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage whose result is accepted next, `None` once all stages are in
    pub fn next_stage(&self) -> Option<Stage> {
        Stage::ALL.get(self.results.len()).copied()
    }

    pub fn insert(&mut self, result: AgentResult) -> Result<()> {
        match self.next_stage() {
            Some(expected) if expected == result.stage => {
                self.results.push(result);
                Ok(())
            }
            Some(expected) => Err(PlanError::OutOfOrder {
                stage: result.stage.key().to_string(),
                expected: expected.key().to_string(),
            }),
            None => Err(PlanError::OutOfOrder {
                stage: result.stage.key().to_string(),
                expected: "nothing".to_string(),
            }),
        }
    }

    pub fn get(&self, stage: Stage) -> Option<&AgentResult> {
        self.results.get(stage.position())
    }

    pub fn contains(&self, stage: Stage) -> bool {
        self.get(stage).is_some()
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &AgentResult> {
        self.results.iter()
    }

    pub fn stages(&self) -> Vec<Stage> {
        self.results.iter().map(|r| r.stage).collect()
    }

    /// Analysis stages without a result yet
    pub fn missing_analysis(&self) -> Vec<Stage> {
        Stage::ANALYSIS
            .into_iter()
            .filter(|s| !self.contains(*s))
            .collect()
    }

    /// All six analysis stages are present
    pub fn is_complete(&self) -> bool {
        self.missing_analysis().is_empty()
    }

    /// Read-only view for the agent running `consumer`
    pub fn view_for(&self, consumer: Stage) -> PriorResults<'_> {
        PriorResults {
            state: self,
            consumer,
        }
    }
}

impl TryFrom<Vec<AgentResult>> for PipelineState {
    type Error = PlanError;

    fn try_from(results: Vec<AgentResult>) -> Result<Self> {
        let mut state = Self::new();
        for result in results {
            state.insert(result)?;
        }
        Ok(state)
    }
}

impl From<PipelineState> for Vec<AgentResult> {
    fn from(state: PipelineState) -> Self {
        state.results
    }
}

/// Results visible to one stage: only those of earlier stages
#[derive(Debug, Clone, Copy)]
pub struct PriorResults<'a> {
    state: &'a PipelineState,
    consumer: Stage,
}

impl<'a> PriorResults<'a> {
    pub fn consumer(&self) -> Stage {
        self.consumer
    }

    pub fn get(&self, producer: Stage) -> Result<&'a AgentResult> {
        if producer >= self.consumer {
            return Err(PlanError::StageOrder {
                consumer: self.consumer.key().to_string(),
                producer: producer.key().to_string(),
            });
        }
        self.state
            .get(producer)
            .ok_or_else(|| PlanError::PipelineIncomplete {
                missing: vec![producer.key().to_string()],
            })
    }
}
