//! Sessions and memoization
//!
//! A session is keyed by dataset name. Completed analysis and the generated
//! document are reused for later requests in the same session instead of
//! calling the model again.
//!
//! ## Storage Levels
//!
//! 1. **SessionStore**: in-process map, lives as long as the process
//! 2. **SessionCache**: JSON files under `<output dir>/sessions/`, so that
//!    `dataplan analyze` and a later `dataplan prd` share one session

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::{PipelineFailure, PipelineState, Stage, Supervisor};
use crate::ai::MetricsSummary;
use crate::constants::session::CACHE_VERSION;
use crate::report::Document;
use crate::types::{PlanError, Result, SessionId};

/// Failure recorded for a run that did not complete
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailureRecord {
    pub stage: Option<String>,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    pub dataset_name: String,
    pub model: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub state: PipelineState,
    #[serde(default)]
    pub document: Option<Document>,
    #[serde(default)]
    pub failure: Option<FailureRecord>,
    #[serde(default)]
    pub metrics: Option<MetricsSummary>,
}

impl Session {
    pub fn new(dataset_name: &str, model: &str) -> Self {
        let now = Utc::now();
        Self {
            id: SessionId::from_dataset_name(dataset_name),
            dataset_name: dataset_name.to_string(),
            model: model.to_string(),
            created_at: now,
            updated_at: now,
            state: PipelineState::new(),
            document: None,
            failure: None,
            metrics: None,
        }
    }

    /// Store a completed run; any earlier document belonged to older results
    pub fn record_success(&mut self, state: PipelineState, metrics: MetricsSummary) {
        self.state = state;
        self.document = None;
        self.failure = None;
        self.metrics = Some(metrics);
        self.updated_at = Utc::now();
    }

    pub fn record_failure(&mut self, failure: &PipelineFailure, metrics: MetricsSummary) {
        self.state = failure.partial.clone();
        self.document = None;
        self.failure = Some(FailureRecord {
            stage: failure.error.stage().map(String::from),
            message: failure.error.to_string(),
        });
        self.metrics = Some(metrics);
        self.updated_at = Utc::now();
    }

    pub fn is_complete(&self) -> bool {
        self.failure.is_none() && self.state.is_complete()
    }

    /// Why this session's results cannot stand in for a run with `model`
    pub fn stale_reason(&self, model: &str) -> Option<String> {
        if !self.is_complete() {
            Some(format!("is incomplete ({})", self.info().status()))
        } else if self.model != model {
            Some(format!("was produced by {}, not {}", self.model, model))
        } else {
            None
        }
    }

    /// The session's PRD, generated once and then reused
    pub async fn prd(&mut self, supervisor: &Supervisor) -> Result<&Document> {
        if self.document.is_none() {
            let document = supervisor.generate_prd(&self.state).await?;
            self.document = Some(document);
            self.updated_at = Utc::now();
        } else {
            debug!("Reusing cached PRD for session '{}'", self.id);
        }
        self.document
            .as_ref()
            .ok_or_else(|| PlanError::Session("document missing after generation".to_string()))
    }

    pub fn info(&self) -> SessionInfo {
        SessionInfo {
            id: self.id.clone(),
            dataset_name: self.dataset_name.clone(),
            model: self.model.clone(),
            updated_at: self.updated_at,
            stages_completed: self.state.len(),
            has_document: self.document.is_some(),
            failed_stage: self.failure.as_ref().and_then(|f| f.stage.clone()),
        }
    }
}

/// Listing entry for `dataplan status`
#[derive(Debug, Clone, Serialize)]
pub struct SessionInfo {
    pub id: SessionId,
    pub dataset_name: String,
    pub model: String,
    pub updated_at: DateTime<Utc>,
    pub stages_completed: usize,
    pub has_document: bool,
    pub failed_stage: Option<String>,
}

impl SessionInfo {
    pub fn status(&self) -> String {
        match &self.failed_stage {
            Some(stage) => format!("failed at {}", stage),
            None if self.stages_completed >= Stage::ANALYSIS.len() => {
                if self.has_document {
                    "complete, PRD generated".to_string()
                } else {
                    "complete".to_string()
                }
            }
            None => format!("{}/{} stages", self.stages_completed, Stage::ANALYSIS.len()),
        }
    }
}

// =============================================================================
// File cache
// =============================================================================

#[derive(Serialize, Deserialize)]
struct CachedSession {
    version: u32,
    session: Session,
}

/// JSON session files, one per session id
#[derive(Debug, Clone)]
pub struct SessionCache {
    dir: PathBuf,
}

impl SessionCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, id: &SessionId) -> PathBuf {
        self.dir.join(format!("{}.json", id))
    }

    /// `None` when absent or written by an incompatible version
    pub async fn load(&self, id: &SessionId) -> Result<Option<Session>> {
        let path = self.path(id);
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let cached: CachedSession = serde_json::from_str(&content).map_err(|e| {
            PlanError::Session(format!("cannot read {}: {}", path.display(), e))
        })?;
        if cached.version != CACHE_VERSION {
            warn!(
                "Ignoring session '{}' written by cache version {}",
                id, cached.version
            );
            return Ok(None);
        }
        debug!(
            "Loaded session '{}' ({} stages)",
            id,
            cached.session.state.len()
        );
        Ok(Some(cached.session))
    }

    pub async fn save(&self, session: &Session) -> Result<PathBuf> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.path(&session.id);
        let content = serde_json::to_string_pretty(&CachedSession {
            version: CACHE_VERSION,
            session: session.clone(),
        })?;
        tokio::fs::write(&path, &content).await?;
        info!(
            "Saved session '{}' ({} stages, {} bytes)",
            session.id,
            session.state.len(),
            content.len()
        );
        Ok(path)
    }

    pub async fn remove(&self, id: &SessionId) -> Result<bool> {
        match tokio::fs::remove_file(self.path(id)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Every readable session, most recently updated first
    pub async fn list(&self) -> Result<Vec<SessionInfo>> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut infos = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let Some(stem) = path
                .extension()
                .filter(|ext| *ext == "json")
                .and(path.file_stem())
                .and_then(|s| s.to_str())
            else {
                continue;
            };
            match self.load(&SessionId::new(stem)).await {
                Ok(Some(session)) => infos.push(session.info()),
                Ok(None) => {}
                Err(e) => warn!("Skipping {}: {}", path.display(), e),
            }
        }
        infos.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(infos)
    }
}

// =============================================================================
// In-process store
// =============================================================================

/// Sessions held for the life of the process, optionally backed by files
#[derive(Default)]
pub struct SessionStore {
    sessions: DashMap<SessionId, Session>,
    cache: Option<SessionCache>,
}

impl SessionStore {
    pub fn in_memory() -> Self {
        Self::default()
    }

    pub fn with_cache(cache: SessionCache) -> Self {
        Self {
            sessions: DashMap::new(),
            cache: Some(cache),
        }
    }

    /// Session from memory, falling back to the file cache
    pub async fn get(&self, id: &SessionId) -> Result<Option<Session>> {
        if let Some(session) = self.sessions.get(id) {
            return Ok(Some(session.clone()));
        }
        let Some(cache) = &self.cache else {
            return Ok(None);
        };
        let loaded = cache.load(id).await?;
        if let Some(session) = &loaded {
            self.sessions.insert(id.clone(), session.clone());
        }
        Ok(loaded)
    }

    /// Store a session in memory and write it through to the file cache
    pub async fn put(&self, session: Session) -> Result<()> {
        if let Some(cache) = &self.cache {
            cache.save(&session).await?;
        }
        self.sessions.insert(session.id.clone(), session);
        Ok(())
    }

    /// Drop a session, e.g. for `--fresh`
    pub async fn forget(&self, id: &SessionId) -> Result<()> {
        self.sessions.remove(id);
        if let Some(cache) = &self.cache {
            cache.remove(id).await?;
        }
        Ok(())
    }

    pub async fn list(&self) -> Result<Vec<SessionInfo>> {
        match &self.cache {
            Some(cache) => cache.list().await,
            None => {
                let mut infos: Vec<SessionInfo> =
                    self.sessions.iter().map(|s| s.value().info()).collect();
                infos.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
                Ok(infos)
            }
        }
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
