//! CLI Common Utilities
//!
//! Shared initialization for commands that talk to the model.

use std::path::{Path, PathBuf};
use tracing::info;

use crate::ai::create_provider;
use crate::cli::progress::ConsoleProgress;
use crate::cli::ui::Output;
use crate::config::{Config, ConfigLoader};
use crate::pipeline::{Session, SessionCache, SessionStore, Supervisor};
use crate::types::{Result, SessionId};

/// Flags shared by every command
#[derive(Debug, Clone, Default)]
pub struct GlobalOptions {
    pub verbose: bool,
    pub quiet: bool,
    pub model: Option<String>,
    pub provider: Option<String>,
}

impl GlobalOptions {
    /// CLI flags take priority over every config source
    pub fn apply(&self, config: &mut Config) {
        if let Some(model) = &self.model {
            config.llm.model = model.clone();
        }
        if let Some(provider) = &self.provider {
            config.llm.provider = provider.to_lowercase();
        }
    }
}

/// Resources for commands that run agents
pub struct CommandContext {
    pub config: Config,
    pub store: SessionStore,
    pub output: Output,
    pub quiet: bool,
}

impl CommandContext {
    /// Resolve and validate configuration, including credentials.
    ///
    /// Runs before any dataset is read so a missing key fails fast.
    pub fn load(options: &GlobalOptions) -> Result<Self> {
        let config = ConfigLoader::load(|config| options.apply(config))?;

        let store = SessionStore::with_cache(SessionCache::new(config.output.sessions_dir()));
        Ok(Self {
            config,
            store,
            output: Output::new(options.quiet),
            quiet: options.quiet,
        })
    }

    /// Supervisor with a fresh provider handle and terminal progress
    pub fn supervisor(&self) -> Result<Supervisor> {
        let provider = create_provider(&self.config.llm.provider_config())?;
        Ok(Supervisor::new(provider, self.config.clone())
            .with_observer(Box::new(ConsoleProgress::new(self.quiet))))
    }

    /// Default location of the PRD download
    pub fn default_prd_path(&self) -> PathBuf {
        self.config.output.dir.join(&self.config.output.prd_file_name)
    }

    /// Cached session for `id`, only when complete and produced by the
    /// configured model
    pub async fn reusable_session(&self, id: &SessionId) -> Result<Option<Session>> {
        let Some(session) = self.store.get(id).await? else {
            return Ok(None);
        };
        match session.stale_reason(&self.config.llm.model) {
            None => Ok(Some(session)),
            Some(reason) => {
                info!("Session '{}' {}; not reusing it", id, reason);
                Ok(None)
            }
        }
    }
}

/// Session id for a CSV path or a bare session name
pub fn session_id_for(target: &str) -> SessionId {
    let path = Path::new(target);
    let name = if path.is_file() {
        path.file_stem().and_then(|s| s.to_str()).unwrap_or(target)
    } else {
        target
    };
    SessionId::from_dataset_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_overrides_apply() {
        let mut config = Config::default();
        GlobalOptions {
            model: Some("gpt-4o-mini".into()),
            provider: Some("Ollama".into()),
            ..Default::default()
        }
        .apply(&mut config);
        assert_eq!(config.llm.model, "gpt-4o-mini");
        assert_eq!(config.llm.provider, "ollama");
    }

    #[tokio::test]
    async fn test_reusable_session_checks_model() {
        use crate::pipeline::Stage;
        use crate::testing::fixtures::{self, Fixture};

        let mut config = Config::default();
        config.llm.model = "gpt-4.1".into();
        let ctx = CommandContext {
            config,
            store: SessionStore::in_memory(),
            output: Output::new(true),
            quiet: true,
        };
        let id = SessionId::from_dataset_name("small");
        assert!(ctx.reusable_session(&id).await.unwrap().is_none());

        let dataset = fixtures::small_dataset();
        let fx = Fixture::with_analysis_through(&dataset, Stage::BusinessCommunication);
        let mut session = Session::new("small", "gpt-4o");
        session.record_success(fx.state.clone(), Default::default());
        ctx.store.put(session.clone()).await.unwrap();
        assert!(ctx.reusable_session(&id).await.unwrap().is_none());

        session.model = "gpt-4.1".into();
        ctx.store.put(session).await.unwrap();
        assert!(ctx.reusable_session(&id).await.unwrap().is_some());
    }

    #[test]
    fn test_session_id_for_path_and_name() {
        let dir = TempDir::new().unwrap();
        let csv = dir.path().join("Sales Q1.csv");
        std::fs::write(&csv, "a\n1\n").unwrap();

        assert_eq!(session_id_for(csv.to_str().unwrap()).as_str(), "sales_q1");
        assert_eq!(session_id_for("sales_q1").as_str(), "sales_q1");
    }
}
