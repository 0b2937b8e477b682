//! Configuration Loader (Figment-based)
//!
//! Loads and merges configuration from multiple sources using Figment:
//! 1. Built-in defaults (Serialized)
//! 2. Global config (~/.config/dataplan/config.toml)
//! 3. Project config (.dataplan/config.toml)
//! 4. Well-known provider variables (OPENAI_API_KEY, OPENAI_MODEL, OPENAI_BASE_URL)
//! 5. Environment variables (DATAPLAN_* prefix, `__` separates sections)

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::types::Config;
use crate::types::{PlanError, Result};

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load, apply command-line overrides, and validate configuration,
    /// including provider credentials.
    pub fn load(overrides: impl FnOnce(&mut Config)) -> Result<Config> {
        let mut config = Self::resolve()?;
        overrides(&mut config);
        config.validate()?;
        config.validate_credentials()?;
        Ok(config)
    }

    /// Merge all sources without checking credentials (for `config show`).
    pub fn resolve() -> Result<Config> {
        let global = Self::global_config_path();
        let figment = Self::file_sources(global.as_deref(), &Self::project_config_path());
        let config: Config = Self::with_env(figment).extract()?;
        Ok(config)
    }

    /// Defaults plus whichever config files exist
    fn file_sources(global: Option<&Path>, project: &Path) -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        if let Some(global_path) = global
            && global_path.exists()
        {
            debug!("Loading global config from: {}", global_path.display());
            figment = figment.merge(Toml::file(global_path));
        }

        if project.exists() {
            debug!("Loading project config from: {}", project.display());
            figment = figment.merge(Toml::file(project));
        }
        figment
    }

    fn with_env(figment: Figment) -> Figment {
        figment
            .merge(
                Env::raw()
                    .only(&["OPENAI_API_KEY", "OPENAI_MODEL", "OPENAI_BASE_URL"])
                    .map(|key| match key.as_str() {
                        "OPENAI_API_KEY" => "llm.api_key".into(),
                        "OPENAI_MODEL" => "llm.model".into(),
                        _ => "llm.base_url".into(),
                    }),
            )
            // e.g. DATAPLAN_LLM__MODEL -> llm.model
            .merge(Env::prefixed("DATAPLAN_").split("__").lowercase(true))
    }

    // =========================================================================
    // Path Management
    // =========================================================================

    /// Global config directory (~/.config/dataplan/ on Linux)
    pub fn global_dir() -> Option<PathBuf> {
        ProjectDirs::from("", "", "dataplan").map(|dirs| dirs.config_dir().to_path_buf())
    }

    pub fn global_config_path() -> Option<PathBuf> {
        Self::global_dir().map(|dir| dir.join("config.toml"))
    }

    pub fn project_dir() -> PathBuf {
        PathBuf::from(".dataplan")
    }

    pub fn project_config_path() -> PathBuf {
        Self::project_dir().join("config.toml")
    }

    // =========================================================================
    // Config Commands
    // =========================================================================

    /// Create a commented config file; existing files are kept unless `force`.
    pub fn init(global: bool, force: bool) -> Result<PathBuf> {
        let path = if global {
            Self::global_config_path().ok_or_else(|| {
                PlanError::Configuration("Cannot determine global config directory".to_string())
            })?
        } else {
            Self::project_config_path()
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        if path.exists() && !force {
            info!("Config exists: {}", path.display());
        } else {
            fs::write(&path, Self::default_config_file())?;
            info!("Created config: {}", path.display());
        }
        Ok(path)
    }

    fn default_config_file() -> String {
        r#"# dataplan configuration
# The API key is read from OPENAI_API_KEY (or a .env file) and never stored here.

version = "1.0"

[llm]
provider = "openai"
model = "gpt-4.1"
timeout_secs = 120
temperature = 0.0
max_tokens = 4096

[analysis]
max_rows = 10000
max_sample_values = 5
max_prompt_columns = 20

[output]
dir = ".dataplan"
prd_file_name = "ML_Product_Requirements_Document.md"
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn from_file(path: &Path) -> Result<Config> {
        let config: Config = ConfigLoader::file_sources(None, path).extract()?;
        config.validate()?;
        Ok(config)
    }

    #[test]
    fn test_default_file_parses() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, ConfigLoader::default_config_file()).unwrap();

        let config = from_file(&path).unwrap();
        assert_eq!(config.llm.model, "gpt-4.1");
        assert_eq!(config.output.prd_file_name, "ML_Product_Requirements_Document.md");
        assert!(config.llm.api_key.is_none());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "[analysis]\nmax_rows = 250\n").unwrap();

        let config = from_file(&path).unwrap();
        assert_eq!(config.analysis.max_rows, 250);
        assert_eq!(config.analysis.max_sample_values, 5);
        assert_eq!(config.llm.provider, "openai");
    }

    #[test]
    fn test_invalid_file_is_configuration_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "[llm]\ntemperature = \"hot\"\n").unwrap();

        let err = from_file(&path).unwrap_err();
        assert!(matches!(err, PlanError::Configuration(_)));
    }

    #[test]
    fn test_load_applies_overrides_before_validation() {
        let config = ConfigLoader::load(|c| {
            c.llm.provider = "ollama".to_string();
            c.llm.model = "mistral:7b".to_string();
        })
        .unwrap();
        assert_eq!(config.llm.model, "mistral:7b");

        let err = ConfigLoader::load(|c| {
            c.llm.provider = "ollama".to_string();
            c.llm.temperature = 5.0;
        })
        .unwrap_err();
        assert!(matches!(err, PlanError::Configuration(_)));
    }

    #[test]
    fn test_env_override() {
        // SAFETY: variable is unique to this test
        unsafe {
            std::env::set_var("DATAPLAN_ANALYSIS__MAX_PROMPT_COLUMNS", "7");
        }
        let config = ConfigLoader::resolve().unwrap();
        assert_eq!(config.analysis.max_prompt_columns, 7);
        unsafe {
            std::env::remove_var("DATAPLAN_ANALYSIS__MAX_PROMPT_COLUMNS");
        }
    }
}
