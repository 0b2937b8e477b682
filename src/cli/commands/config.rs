//! Config Command
//!
//! Manage dataplan configuration.
//!
//! Usage:
//!   dataplan config show [-f toml|yaml|json]
//!   dataplan config path
//!   dataplan config init [-g] [--force]

use clap::ValueEnum;

use crate::cli::util::GlobalOptions;
use crate::config::{Config, ConfigLoader};
use crate::types::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ConfigFormat {
    #[default]
    Toml,
    Yaml,
    Json,
}

/// Show the merged effective configuration; the API key is never printed
pub fn show(format: ConfigFormat, global: &GlobalOptions) -> Result<()> {
    let mut config = ConfigLoader::resolve()?;
    global.apply(&mut config);
    let key_state = if config.llm.has_api_key() { "set" } else { "not set" };

    println!("{}", render(&config, format)?);
    if format == ConfigFormat::Toml {
        println!("# api key: {}", key_state);
    }
    Ok(())
}

fn render(config: &Config, format: ConfigFormat) -> Result<String> {
    Ok(match format {
        ConfigFormat::Toml => toml::to_string_pretty(config)?,
        ConfigFormat::Yaml => serde_yaml::to_string(config)?,
        ConfigFormat::Json => serde_json::to_string_pretty(config)?,
    })
}

/// Show configuration paths
pub fn path() -> Result<()> {
    match ConfigLoader::global_config_path() {
        Some(global) => println!(
            "Global:  {} {}",
            global.display(),
            if global.exists() { "" } else { "(not found)" }
        ),
        None => println!("Global:  (cannot determine config directory)"),
    }
    let project = ConfigLoader::project_config_path();
    println!(
        "Project: {} {}",
        project.display(),
        if project.exists() { "" } else { "(not found)" }
    );
    Ok(())
}

pub fn init(global: bool, force: bool) -> Result<()> {
    let path = ConfigLoader::init(global, force)?;
    println!(
        "✓ {} configuration at {}",
        if global { "Global" } else { "Project" },
        path.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_never_includes_key() {
        let mut config = Config::default();
        config.llm.api_key = Some("sk-secret".to_string());

        for format in [ConfigFormat::Toml, ConfigFormat::Yaml, ConfigFormat::Json] {
            let rendered = render(&config, format).unwrap();
            assert!(!rendered.contains("sk-secret"), "{:?} leaked the key", format);
            assert!(rendered.contains("gpt-4.1"));
        }
    }
}
