//! Command-line interface

pub mod commands;
pub mod progress;
pub mod ui;
pub mod util;

pub use progress::ConsoleProgress;
pub use util::{CommandContext, GlobalOptions};

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use commands::analyze::{AnalyzeOptions, ReportFormat};
use commands::config::ConfigFormat;

#[derive(Parser)]
#[command(name = "dataplan")]
#[command(
    version,
    about = "Turn a CSV dataset into an ML plan and product requirements document"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, help = "Debug logging")]
    pub verbose: bool,

    #[arg(long, short, global = true, help = "Only print errors and results")]
    pub quiet: bool,

    #[arg(long, global = true, help = "Model to use (overrides OPENAI_MODEL)")]
    pub model: Option<String>,

    #[arg(long, global = true, help = "LLM provider (openai, ollama)")]
    pub provider: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze a CSV file with the six analysis agents
    Analyze {
        #[arg(help = "CSV file to analyze")]
        file: PathBuf,
        #[arg(long, help = "Ignore any cached session and rerun every stage")]
        fresh: bool,
        #[arg(short = 'f', long, value_enum, default_value_t = ReportFormat::Text)]
        format: ReportFormat,
        #[arg(short = 'o', long, help = "Write the report to a file")]
        output: Option<PathBuf>,
        #[arg(
            long,
            num_args = 0..=1,
            value_name = "PATH",
            help = "Also generate the PRD (optionally to PATH)"
        )]
        prd: Option<Option<PathBuf>>,
    },

    /// Generate the Product Requirements Document for a session
    Prd {
        #[arg(help = "CSV file or session name")]
        target: String,
        #[arg(short = 'o', long, help = "Output file or directory")]
        output: Option<PathBuf>,
        #[arg(long, help = "Generate again even if a PRD is cached")]
        regenerate: bool,
    },

    /// List sessions or show one
    Status {
        #[arg(help = "Session name or CSV file")]
        session: Option<String>,
        #[arg(long, help = "JSON output")]
        json: bool,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show the merged configuration (API key redacted)
    Show {
        #[arg(short = 'f', long, value_enum, default_value_t = ConfigFormat::Toml)]
        format: ConfigFormat,
    },
    /// Show configuration file paths
    Path,
    /// Create a configuration file
    Init {
        #[arg(long, short, help = "Initialize global config")]
        global: bool,
        #[arg(long, help = "Overwrite existing config")]
        force: bool,
    },
}

impl Cli {
    pub fn global_options(&self) -> GlobalOptions {
        GlobalOptions {
            verbose: self.verbose,
            quiet: self.quiet,
            model: self.model.clone(),
            provider: self.provider.clone(),
        }
    }

    /// Default log level from the verbosity flags
    pub fn log_level(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else if self.quiet {
            "error"
        } else {
            "info"
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let global = cli.global_options();
    match cli.command {
        Commands::Analyze {
            file,
            fresh,
            format,
            output,
            prd,
        } => {
            let options = AnalyzeOptions {
                file,
                fresh,
                format,
                output,
                prd,
            };
            commands::analyze::run(options, &global).await?;
        }
        Commands::Prd {
            target,
            output,
            regenerate,
        } => {
            commands::prd::run(&target, output, regenerate, &global).await?;
        }
        Commands::Status { session, json } => {
            commands::status::run(session.as_deref(), json, &global).await?;
        }
        Commands::Config { action } => match action {
            ConfigAction::Show { format } => commands::config::show(format, &global)?,
            ConfigAction::Path => commands::config::path()?,
            ConfigAction::Init { global, force } => commands::config::init(global, force)?,
        },
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_analyze() {
        let cli = Cli::parse_from([
            "dataplan", "analyze", "sales.csv", "--format", "json", "--prd", "--model", "gpt-4o",
        ]);
        assert_eq!(cli.model.as_deref(), Some("gpt-4o"));
        match cli.command {
            Commands::Analyze {
                file, format, prd, ..
            } => {
                assert_eq!(file, PathBuf::from("sales.csv"));
                assert_eq!(format, ReportFormat::Json);
                assert_eq!(prd, Some(None));
            }
            _ => panic!("expected analyze"),
        }
    }

    #[test]
    fn test_parse_prd_path_and_levels() {
        let cli = Cli::parse_from(["dataplan", "--quiet", "analyze", "a.csv", "--prd", "out.md"]);
        assert_eq!(cli.log_level(), "error");
        match cli.command {
            Commands::Analyze { prd, .. } => assert_eq!(prd, Some(Some(PathBuf::from("out.md")))),
            _ => panic!("expected analyze"),
        }
    }

    #[test]
    fn test_clap_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
