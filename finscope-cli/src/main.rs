//! finscope CLI: research finance news and critique it with an LLM.
//!
//! `run` performs the whole pipeline; the other subcommands expose its
//! stages one at a time.

mod commands;

use clap::Parser;
use finscope_core::TimeRange;
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// finscope: finance news research and analysis
#[derive(Parser, Debug)]
#[command(name = "finscope", version, about, long_about = None)]
struct Cli {
    /// LLM model to use (overrides MODEL_NAME and config files)
    #[arg(short, long, global = true)]
    model: Option<String>,

    /// Workspace directory
    #[arg(short, long, default_value = ".", global = true)]
    workspace: PathBuf,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Research a query and analyze the findings
    Run {
        /// The question to research
        query: String,
        /// Search window: day, week, month, year
        #[arg(short, long)]
        time_range: Option<TimeRange>,
        /// Request a schema-checked JSON analysis
        #[arg(long)]
        structured: bool,
    },
    /// Research a query and print the result as JSON
    Research {
        /// The question to research
        query: String,
        /// Search window: day, week, month, year
        #[arg(short, long)]
        time_range: Option<TimeRange>,
    },
    /// Analyze a research result saved as JSON
    Analyze {
        /// Path to a research result JSON file
        file: PathBuf,
        /// Request a schema-checked JSON analysis
        #[arg(long)]
        structured: bool,
    },
    /// Run the validators over a research result saved as JSON
    Validate {
        /// Path to a research result JSON file
        file: PathBuf,
        /// Also run the preprocessing filters
        #[arg(long)]
        preprocess: bool,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(clap::Subcommand, Debug)]
enum ConfigAction {
    /// Create a default workspace configuration file
    Init,
    /// Show the effective configuration
    Show,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Set up tracing: human-readable stderr + JSON file logging
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::new(filter));

    let log_dir = directories::ProjectDirs::from("dev", "finscope", "finscope")
        .map(|d| d.data_dir().join("logs"))
        .unwrap_or_else(|| PathBuf::from("."));
    let _ = std::fs::create_dir_all(&log_dir);
    let file_appender = tracing_appender::rolling::daily(&log_dir, "finscope.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let json_layer = tracing_subscriber::fmt::layer()
        .json()
        .with_writer(non_blocking)
        .with_filter(EnvFilter::new("debug"));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let workspace = cli
        .workspace
        .canonicalize()
        .unwrap_or_else(|_| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));

    let mut config = finscope_core::config::load_config(Some(&workspace), None)
        .map_err(|e| anyhow::anyhow!("Configuration error: {}", e))?;

    // Apply CLI overrides
    if let Some(model) = &cli.model {
        config.llm.model = model.clone();
    }

    commands::handle_command(cli.command, config, &workspace).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_run_with_options() {
        let cli = Cli::parse_from([
            "finscope",
            "-m",
            "llama-3.1-8b-instant",
            "run",
            "Giá vàng hôm nay",
            "-t",
            "day",
            "--structured",
        ]);
        assert_eq!(cli.model.as_deref(), Some("llama-3.1-8b-instant"));
        match cli.command {
            Commands::Run {
                query,
                time_range,
                structured,
            } => {
                assert_eq!(query, "Giá vàng hôm nay");
                assert_eq!(time_range, Some(TimeRange::Day));
                assert!(structured);
            }
            other => panic!("Expected Run, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_rejects_unknown_time_range() {
        let result = Cli::try_parse_from(["finscope", "research", "x", "-t", "decade"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["finscope", "validate", "r.json", "--preprocess", "-vv"]);
        assert_eq!(cli.verbose, 2);
        assert!(matches!(
            cli.command,
            Commands::Validate {
                preprocess: true,
                ..
            }
        ));
    }
}
