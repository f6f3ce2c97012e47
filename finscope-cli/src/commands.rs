//! CLI subcommand handlers.

use crate::Commands;
use crate::ConfigAction;
use anyhow::Context;
use chrono::Datelike;
use finscope_core::config::FinscopeConfig;
use finscope_core::{
    AnalysisAgent, RegisteredTool, ResearchAgent, ResearchResult, TimeRange,
    preprocess_research_results, run_all_validations,
};
use finscope_tools::registry::ToolRegistry;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Handle a CLI subcommand.
pub async fn handle_command(
    command: Commands,
    config: FinscopeConfig,
    workspace: &Path,
) -> anyhow::Result<()> {
    match command {
        Commands::Run {
            query,
            time_range,
            structured,
        } => handle_run(&config, &query, time_range, structured).await,
        Commands::Research { query, time_range } => {
            let research = research(&config, &query, time_range).await?;
            println!("{}", serde_json::to_string_pretty(&research)?);
            Ok(())
        }
        Commands::Analyze { file, structured } => {
            let research = read_research(&file)?;
            println!("{}", analyze(&config, &research, structured).await?);
            Ok(())
        }
        Commands::Validate { file, preprocess } => {
            let research = read_research(&file)?;
            println!("{}", validate(&config, &research, preprocess)?);
            Ok(())
        }
        Commands::Config { action } => handle_config(action, &config, workspace),
    }
}

async fn handle_run(
    config: &FinscopeConfig,
    query: &str,
    time_range: Option<TimeRange>,
    structured: bool,
) -> anyhow::Result<()> {
    let research = research(config, query, time_range).await?;
    info!(
        sources = research.sources.len(),
        "Research finished, starting analysis"
    );
    println!("{}", analyze(config, &research, structured).await?);
    Ok(())
}

/// Expose every registry tool to the research agent.
///
/// Each executor goes through `ToolRegistry::execute` so tool timeouts apply.
pub fn bridge_registry(registry: Arc<ToolRegistry>) -> Vec<RegisteredTool> {
    registry
        .list_definitions()
        .into_iter()
        .map(|definition| {
            let registry = registry.clone();
            let name = definition.name.clone();
            RegisteredTool {
                definition,
                executor: Box::new(move |args| {
                    let registry = registry.clone();
                    let name = name.clone();
                    Box::pin(async move { registry.execute(&name, args).await })
                }),
            }
        })
        .collect()
}

async fn research(
    config: &FinscopeConfig,
    query: &str,
    time_range: Option<TimeRange>,
) -> anyhow::Result<ResearchResult> {
    let provider = finscope_core::create_provider(&config.llm)?;

    let mut registry = ToolRegistry::new();
    finscope_tools::register_builtin_tools(&mut registry, &config.search);

    let mut agent = ResearchAgent::new(provider, config.research.clone());
    for tool in bridge_registry(Arc::new(registry)) {
        agent.register_tool(tool);
    }

    Ok(agent.research(query, time_range).await?)
}

async fn analyze(
    config: &FinscopeConfig,
    research: &ResearchResult,
    structured: bool,
) -> anyhow::Result<String> {
    let provider = finscope_core::create_provider(&config.llm)?;
    let agent = AnalysisAgent::new(provider, config.analysis.clone());

    if structured || config.analysis.structured_output {
        Ok(agent.analyze_structured(research).await?.to_markdown())
    } else {
        Ok(agent.analyze(research).await?)
    }
}

/// Validation report (and optionally the preprocessed result) as pretty JSON.
fn validate(
    config: &FinscopeConfig,
    research: &ResearchResult,
    preprocess: bool,
) -> anyhow::Result<String> {
    let year = config.analysis.today().year();
    let report = run_all_validations(research, year);

    let output = if preprocess {
        let processed = preprocess_research_results(research, &config.preprocess, year);
        serde_json::json!({ "validation": report, "preprocessed": processed })
    } else {
        serde_json::to_value(&report)?
    };
    Ok(serde_json::to_string_pretty(&output)?)
}

fn read_research(path: &Path) -> anyhow::Result<ResearchResult> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("{} is not a research result", path.display()))
}

fn handle_config(
    action: ConfigAction,
    config: &FinscopeConfig,
    workspace: &Path,
) -> anyhow::Result<()> {
    match action {
        ConfigAction::Init => {
            let config_dir = workspace.join(".finscope");
            std::fs::create_dir_all(&config_dir)?;

            let config_path = config_dir.join("config.toml");
            if config_path.exists() {
                println!(
                    "Configuration file already exists at: {}",
                    config_path.display()
                );
                return Ok(());
            }

            let toml_str = toml::to_string_pretty(&FinscopeConfig::default())?;
            std::fs::write(&config_path, &toml_str)?;
            println!(
                "Created default configuration at: {}",
                config_path.display()
            );
            Ok(())
        }
        ConfigAction::Show => {
            println!("{}", toml::to_string_pretty(config)?);
            Ok(())
        }
    }
}
