//! Configuration system for finscope.
//!
//! Uses `figment` for layered configuration: defaults -> config file -> environment -> overrides.
//! Configuration is loaded from `~/.config/finscope/config.toml` and/or `.finscope/config.toml`
//! in the workspace directory. Credentials are never stored here; only the names of the
//! environment variables that hold them.

use chrono::NaiveDate;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::types::TimeRange;

/// Top-level configuration for the pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FinscopeConfig {
    pub llm: LlmConfig,
    pub search: SearchConfig,
    pub research: ResearchConfig,
    pub analysis: AnalysisConfig,
    pub preprocess: PreprocessConfig,
}

/// LLM provider configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Provider name: "groq", "openai", or any OpenAI-compatible endpoint.
    pub provider: String,
    /// Model identifier (e.g., "llama-3.3-70b-versatile").
    pub model: String,
    /// Environment variable name containing the API key.
    pub api_key_env: String,
    /// Optional base URL override for the API endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Maximum tokens to generate in a response.
    pub max_tokens: usize,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "groq".to_string(),
            model: "llama-3.3-70b-versatile".to_string(),
            api_key_env: "GROQ_API_KEY".to_string(),
            base_url: None,
            max_tokens: 2048,
            timeout_secs: 120,
        }
    }
}

impl LlmConfig {
    /// Validate this LLM config and return any warnings.
    ///
    /// Returns an empty Vec if the config is valid.
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if self.model.trim().is_empty() {
            warnings.push("llm.model is empty; set MODEL_NAME or llm.model".to_string());
        }
        if self.max_tokens == 0 {
            warnings.push("llm.max_tokens is 0; the model cannot produce a reply".to_string());
        }
        if let Some(url) = &self.base_url
            && !url.starts_with("http://")
            && !url.starts_with("https://")
        {
            warnings.push(format!("llm.base_url '{url}' is not an http(s) URL"));
        }
        warnings
    }
}

/// News search (Tavily) configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Environment variable name containing the search API key.
    pub api_key_env: String,
    /// Search API base URL.
    pub base_url: String,
    /// Results requested per search call.
    pub max_results: usize,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Window used when the model omits `time_range`.
    #[serde(default)]
    pub default_time_range: TimeRange,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            api_key_env: "TAVILY_API_KEY".to_string(),
            base_url: "https://api.tavily.com".to_string(),
            max_results: 3,
            timeout_secs: 30,
            default_time_range: TimeRange::Month,
        }
    }
}

/// Research loop configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResearchConfig {
    /// Maximum model calls before the loop gives up.
    pub max_iterations: usize,
    /// Sampling temperature for the research model.
    pub temperature: f32,
}

impl Default for ResearchConfig {
    fn default() -> Self {
        Self {
            max_iterations: 6,
            temperature: 0.7,
        }
    }
}

/// Analysis stage configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Sampling temperature for the analysis model.
    pub temperature: f32,
    /// How many source URLs are listed in the analysis prompt.
    pub max_sources_in_prompt: usize,
    /// Request and enforce the structured JSON schema instead of free text.
    pub structured_output: bool,
    /// Fixed "today" for prompts and date checks; the local date when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_date: Option<NaiveDate>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            temperature: 0.3,
            max_sources_in_prompt: 5,
            structured_output: false,
            reference_date: None,
        }
    }
}

impl AnalysisConfig {
    /// The date the analysis treats as today.
    pub fn today(&self) -> NaiveDate {
        self.reference_date
            .unwrap_or_else(|| chrono::Local::now().date_naive())
    }
}

/// Source preprocessing thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreprocessConfig {
    /// Records with fewer content characters are dropped.
    pub min_content_length: usize,
    /// Length ratio at which a contained record counts as a duplicate.
    pub similarity_threshold: f64,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            min_content_length: 50,
            similarity_threshold: 0.95,
        }
    }
}

/// Load configuration from layered sources.
///
/// Priority (highest to lowest):
/// 1. Explicit overrides (passed as argument)
/// 2. `MODEL_NAME` (mapped onto `llm.model`)
/// 3. Environment variables (prefixed with `FINSCOPE_`)
/// 4. Workspace-local config (`.finscope/config.toml`)
/// 5. User config (`~/.config/finscope/config.toml`)
/// 6. Built-in defaults
pub fn load_config(
    workspace: Option<&Path>,
    overrides: Option<&FinscopeConfig>,
) -> Result<FinscopeConfig, Box<figment::Error>> {
    let mut figment = Figment::from(Serialized::defaults(FinscopeConfig::default()));

    // User-level config
    if let Some(config_dir) = directories::ProjectDirs::from("dev", "finscope", "finscope") {
        let user_config = config_dir.config_dir().join("config.toml");
        if user_config.exists() {
            figment = figment.merge(Toml::file(&user_config));
        }
    }

    // Workspace-level config
    if let Some(ws) = workspace {
        let ws_config = ws.join(".finscope").join("config.toml");
        if ws_config.exists() {
            figment = figment.merge(Toml::file(&ws_config));
        }
    }

    // Environment variables (FINSCOPE_LLM__MODEL, FINSCOPE_SEARCH__MAX_RESULTS, etc.)
    figment = figment.merge(Env::prefixed("FINSCOPE_").split("__"));

    // The conventional model variable shared with the search/LLM credentials in `.env`
    figment = figment.merge(
        Env::raw()
            .only(&["MODEL_NAME"])
            .map(|_| "llm.model".into()),
    );

    // Explicit overrides
    if let Some(overrides) = overrides {
        figment = figment.merge(Serialized::defaults(overrides));
    }

    figment.extract().map_err(Box::new)
}
