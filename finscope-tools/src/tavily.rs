//! Tavily news search tool.
//!
//! Exposed to the research model as `research`. Returns a pretty-printed
//! JSON list of `{url, content}` records with non-ASCII text kept as-is.

use crate::registry::Tool;
use async_trait::async_trait;
use finscope_core::config::SearchConfig;
use finscope_core::error::ToolError;
use finscope_core::types::{SourceRecord, TimeRange, ToolOutput};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

const TOOL_NAME: &str = "research";

/// Body of a Tavily `/search` request.
#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    query: &'a str,
    time_range: TimeRange,
    max_results: usize,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    content: Option<String>,
}

/// Map a Tavily response body to source records, skipping hits without a URL.
pub fn parse_tavily_response(body: &str) -> Result<Vec<SourceRecord>, serde_json::Error> {
    let response: SearchResponse = serde_json::from_str(body)?;
    Ok(response
        .results
        .into_iter()
        .filter_map(|hit| {
            let url = hit.url.filter(|u| !u.is_empty())?;
            Some(SourceRecord::new(url, hit.content.unwrap_or_default()))
        })
        .collect())
}

/// Search recent finance news through the Tavily API.
pub struct TavilySearchTool {
    config: SearchConfig,
}

impl TavilySearchTool {
    pub fn new(config: SearchConfig) -> Self {
        Self { config }
    }

    fn api_key(&self) -> Result<String, ToolError> {
        std::env::var(&self.config.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| ToolError::MissingCredential {
                name: TOOL_NAME.to_string(),
                var: self.config.api_key_env.clone(),
            })
    }

    fn parse_args(&self, args: &serde_json::Value) -> Result<(String, TimeRange), ToolError> {
        let query = args
            .get("query")
            .and_then(|v| v.as_str())
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .ok_or_else(|| ToolError::InvalidArguments {
                name: TOOL_NAME.into(),
                reason: "Missing required parameter: query".into(),
            })?;

        let time_range = match args.get("time_range").and_then(|v| v.as_str()) {
            Some(raw) => raw
                .parse::<TimeRange>()
                .map_err(|reason| ToolError::InvalidArguments {
                    name: TOOL_NAME.into(),
                    reason,
                })?,
            None => self.config.default_time_range,
        };

        Ok((query.to_string(), time_range))
    }
}

#[async_trait]
impl Tool for TavilySearchTool {
    fn name(&self) -> &str {
        TOOL_NAME
    }

    fn description(&self) -> &str {
        "Get a query and search for relevant financial information. \
         Returns recent news articles as a JSON list of {url, content} records."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The search query, in the user's language"
                },
                "time_range": {
                    "type": "string",
                    "enum": ["day", "week", "month", "year"],
                    "description": "Time range of the research (e.g., day, week, month, year)"
                }
            },
            "required": ["query", "time_range"]
        })
    }

    fn timeout(&self) -> Duration {
        // One extra second so the HTTP client reports its own timeout first
        Duration::from_secs(self.config.timeout_secs + 1)
    }

    async fn execute(&self, args: serde_json::Value) -> Result<ToolOutput, ToolError> {
        let (query, time_range) = self.parse_args(&args)?;
        let api_key = self.api_key()?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(self.config.timeout_secs))
            .user_agent(concat!("finscope/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ToolError::ExecutionFailed {
                name: TOOL_NAME.into(),
                message: format!("Failed to create HTTP client: {}", e),
            })?;

        let url = format!("{}/search", self.config.base_url.trim_end_matches('/'));
        debug!(url = %url, query = %query, time_range = %time_range, "Searching news");

        let response = client
            .post(&url)
            .bearer_auth(api_key)
            .json(&SearchRequest {
                query: &query,
                time_range,
                max_results: self.config.max_results,
            })
            .send()
            .await
            .map_err(|e| ToolError::ExecutionFailed {
                name: TOOL_NAME.into(),
                message: format!("Search request failed: {}", e),
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| ToolError::ExecutionFailed {
            name: TOOL_NAME.into(),
            message: format!("Failed to read search response: {}", e),
        })?;

        if !status.is_success() {
            warn!(status = status.as_u16(), "Search API returned an error");
            return Err(ToolError::ExecutionFailed {
                name: TOOL_NAME.into(),
                message: format!("HTTP {}: {}", status, body),
            });
        }

        let records = parse_tavily_response(&body).map_err(|e| ToolError::ExecutionFailed {
            name: TOOL_NAME.into(),
            message: format!("Failed to parse search response: {}", e),
        })?;
        debug!(results = records.len(), "Search complete");

        let output =
            serde_json::to_string_pretty(&records).map_err(|e| ToolError::ExecutionFailed {
                name: TOOL_NAME.into(),
                message: format!("Failed to encode search results: {}", e),
            })?;
        Ok(ToolOutput::text(output))
    }
}
