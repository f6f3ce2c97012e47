//! Tool registry: the search tools offered to the research model.
//!
//! Tools are keyed by name in a `BTreeMap`, so definitions come out sorted
//! and the request sent to the model is stable between runs. Every call
//! goes through [`ToolRegistry::execute`], which enforces the tool's timeout.

use async_trait::async_trait;
use finscope_core::error::ToolError;
use finscope_core::types::{ToolDefinition, ToolOutput};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// A function the research model can call.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Name the model uses to call the tool.
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// JSON Schema of the arguments object.
    fn parameters_schema(&self) -> serde_json::Value;

    async fn execute(&self, args: serde_json::Value) -> Result<ToolOutput, ToolError>;

    /// Upper bound on one call.
    fn timeout(&self) -> Duration {
        Duration::from_secs(30)
    }

    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters_schema(),
        }
    }
}

/// Named tools plus timed execution.
#[derive(Default)]
pub struct ToolRegistry {
    tools: BTreeMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tool; a second tool with the same name is rejected.
    pub fn register(&mut self, tool: Arc<dyn Tool>) -> Result<(), ToolError> {
        let name = tool.name().to_string();
        if self.tools.contains_key(&name) {
            return Err(ToolError::AlreadyRegistered { name });
        }
        debug!(tool = %name, "Registered tool");
        self.tools.insert(name, tool);
        Ok(())
    }

    /// Definitions for the model, ordered by tool name.
    pub fn list_definitions(&self) -> Vec<ToolDefinition> {
        self.tools.values().map(|tool| tool.definition()).collect()
    }

    /// Run `name` with `args`, failing with `ToolError::Timeout` when the
    /// tool overruns its own timeout.
    pub async fn execute(
        &self,
        name: &str,
        args: serde_json::Value,
    ) -> Result<ToolOutput, ToolError> {
        let tool = self.tools.get(name).ok_or_else(|| ToolError::NotFound {
            name: name.to_string(),
        })?;

        let limit = tool.timeout();
        info!(tool = %name, timeout_ms = limit.as_millis() as u64, "Calling tool");
        tokio::time::timeout(limit, tool.execute(args))
            .await
            .unwrap_or_else(|_| {
                Err(ToolError::Timeout {
                    name: name.to_string(),
                    timeout_secs: limit.as_secs(),
                })
            })
    }
}
