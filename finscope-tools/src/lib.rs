//! # Finscope Tools
//!
//! Tool implementations the research model can call.
//! Provides the `Tool` trait, the tool registry, and Tavily news search.

pub mod registry;
pub mod tavily;

use finscope_core::config::SearchConfig;
use registry::{Tool, ToolRegistry};
use std::sync::Arc;

/// Register all built-in tools.
pub fn register_builtin_tools(registry: &mut ToolRegistry, search: &SearchConfig) {
    let tools: Vec<Arc<dyn Tool>> = vec![Arc::new(tavily::TavilySearchTool::new(search.clone()))];

    for tool in tools {
        if let Err(e) = registry.register(tool) {
            tracing::warn!("Failed to register tool: {}", e);
        }
    }
}
