//! # Finscope Core
//!
//! Core library for the finscope finance-news pipeline.
//! Provides the research and analysis orchestrators, the LLM interface,
//! heuristic validators, source preprocessing, configuration, and
//! fundamental types.

pub mod analysis;
pub mod brain;
pub mod config;
pub mod error;
pub mod preprocess;
pub mod prompts;
pub mod providers;
pub mod research;
pub mod types;
pub mod validation;

// Re-export commonly used types at the crate root.
pub use analysis::{AnalysisAgent, AnalysisResult, KeyFact};
pub use brain::{LlmProvider, MockLlmProvider};
pub use config::{FinscopeConfig, LlmConfig, SearchConfig};
pub use error::{FinscopeError, Result};
pub use preprocess::{PreprocessedResult, preprocess_research_results};
pub use providers::create_provider;
pub use research::{RegisteredTool, ResearchAgent, ToolExecutor};
pub use types::{
    CompletionRequest, CompletionResponse, Content, Message, ResearchResult, Role, SourceRecord,
    TimeRange, TokenUsage, ToolDefinition, ToolOutput,
};
pub use validation::{DataQuality, ValidationReport, run_all_validations};
