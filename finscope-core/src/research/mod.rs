//! Research orchestrator.
//!
//! Drives a tool-calling model until it produces a final answer, collecting
//! every source record the search tool returns along the way. The loop
//! alternates between two states: waiting for the model, and feeding it the
//! results of the tool calls it asked for.

pub mod sources;

use crate::brain::LlmProvider;
use crate::config::ResearchConfig;
use crate::error::{AgentError, ConfigError, FinscopeError, ToolError};
use crate::prompts::RESEARCH_SYSTEM_PROMPT;
use crate::types::{
    CompletionRequest, Message, ResearchResult, SourceRecord, TimeRange, TokenUsage, ToolCall,
    ToolDefinition, ToolOutput,
};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Executor function for a tool.
pub type ToolExecutor = Box<
    dyn Fn(
            serde_json::Value,
        ) -> std::pin::Pin<
            Box<dyn std::future::Future<Output = Result<ToolOutput, ToolError>> + Send>,
        > + Send
        + Sync,
>;

/// A tool the research model may call.
pub struct RegisteredTool {
    pub definition: ToolDefinition,
    pub executor: ToolExecutor,
}

/// Where the research loop currently is.
#[derive(Debug, Clone, PartialEq)]
pub enum LoopState {
    AwaitingModel,
    /// The model asked for these calls; their results are due next.
    AwaitingToolResult(Vec<ToolCall>),
}

/// Builds the user turn for a research query.
pub fn build_user_message(query: &str, time_range: Option<TimeRange>) -> String {
    let mut message = format!("Query: {query}");
    if let Some(range) = time_range {
        message.push_str(&format!("\nTime range: {range}"));
    }
    message
}

/// The tool-calling research agent.
pub struct ResearchAgent {
    provider: Arc<dyn LlmProvider>,
    tools: HashMap<String, RegisteredTool>,
    config: ResearchConfig,
}

impl ResearchAgent {
    pub fn new(provider: Arc<dyn LlmProvider>, config: ResearchConfig) -> Self {
        Self {
            provider,
            tools: HashMap::new(),
            config,
        }
    }

    /// Register a tool. A tool with the same name is replaced.
    pub fn register_tool(&mut self, tool: RegisteredTool) {
        debug!(tool = %tool.definition.name, "Registered research tool");
        self.tools.insert(tool.definition.name.clone(), tool);
    }

    /// Definitions of all registered tools, sorted by name.
    pub fn tool_definitions(&self) -> Vec<ToolDefinition> {
        let mut defs: Vec<ToolDefinition> =
            self.tools.values().map(|t| t.definition.clone()).collect();
        defs.sort_by(|a, b| a.name.cmp(&b.name));
        defs
    }

    /// Answer `query` using the search tools.
    ///
    /// Fails with `AgentError::MaxIterationsReached` when the model is still
    /// asking for tools after `max_iterations` calls, and with a config error
    /// when tools are registered but the provider cannot call them.
    pub async fn research(
        &self,
        query: &str,
        time_range: Option<TimeRange>,
    ) -> Result<ResearchResult, FinscopeError> {
        info!(query = query, time_range = ?time_range, "Starting research");

        let tools = self.tool_definitions();
        if !tools.is_empty() && !self.provider.supports_tools() {
            return Err(ConfigError::Invalid {
                message: format!(
                    "model '{}' does not support tool calling",
                    self.provider.model_name()
                ),
            }
            .into());
        }
        let mut messages = vec![
            Message::system(RESEARCH_SYSTEM_PROMPT),
            Message::user(build_user_message(query, time_range)),
        ];
        let mut records: Vec<SourceRecord> = Vec::new();
        let mut usage = TokenUsage::default();
        let mut model_calls = 0;
        let mut state = LoopState::AwaitingModel;

        loop {
            state = match state {
                LoopState::AwaitingModel => {
                    if model_calls >= self.config.max_iterations {
                        warn!(max = self.config.max_iterations, "Research loop hit its cap");
                        return Err(AgentError::MaxIterationsReached {
                            max: self.config.max_iterations,
                        }
                        .into());
                    }
                    model_calls += 1;

                    let request = CompletionRequest {
                        messages: messages.clone(),
                        tools: (!tools.is_empty()).then(|| tools.clone()),
                        temperature: self.config.temperature,
                        ..Default::default()
                    };
                    let response = self.provider.complete(request).await?;
                    usage.accumulate(&response.usage);

                    let calls = response.message.content.tool_calls();
                    if calls.is_empty() {
                        let answer = response.message.content.joined_text();
                        info!(
                            iterations = model_calls,
                            sources = records.len(),
                            tokens = usage.total(),
                            "Research complete"
                        );
                        return Ok(
                            ResearchResult::new(answer, sources::urls(&records))
                                .with_records(records),
                        );
                    }

                    debug!(calls = calls.len(), "Model requested tool calls");
                    messages.push(response.message);
                    LoopState::AwaitingToolResult(calls)
                }
                LoopState::AwaitingToolResult(calls) => {
                    for call in &calls {
                        let result = self.execute_call(call, &mut records).await?;
                        messages.push(result);
                    }
                    LoopState::AwaitingModel
                }
            };
        }
    }

    /// Run one tool call and turn its outcome into a tool-result message.
    ///
    /// Mistakes the model can fix (unknown tool, bad arguments) go back to it
    /// as error results; everything else aborts the research.
    async fn execute_call(
        &self,
        call: &ToolCall,
        records: &mut Vec<SourceRecord>,
    ) -> Result<Message, FinscopeError> {
        let Some(tool) = self.tools.get(&call.name) else {
            warn!(tool = %call.name, "Model requested an unknown tool");
            return Ok(Message::tool_result(
                &call.id,
                format!("Error: unknown tool '{}'", call.name),
                true,
            ));
        };

        debug!(tool = %call.name, arguments = %call.arguments, "Executing tool");
        match (tool.executor)(call.arguments.clone()).await {
            Ok(output) => {
                match sources::parse_tool_records(&output.content) {
                    Ok(found) => {
                        debug!(tool = %call.name, records = found.len(), "Collected sources");
                        records.extend(found);
                    }
                    Err(e) => {
                        warn!(tool = %call.name, error = %e, "Could not parse tool output; dropping its sources");
                    }
                }
                Ok(Message::tool_result(&call.id, output.content, false))
            }
            Err(ToolError::InvalidArguments { name, reason }) => {
                warn!(tool = %name, reason = %reason, "Tool rejected its arguments");
                Ok(Message::tool_result(
                    &call.id,
                    format!("Error: invalid arguments for '{name}': {reason}"),
                    true,
                ))
            }
            Err(e @ ToolError::MissingCredential { .. }) => Err(FinscopeError::Config(e.into())),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brain::MockLlmProvider;
    use crate::types::{Content, Role};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn search_tool(output: &'static str) -> RegisteredTool {
        RegisteredTool {
            definition: ToolDefinition {
                name: "research".to_string(),
                description: "Search finance news".to_string(),
                parameters: json!({"type": "object"}),
            },
            executor: Box::new(move |_args| Box::pin(async move { Ok(ToolOutput::text(output)) })),
        }
    }

    fn failing_tool(make: fn() -> ToolError) -> RegisteredTool {
        RegisteredTool {
            definition: ToolDefinition {
                name: "research".to_string(),
                description: "Search finance news".to_string(),
                parameters: json!({"type": "object"}),
            },
            executor: Box::new(move |_args| Box::pin(async move { Err::<ToolOutput, _>(make()) })),
        }
    }

    fn agent(provider: Arc<MockLlmProvider>, tool: RegisteredTool) -> ResearchAgent {
        let mut agent = ResearchAgent::new(provider, ResearchConfig::default());
        agent.register_tool(tool);
        agent
    }

    #[test]
    fn test_build_user_message() {
        assert_eq!(build_user_message("giá vàng", None), "Query: giá vàng");
        assert_eq!(
            build_user_message("giá vàng", Some(TimeRange::Week)),
            "Query: giá vàng\nTime range: week"
        );
    }

    #[tokio::test]
    async fn test_research_collects_sources() {
        let provider = Arc::new(MockLlmProvider::new());
        provider.queue_response(MockLlmProvider::tool_call_response(
            "research",
            json!({"query": "giá vàng", "time_range": "day"}),
        ));
        provider.queue_response(MockLlmProvider::text_response("Giá vàng 85 triệu/lượng"));

        let agent = agent(
            provider.clone(),
            search_tool(r#"[{"url": "https://a.vn", "content": "x"}, {"url": "https://b.vn", "content": "y"}]"#),
        );
        let result = agent
            .research("giá vàng", Some(TimeRange::Day))
            .await
            .unwrap();

        assert_eq!(result.answer, "Giá vàng 85 triệu/lượng");
        assert_eq!(result.sources, vec!["https://a.vn", "https://b.vn"]);
        assert_eq!(result.records.len(), 2);

        let requests = provider.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(
            requests[0].messages[1].content.as_text(),
            Some("Query: giá vàng\nTime range: day")
        );
        assert_eq!(requests[0].tools.as_ref().unwrap()[0].name, "research");
        // Second request carries the assistant call and the tool result
        let last = requests[1].messages.last().unwrap();
        assert_eq!(last.role, Role::Tool);
        assert!(matches!(last.content, Content::ToolResult { is_error: false, .. }));
    }

    #[tokio::test]
    async fn test_research_without_tool_calls() {
        let provider = Arc::new(MockLlmProvider::with_response("Không tìm thấy thông tin liên quan."));
        let agent = agent(provider, search_tool("[]"));
        let result = agent.research("xyz", None).await.unwrap();
        assert!(result.sources.is_empty());
        assert_eq!(result.answer, "Không tìm thấy thông tin liên quan.");
    }

    #[tokio::test]
    async fn test_unparseable_tool_output_drops_sources() {
        let provider = Arc::new(MockLlmProvider::new());
        provider.queue_response(MockLlmProvider::tool_call_response("research", json!({"query": "a"})));
        provider.queue_response(MockLlmProvider::text_response("done"));
        let agent = agent(provider, search_tool("not json"));
        let result = agent.research("a", None).await.unwrap();
        assert!(result.sources.is_empty());
        assert_eq!(result.answer, "done");
    }

    #[tokio::test]
    async fn test_multiple_calls_flatten_in_order() {
        let provider = Arc::new(MockLlmProvider::new());
        provider.queue_response(MockLlmProvider::multi_tool_call_response(&[
            ("research", json!({"query": "a"})),
            ("research", json!({"query": "b"})),
        ]));
        provider.queue_response(MockLlmProvider::text_response("done"));
        let agent = agent(provider, search_tool(r#"[{"url": "https://a.vn", "content": ""}]"#));
        let result = agent.research("a", None).await.unwrap();
        assert_eq!(result.sources, vec!["https://a.vn", "https://a.vn"]);
    }

    #[tokio::test]
    async fn test_iteration_cap() {
        let provider = Arc::new(MockLlmProvider::new());
        for _ in 0..3 {
            provider.queue_response(MockLlmProvider::tool_call_response("research", json!({})));
        }
        let mut agent = ResearchAgent::new(
            provider.clone(),
            ResearchConfig {
                max_iterations: 2,
                ..Default::default()
            },
        );
        agent.register_tool(search_tool("[]"));
        let err = agent.research("a", None).await.unwrap_err();
        assert!(matches!(
            err,
            FinscopeError::Agent(AgentError::MaxIterationsReached { max: 2 })
        ));
        assert_eq!(provider.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_unknown_tool_is_reported_to_model() {
        let provider = Arc::new(MockLlmProvider::new());
        provider.queue_response(MockLlmProvider::tool_call_response("stock_price", json!({})));
        provider.queue_response(MockLlmProvider::text_response("fallback"));
        let agent = agent(provider.clone(), search_tool("[]"));
        let result = agent.research("a", None).await.unwrap();
        assert_eq!(result.answer, "fallback");

        let last = provider.requests()[1].messages.last().unwrap().clone();
        match last.content {
            Content::ToolResult { output, is_error, .. } => {
                assert!(is_error);
                assert!(output.contains("unknown tool 'stock_price'"));
            }
            other => panic!("Expected ToolResult, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_invalid_arguments_are_reported_to_model() {
        let provider = Arc::new(MockLlmProvider::new());
        provider.queue_response(MockLlmProvider::tool_call_response("research", json!({})));
        provider.queue_response(MockLlmProvider::text_response("retry later"));
        let agent = agent(
            provider,
            failing_tool(|| ToolError::InvalidArguments {
                name: "research".into(),
                reason: "missing 'query'".into(),
            }),
        );
        let result = agent.research("a", None).await.unwrap();
        assert_eq!(result.answer, "retry later");
    }

    #[tokio::test]
    async fn test_missing_credential_is_config_fault() {
        let provider = Arc::new(MockLlmProvider::new());
        provider.queue_response(MockLlmProvider::tool_call_response("research", json!({"query": "a"})));
        let agent = agent(
            provider,
            failing_tool(|| ToolError::MissingCredential {
                name: "research".into(),
                var: "TAVILY_API_KEY".into(),
            }),
        );
        let err = agent.research("a", None).await.unwrap_err();
        assert!(matches!(
            err,
            FinscopeError::Config(ConfigError::EnvVarMissing { .. })
        ));
    }

    #[tokio::test]
    async fn test_upstream_failure_propagates() {
        let provider = Arc::new(MockLlmProvider::new());
        provider.queue_response(MockLlmProvider::tool_call_response("research", json!({"query": "a"})));
        let agent = agent(
            provider,
            failing_tool(|| ToolError::ExecutionFailed {
                name: "research".into(),
                message: "HTTP 502".into(),
            }),
        );
        let err = agent.research("a", None).await.unwrap_err();
        assert!(matches!(
            err,
            FinscopeError::Tool(ToolError::ExecutionFailed { .. })
        ));
    }

    #[tokio::test]
    async fn test_provider_without_tool_support_is_config_fault() {
        let provider = Arc::new(MockLlmProvider::without_tool_support());
        let agent = agent(provider.clone(), search_tool("[]"));
        let err = agent.research("giá vàng", None).await.unwrap_err();
        assert!(matches!(err, FinscopeError::Config(ConfigError::Invalid { .. })));
        assert!(err.to_string().contains("mock-model"));
        assert!(provider.requests().is_empty());
    }

    #[tokio::test]
    async fn test_provider_without_tool_support_answers_when_no_tools() {
        let provider = Arc::new(MockLlmProvider::without_tool_support());
        provider.queue_response(MockLlmProvider::text_response("Không có công cụ."));
        let agent = ResearchAgent::new(provider, ResearchConfig::default());
        let result = agent.research("giá vàng", None).await.unwrap();
        assert_eq!(result.answer, "Không có công cụ.");
        assert!(result.sources.is_empty());
    }
}
