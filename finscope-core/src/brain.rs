//! LLM provider abstraction.
//!
//! Both orchestrators talk to the model through `LlmProvider`, so the
//! pipeline can be driven by a real endpoint or by `MockLlmProvider` in tests.

use crate::error::LlmError;
use crate::types::{CompletionRequest, CompletionResponse, Content, Message, Role, TokenUsage};
use async_trait::async_trait;
use std::sync::Mutex;

/// Trait for LLM providers.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Perform a full completion and return the response.
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError>;

    /// Return whether this provider supports tool/function calling.
    fn supports_tools(&self) -> bool;

    /// Return the model name.
    fn model_name(&self) -> &str;
}

/// A mock LLM provider for testing and development.
///
/// Replays queued responses in order and records every request it receives.
pub struct MockLlmProvider {
    model: String,
    tool_support: bool,
    responses: Mutex<Vec<CompletionResponse>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl MockLlmProvider {
    pub fn new() -> Self {
        Self {
            model: "mock-model".to_string(),
            tool_support: true,
            responses: Mutex::new(Vec::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Create a MockLlmProvider that answers with the given text.
    pub fn with_response(text: &str) -> Self {
        let provider = Self::new();
        provider.queue_response(Self::text_response(text));
        provider
    }

    /// A mock that reports no tool-calling support.
    pub fn without_tool_support() -> Self {
        Self {
            tool_support: false,
            ..Self::new()
        }
    }

    /// Queue a response to be returned by the next `complete` call.
    pub fn queue_response(&self, response: CompletionResponse) {
        self.responses.lock().unwrap().push(response);
    }

    /// Requests received so far, oldest first.
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Create a simple text response for testing.
    pub fn text_response(text: &str) -> CompletionResponse {
        CompletionResponse {
            message: Message::assistant(text),
            usage: TokenUsage {
                input_tokens: 100,
                output_tokens: 50,
            },
            model: "mock-model".to_string(),
            finish_reason: Some("stop".to_string()),
        }
    }

    /// Create a tool call response for testing.
    pub fn tool_call_response(tool_name: &str, arguments: serde_json::Value) -> CompletionResponse {
        let call_id = format!("call_{}", uuid::Uuid::new_v4());
        CompletionResponse {
            message: Message::new(
                Role::Assistant,
                Content::tool_call(&call_id, tool_name, arguments),
            ),
            usage: TokenUsage {
                input_tokens: 100,
                output_tokens: 30,
            },
            model: "mock-model".to_string(),
            finish_reason: Some("tool_calls".to_string()),
        }
    }

    /// Create a response carrying several tool calls at once.
    pub fn multi_tool_call_response(calls: &[(&str, serde_json::Value)]) -> CompletionResponse {
        let parts = calls
            .iter()
            .map(|(name, arguments)| {
                let call_id = format!("call_{}", uuid::Uuid::new_v4());
                Content::tool_call(call_id, *name, arguments.clone())
            })
            .collect();
        CompletionResponse {
            message: Message::new(Role::Assistant, Content::MultiPart { parts }),
            usage: TokenUsage {
                input_tokens: 100,
                output_tokens: 40,
            },
            model: "mock-model".to_string(),
            finish_reason: Some("tool_calls".to_string()),
        }
    }
}

impl Default for MockLlmProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LlmProvider for MockLlmProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        self.requests.lock().unwrap().push(request);
        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            Ok(MockLlmProvider::text_response(
                "I'm a mock LLM. No queued responses available.",
            ))
        } else {
            Ok(responses.remove(0))
        }
    }

    fn supports_tools(&self) -> bool {
        self.tool_support
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
