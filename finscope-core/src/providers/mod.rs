//! LLM provider implementations.
//!
//! Every supported backend speaks the OpenAI chat-completions format
//! (Groq by default). Use `create_provider()` to build one from config.

pub mod openai_compat;

use crate::brain::LlmProvider;
use crate::config::LlmConfig;
use crate::error::{ConfigError, FinscopeError, LlmError};
use std::sync::Arc;

pub use openai_compat::OpenAiCompatibleProvider;

/// Create an LLM provider based on the configuration.
///
/// A missing API key is reported as a configuration fault so the caller
/// fails before any request is sent.
pub fn create_provider(config: &LlmConfig) -> Result<Arc<dyn LlmProvider>, FinscopeError> {
    for warning in config.validate() {
        tracing::warn!(warning = %warning, "LLM configuration warning");
    }

    match config.provider.as_str() {
        "groq" | "openai" | "ollama" | "openai-compatible" => {
            match OpenAiCompatibleProvider::new(config) {
                Ok(provider) => Ok(Arc::new(provider)),
                Err(LlmError::AuthFailed { .. }) => Err(ConfigError::EnvVarMissing {
                    var: config.api_key_env.clone(),
                }
                .into()),
                Err(e) => Err(e.into()),
            }
        }
        other => Err(ConfigError::Invalid {
            message: format!(
                "unknown llm.provider '{other}' (expected groq, openai, ollama, or openai-compatible)"
            ),
        }
        .into()),
    }
}
