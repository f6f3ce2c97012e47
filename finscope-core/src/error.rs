//! Error types for the finscope core.
//!
//! Uses `thiserror` for public API error types with structured variants
//! covering LLM, tool execution, configuration, and orchestration faults.

/// Top-level error type for the finscope core library.
#[derive(Debug, thiserror::Error)]
pub enum FinscopeError {
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Agent error: {0}")]
    Agent(#[from] AgentError),
}

/// Errors from LLM provider interactions.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("API request failed: {message}")]
    ApiRequest { message: String },

    #[error("API response parse error: {message}")]
    ResponseParse { message: String },

    #[error("Response violates the analysis schema: {message}")]
    SchemaViolation { message: String },

    #[error("Authentication failed for provider {provider}")]
    AuthFailed { provider: String },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Provider connection failed: {message}")]
    Connection { message: String },
}

/// Errors from tool execution.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("Tool not found: {name}")]
    NotFound { name: String },

    #[error("Tool already registered: {name}")]
    AlreadyRegistered { name: String },

    #[error("Invalid arguments for tool '{name}': {reason}")]
    InvalidArguments { name: String, reason: String },

    #[error("Tool '{name}' is missing a credential: environment variable {var} not set")]
    MissingCredential { name: String, var: String },

    #[error("Tool '{name}' execution failed: {message}")]
    ExecutionFailed { name: String, message: String },

    #[error("Tool '{name}' timed out after {timeout_secs}s")]
    Timeout { name: String, timeout_secs: u64 },
}

/// Errors from the configuration system.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {message}")]
    Invalid { message: String },

    #[error("Environment variable not set: {var}")]
    EnvVarMissing { var: String },
}

/// Errors from the research and analysis orchestrators.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    #[error("Maximum iterations ({max}) reached without a final answer")]
    MaxIterationsReached { max: usize },
}

impl From<ToolError> for ConfigError {
    fn from(err: ToolError) -> Self {
        match err {
            ToolError::MissingCredential { var, .. } => ConfigError::EnvVarMissing { var },
            other => ConfigError::Invalid {
                message: other.to_string(),
            },
        }
    }
}

/// A type alias for results using the top-level `FinscopeError`.
pub type Result<T> = std::result::Result<T, FinscopeError>;
