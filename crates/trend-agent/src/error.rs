//! Error types for the orchestration layer

use thiserror::Error;

/// Orchestration errors
#[derive(Debug, Error)]
pub enum AgentError {
    /// Oracle call failed
    #[error("Oracle error: {0}")]
    Llm(#[from] trend_llm::LlmError),

    /// Tool execution failed with unusable parameters
    #[error("Tool error: {0}")]
    Tool(#[from] trend_tools::ToolError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for orchestration operations
pub type Result<T> = std::result::Result<T, AgentError>;
