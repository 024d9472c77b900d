//! Error types for tool execution

use thiserror::Error;

/// Tool execution errors
///
/// Note that most runtime failures never reach this type: tools fold them
/// into `{"error": ...}` payloads so the planner can observe them. These
/// variants cover the cases where no payload can be produced at all.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Tool input did not match the declared schema
    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    /// Configuration error (missing API key etc.)
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Result type alias for tool operations
pub type Result<T> = std::result::Result<T, ToolError>;
