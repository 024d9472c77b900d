//! Tool schema types bound to oracle requests

use serde::{Deserialize, Serialize};

/// Tool schema exposed to the oracle
///
/// Describes a callable tool by name, natural-language description, and a
/// JSON Schema for its parameters. The name must match the executable tool
/// registered with the orchestration layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Tool name
    pub name: String,

    /// Description of what the tool does
    pub description: String,

    /// JSON schema for the tool's input parameters
    pub input_schema: serde_json::Value,
}

impl ToolDefinition {
    /// Create a new tool definition
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        input_schema: serde_json::Value,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema,
        }
    }
}
