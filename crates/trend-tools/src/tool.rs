//! Tool trait definition

use crate::Result;
use async_trait::async_trait;
use serde_json::Value;

/// Trait for tools the planner can request
///
/// Each tool provides a name, description, and JSON schema for its input.
/// The name must match the schema bound to the oracle request, since tool
/// results are routed back into session state by name.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Execute the tool with given parameters
    ///
    /// Expected failures come back as `Ok` with an `{"error": ...}` payload;
    /// an `Err` means the parameters themselves were unusable.
    async fn execute(&self, params: Value) -> Result<Value>;

    /// Get the tool's name
    ///
    /// Must be unique within a ToolRegistry.
    fn name(&self) -> &str;

    /// Get the tool's description
    fn description(&self) -> &str;

    /// Get the tool's input schema (JSON Schema format)
    fn input_schema(&self) -> Value;
}
