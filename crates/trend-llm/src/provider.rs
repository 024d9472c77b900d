//! Oracle provider trait definition

use crate::{CompletionRequest, CompletionResponse, Result};
use async_trait::async_trait;

/// Trait for language-model providers
///
/// This is the sole interface the orchestration layer uses to talk to the
/// oracle: one synchronous (from the caller's perspective) completion per
/// invocation, with optional bound tool schemas.
#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Generate a completion from the oracle
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse>;

    /// Get the provider name (e.g., "openai")
    fn name(&self) -> &str;
}
