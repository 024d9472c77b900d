//! Oracle interface for trend-agent
//!
//! Defines the conversation types exchanged with the language model, the
//! completion request/response contract, and the `LLMProvider` trait with its
//! OpenAI implementation.

pub mod completion;
pub mod error;
pub mod messages;
pub mod provider;
pub mod providers;
pub mod tools;

pub use completion::{CompletionRequest, CompletionRequestBuilder, CompletionResponse, StopReason, TokenUsage};
pub use error::{LlmError, Result};
pub use messages::{ContentBlock, Message, MessageContent, Role};
pub use provider::LLMProvider;
pub use providers::{OpenAIConfig, OpenAIProvider};
pub use tools::ToolDefinition;
