//! Scripted fakes for loop and step tests

use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use trend_llm::{
    CompletionRequest, CompletionResponse, ContentBlock, LLMProvider, Message, MessageContent,
    Role, StopReason, TokenUsage,
};
use trend_tools::Tool;

/// Provider that replays a fixed sequence of responses
pub struct ScriptedProvider {
    responses: Mutex<VecDeque<CompletionResponse>>,
    calls: AtomicUsize,
}

impl ScriptedProvider {
    pub fn new(responses: Vec<CompletionResponse>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of completions served so far
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LLMProvider for ScriptedProvider {
    async fn complete(&self, _request: CompletionRequest) -> trend_llm::Result<CompletionResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.responses
            .lock()
            .expect("scripted provider lock poisoned")
            .pop_front()
            .ok_or_else(|| {
                trend_llm::LlmError::RequestFailed("scripted provider exhausted".to_string())
            })
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

/// Build a plain text completion response
pub fn text_response(text: impl Into<String>) -> CompletionResponse {
    CompletionResponse {
        message: Message::assistant(text),
        stop_reason: StopReason::EndTurn,
        usage: TokenUsage {
            input_tokens: 0,
            output_tokens: 0,
        },
    }
}

/// Build a completion response requesting the given tool calls
pub fn tool_call_response(calls: Vec<(&str, &str, Value)>) -> CompletionResponse {
    let blocks = calls
        .into_iter()
        .map(|(id, name, input)| ContentBlock::ToolUse {
            id: id.to_string(),
            name: name.to_string(),
            input,
        })
        .collect();

    CompletionResponse {
        message: Message {
            role: Role::Assistant,
            content: Some(MessageContent::Blocks(blocks)),
        },
        stop_reason: StopReason::ToolUse,
        usage: TokenUsage {
            input_tokens: 0,
            output_tokens: 0,
        },
    }
}

/// Tool that returns a fixed payload and counts its invocations
pub struct StaticTool {
    name: &'static str,
    payload: Value,
    calls: AtomicUsize,
}

impl StaticTool {
    pub fn new(name: &'static str, payload: Value) -> Self {
        Self {
            name,
            payload,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Tool for StaticTool {
    async fn execute(&self, _params: Value) -> trend_tools::Result<Value> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.payload.clone())
    }

    fn name(&self) -> &str {
        self.name
    }

    fn description(&self) -> &str {
        "static test tool"
    }

    fn input_schema(&self) -> Value {
        serde_json::json!({"type": "object"})
    }
}
