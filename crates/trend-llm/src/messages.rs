//! Conversation types exchanged with the oracle
//!
//! A run's transcript is a sequence of [`Message`]s. Assistant turns may carry
//! tool-call requests; tool results come back as user turns with
//! [`ContentBlock::ToolResult`] blocks tagged with the originating tool name,
//! which the planner uses to route parsed payloads into session state.

use serde::{Deserialize, Serialize};

/// Message role in a conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// User message
    User,
    /// Assistant message
    Assistant,
    /// System message (handled separately in some providers)
    System,
}

/// Content block in a message
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    /// Plain text content
    Text {
        /// Text content
        text: String,
    },

    /// Tool call requested by the assistant
    ToolUse {
        /// Unique ID for this tool call
        id: String,
        /// Tool name
        name: String,
        /// Tool input parameters (JSON)
        input: serde_json::Value,
    },

    /// Result of an executed tool call
    ToolResult {
        /// ID of the tool call this is responding to
        tool_use_id: String,
        /// Name of the tool that produced this result
        name: String,
        /// Result content, usually serialized JSON
        content: String,
        /// Whether this result represents an execution failure
        #[serde(skip_serializing_if = "Option::is_none")]
        is_error: Option<bool>,
    },
}

/// Message content: either simple text or structured blocks
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    /// Simple text content
    Text(String),
    /// Structured content blocks
    Blocks(Vec<ContentBlock>),
}

/// A message in the conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Message role
    pub role: Role,

    /// Message content
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<MessageContent>,
}

impl Message {
    /// Create a user message with text
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: Some(MessageContent::Text(text.into())),
        }
    }

    /// Create an assistant message with text
    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: Some(MessageContent::Text(text.into())),
        }
    }

    /// Create a user message carrying a successful tool result
    pub fn tool_result(
        tool_use_id: impl Into<String>,
        name: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            role: Role::User,
            content: Some(MessageContent::Blocks(vec![ContentBlock::ToolResult {
                tool_use_id: tool_use_id.into(),
                name: name.into(),
                content: content.into(),
                is_error: None,
            }])),
        }
    }

    /// Create a user message carrying a failed tool result
    pub fn tool_error(
        tool_use_id: impl Into<String>,
        name: impl Into<String>,
        error: impl Into<String>,
    ) -> Self {
        Self {
            role: Role::User,
            content: Some(MessageContent::Blocks(vec![ContentBlock::ToolResult {
                tool_use_id: tool_use_id.into(),
                name: name.into(),
                content: error.into(),
                is_error: Some(true),
            }])),
        }
    }

    /// Extract the first text content from the message
    pub fn text(&self) -> Option<&str> {
        match &self.content {
            Some(MessageContent::Text(s)) => Some(s),
            Some(MessageContent::Blocks(blocks)) => blocks.iter().find_map(|b| match b {
                ContentBlock::Text { text } => Some(text.as_str()),
                _ => None,
            }),
            None => None,
        }
    }

    /// Extract tool call requests from an assistant message
    pub fn tool_uses(&self) -> Vec<&ContentBlock> {
        match &self.content {
            Some(MessageContent::Blocks(blocks)) => blocks
                .iter()
                .filter(|b| matches!(b, ContentBlock::ToolUse { .. }))
                .collect(),
            _ => vec![],
        }
    }

    /// Check if this message contains any tool call requests
    pub fn has_tool_uses(&self) -> bool {
        !self.tool_uses().is_empty()
    }

    /// Extract tool result blocks from a tool-result message
    pub fn tool_results(&self) -> Vec<&ContentBlock> {
        match &self.content {
            Some(MessageContent::Blocks(blocks)) => blocks
                .iter()
                .filter(|b| matches!(b, ContentBlock::ToolResult { .. }))
                .collect(),
            _ => vec![],
        }
    }

    /// Check if this message is a batch of tool results
    pub fn is_tool_result(&self) -> bool {
        !self.tool_results().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_and_assistant_text() {
        let msg = Message::user("what is the trend?");
        assert_eq!(msg.role, Role::User);
        assert_eq!(msg.text(), Some("what is the trend?"));

        let msg = Message::assistant("gathering data");
        assert_eq!(msg.role, Role::Assistant);
        assert!(!msg.has_tool_uses());
    }

    #[test]
    fn tool_result_carries_name() {
        let msg = Message::tool_result("call_1", "get_ohlcv_data", r#"{"ticker":"BTC-USD"}"#);
        assert_eq!(msg.role, Role::User);
        assert!(msg.is_tool_result());

        match msg.tool_results()[0] {
            ContentBlock::ToolResult { name, is_error, .. } => {
                assert_eq!(name, "get_ohlcv_data");
                assert!(is_error.is_none());
            }
            _ => panic!("expected tool result block"),
        }
    }

    #[test]
    fn tool_error_is_flagged() {
        let msg = Message::tool_error("call_2", "web_search", "timed out");
        match msg.tool_results()[0] {
            ContentBlock::ToolResult { is_error, .. } => assert_eq!(*is_error, Some(true)),
            _ => panic!("expected tool result block"),
        }
    }

    #[test]
    fn tool_uses_from_blocks() {
        let msg = Message {
            role: Role::Assistant,
            content: Some(MessageContent::Blocks(vec![
                ContentBlock::Text {
                    text: "let me check".to_string(),
                },
                ContentBlock::ToolUse {
                    id: "call_3".to_string(),
                    name: "web_search".to_string(),
                    input: serde_json::json!({"query": "bitcoin news"}),
                },
            ])),
        };

        assert!(msg.has_tool_uses());
        assert_eq!(msg.tool_uses().len(), 1);
        assert_eq!(msg.text(), Some("let me check"));
    }

    #[test]
    fn serde_round_trip() {
        let msg = Message::tool_result("call_4", "calculate_technical_indicators", "{}");
        let json = serde_json::to_string(&msg).unwrap();
        let back: Message = serde_json::from_str(&json).unwrap();
        assert!(back.is_tool_result());
    }
}
