//! Planning step: absorb tool results, consult the oracle, decide the route

use crate::error::Result;
use crate::state::{SessionState, StateDelta};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};
use trend_llm::{CompletionRequest, ContentBlock, LLMProvider, Message, ToolDefinition};

/// Marker prefix the planner uses to request another drafting pass
pub const REVISE_MARKER: &str = "REVISE:";

/// What the planner decided this turn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlannerDecision {
    /// The oracle requested tool calls
    RunTools,

    /// Proceed to drafting (first pass or a requested revision)
    Draft,

    /// The oracle produced the final report
    Finish,
}

/// Output of one planning turn
#[derive(Debug)]
pub struct PlannerOutput {
    pub delta: StateDelta,
    pub decision: PlannerDecision,
}

/// The planning step
///
/// Owns the oracle handle, its system prompt, and the tool schemas it binds
/// to every request.
pub struct PlannerStep {
    provider: Arc<dyn LLMProvider>,
    prompt: String,
    model: String,
    tool_definitions: Vec<ToolDefinition>,
}

impl PlannerStep {
    pub fn new(
        provider: Arc<dyn LLMProvider>,
        prompt: impl Into<String>,
        model: impl Into<String>,
        tool_definitions: Vec<ToolDefinition>,
    ) -> Self {
        Self {
            provider,
            prompt: prompt.into(),
            model: model.into(),
            tool_definitions,
        }
    }

    /// Run one planning turn
    pub async fn run(&self, state: &SessionState) -> Result<PlannerOutput> {
        let mut delta = absorb_tool_results(state);

        // The seed query and the reflection instruction are transient: they
        // shape this one oracle call but are never persisted to the
        // transcript.
        let mut conversation = state.messages.clone();
        if conversation.is_empty() {
            conversation.push(Message::user(state.query.clone()));
        }
        if state.reflection_pending {
            conversation.push(Message::user(format!(
                "The draft analysis has been critiqued. Review the critique and either \
                 request more data with the tools, reply starting with '{REVISE_MARKER}' \
                 to run another drafting pass, or write the final report now."
            )));
        }

        let system = format!("{}\n\n{}", self.prompt, state_summary(state));

        let request = CompletionRequest::builder(&self.model)
            .system(system)
            .messages(conversation)
            .tools(self.tool_definitions.clone())
            .build();

        let response = self.provider.complete(request).await?;
        let message = response.message;

        let decision = if message.has_tool_uses() {
            debug!(count = message.tool_uses().len(), "planner requested tools");
            PlannerDecision::RunTools
        } else {
            let text = message.text().unwrap_or_default();
            if state.critique_cycles == 0 {
                // A tool-free utterance before any critique is ordinary
                // planning talk, never a report.
                debug!("planner spoke without tools before any critique, drafting");
                PlannerDecision::Draft
            } else if is_revise_directive(text) {
                debug!("planner requested another revision pass");
                PlannerDecision::Draft
            } else {
                debug!("planner produced the final report");
                delta.final_report = Some(text.to_string());
                PlannerDecision::Finish
            }
        };

        delta.messages.push(message);

        Ok(PlannerOutput { delta, decision })
    }
}

/// Whether a planner reply asks for another drafting pass
pub fn is_revise_directive(text: &str) -> bool {
    text.trim_start()
        .get(..REVISE_MARKER.len())
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case(REVISE_MARKER))
}

/// Route the trailing run of tool-result messages into state fields
///
/// Walks backwards from the end of the transcript over consecutive
/// tool-result messages. Successful parsed payloads are routed by tool name;
/// error-tagged or unparsable payloads stay in the log and write nothing.
fn absorb_tool_results(state: &SessionState) -> StateDelta {
    let mut delta = StateDelta::default();

    for message in state.messages.iter().rev() {
        if !message.is_tool_result() {
            break;
        }
        for block in message.tool_results() {
            let ContentBlock::ToolResult {
                name,
                content,
                is_error,
                ..
            } = block
            else {
                continue;
            };

            if is_error.unwrap_or(false) {
                warn!(tool = %name, "skipping error-flagged tool result");
                continue;
            }

            let payload: Value = match serde_json::from_str(content) {
                Ok(v) => v,
                Err(e) => {
                    warn!(tool = %name, error = %e, "skipping unparsable tool result");
                    continue;
                }
            };

            if is_error_payload(&payload) {
                warn!(tool = %name, "skipping error-tagged tool payload");
                continue;
            }

            // Walking in reverse, so the first write per field is the most
            // recent result and earlier duplicates are ignored.
            match name.as_str() {
                "get_ohlcv_data" => {
                    delta.market_data.get_or_insert(payload);
                }
                "calculate_technical_indicators" => {
                    delta.technical_analysis.get_or_insert(payload);
                }
                "web_search" => {
                    delta.sentiment_analysis.get_or_insert(payload);
                }
                other => warn!(tool = %other, "tool result from unknown tool, ignoring"),
            }
        }
    }

    delta
}

/// Whether a parsed tool payload is an error report
///
/// Objects carry `{"error": ...}` directly; the search tool wraps its error
/// in a single-element array.
fn is_error_payload(payload: &Value) -> bool {
    match payload {
        Value::Object(map) => map.contains_key("error"),
        Value::Array(items) => items
            .first()
            .and_then(Value::as_object)
            .is_some_and(|map| map.contains_key("error")),
        _ => false,
    }
}

/// One-line-per-field summary of what the state already holds
fn state_summary(state: &SessionState) -> String {
    fn mark(present: bool) -> &'static str {
        if present { "collected" } else { "missing" }
    }

    format!(
        "Current research state:\n\
         - query: {}\n\
         - market data: {}\n\
         - technical indicators: {}\n\
         - sentiment/search results: {}\n\
         - draft analysis: {}\n\
         - critique cycles completed: {}",
        state.query,
        mark(state.market_data.is_some()),
        mark(state.technical_analysis.is_some()),
        mark(state.sentiment_analysis.is_some()),
        mark(state.draft_analysis.is_some()),
        state.critique_cycles,
    )
}
