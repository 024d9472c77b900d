//! Conditional routing after a planning turn

use crate::state::SessionState;

/// Where the loop goes after a planning turn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Final report present; stop the loop
    Finish,

    /// The latest assistant turn requested tool calls
    RunTools,

    /// Proceed to the drafting / critique arm
    Draft,
}

/// Route on the current state, first match wins
///
/// Pure function of the state: a final report always terminates, otherwise
/// pending tool calls on the latest assistant turn win, otherwise the
/// analysis arm runs.
pub fn route(state: &SessionState) -> Route {
    if state.final_report.is_some() {
        return Route::Finish;
    }

    if state
        .messages
        .last()
        .is_some_and(trend_llm::Message::has_tool_uses)
    {
        return Route::RunTools;
    }

    Route::Draft
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::StateDelta;
    use serde_json::json;
    use trend_llm::{ContentBlock, Message, MessageContent, Role};

    fn assistant_with_tool_call() -> Message {
        Message {
            role: Role::Assistant,
            content: Some(MessageContent::Blocks(vec![ContentBlock::ToolUse {
                id: "call_1".to_string(),
                name: "get_ohlcv_data".to_string(),
                input: json!({}),
            }])),
        }
    }

    #[test]
    fn final_report_always_wins() {
        let mut state = SessionState::new("q");
        state.apply(StateDelta {
            messages: vec![assistant_with_tool_call()],
            final_report: Some("done".to_string()),
            ..Default::default()
        });
        assert_eq!(route(&state), Route::Finish);
    }

    #[test]
    fn pending_tool_calls_route_to_tools() {
        let mut state = SessionState::new("q");
        state.apply(StateDelta {
            messages: vec![assistant_with_tool_call()],
            ..Default::default()
        });
        assert_eq!(route(&state), Route::RunTools);
    }

    #[test]
    fn plain_text_routes_to_draft() {
        let mut state = SessionState::new("q");
        state.apply(StateDelta {
            messages: vec![Message::assistant("I have enough data")],
            ..Default::default()
        });
        assert_eq!(route(&state), Route::Draft);
    }

    #[test]
    fn empty_transcript_routes_to_draft() {
        let state = SessionState::new("q");
        assert_eq!(route(&state), Route::Draft);
    }

    #[test]
    fn routing_is_deterministic() {
        let mut state = SessionState::new("q");
        state.apply(StateDelta {
            messages: vec![assistant_with_tool_call()],
            ..Default::default()
        });
        let first = route(&state);
        for _ in 0..10 {
            assert_eq!(route(&state), first);
        }
    }
}
