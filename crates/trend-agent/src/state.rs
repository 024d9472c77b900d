//! Session state and delta merge semantics

use serde::Serialize;
use serde_json::Value;
use trend_llm::Message;

/// Shared state for one research run
///
/// Owned exclusively by the loop driver. Components receive `&SessionState`
/// and return a [`StateDelta`]; all mutation happens in [`SessionState::apply`].
#[derive(Debug, Clone, Serialize)]
pub struct SessionState {
    /// The user's research question, immutable after creation
    pub query: String,

    /// Parsed result of the most recent successful market-data tool call
    pub market_data: Option<Value>,

    /// Parsed result of the most recent successful indicator tool call
    pub technical_analysis: Option<Value>,

    /// Parsed result of the most recent successful web-search tool call
    pub sentiment_analysis: Option<Value>,

    /// Current draft of the analysis, overwritten on each drafting pass
    pub draft_analysis: Option<String>,

    /// Most recent critique of the draft
    pub reflection: Option<String>,

    /// Whether the current reflection still awaits a revision pass
    ///
    /// Set when the critic writes a reflection, cleared when the drafter
    /// produces a revised draft.
    pub reflection_pending: bool,

    /// Number of completed draft → critique cycles
    pub critique_cycles: usize,

    /// The finished report; presence is the sole termination signal
    pub final_report: Option<String>,

    /// Append-only transcript of oracle and tool turns
    pub messages: Vec<Message>,
}

impl SessionState {
    /// Create a fresh state for a query
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            market_data: None,
            technical_analysis: None,
            sentiment_analysis: None,
            draft_analysis: None,
            reflection: None,
            reflection_pending: false,
            critique_cycles: 0,
            final_report: None,
            messages: Vec::new(),
        }
    }

    /// Merge a delta into the state
    ///
    /// Messages are appended; scalar fields are overwritten when the delta
    /// carries `Some`. A final report, once set, is never overwritten.
    pub fn apply(&mut self, delta: StateDelta) {
        self.messages.extend(delta.messages);

        if let Some(v) = delta.market_data {
            self.market_data = Some(v);
        }
        if let Some(v) = delta.technical_analysis {
            self.technical_analysis = Some(v);
        }
        if let Some(v) = delta.sentiment_analysis {
            self.sentiment_analysis = Some(v);
        }
        if let Some(v) = delta.draft_analysis {
            self.draft_analysis = Some(v);
        }
        if let Some(v) = delta.reflection {
            self.reflection = Some(v);
        }
        if delta.critique_completed {
            self.reflection_pending = true;
            self.critique_cycles += 1;
        }
        if delta.reflection_addressed {
            self.reflection_pending = false;
        }
        if self.final_report.is_none() {
            if let Some(v) = delta.final_report {
                self.final_report = Some(v);
            }
        }
    }

    /// Whether the run has produced its final report
    pub fn is_complete(&self) -> bool {
        self.final_report.is_some()
    }
}

/// Partial state update returned by a component
///
/// The default delta is a no-op.
#[derive(Debug, Clone, Default, Serialize)]
pub struct StateDelta {
    /// Transcript turns to append
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub messages: Vec<Message>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub market_data: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub technical_analysis: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub sentiment_analysis: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub draft_analysis: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub reflection: Option<String>,

    /// A critique cycle completed; marks the reflection pending
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub critique_completed: bool,

    /// A revision pass addressed the pending reflection
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub reflection_addressed: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_report: Option<String>,
}

impl StateDelta {
    /// Whether this delta carries no changes at all
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
            && self.market_data.is_none()
            && self.technical_analysis.is_none()
            && self.sentiment_analysis.is_none()
            && self.draft_analysis.is_none()
            && self.reflection.is_none()
            && !self.critique_completed
            && !self.reflection_addressed
            && self.final_report.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn transcript_is_append_only() {
        let mut state = SessionState::new("bitcoin trend");
        state.apply(StateDelta {
            messages: vec![Message::user("q")],
            ..Default::default()
        });
        let before = state.messages.len();

        state.apply(StateDelta {
            messages: vec![Message::assistant("a"), Message::assistant("b")],
            draft_analysis: Some("draft".to_string()),
            ..Default::default()
        });

        assert_eq!(state.messages.len(), before + 2);
        assert_eq!(state.messages[0].text(), Some("q"));
    }

    #[test]
    fn scalar_fields_overwrite() {
        let mut state = SessionState::new("q");
        state.apply(StateDelta {
            market_data: Some(json!({"data": [1]})),
            ..Default::default()
        });
        state.apply(StateDelta {
            market_data: Some(json!({"data": [2]})),
            ..Default::default()
        });
        assert_eq!(state.market_data, Some(json!({"data": [2]})));
    }

    #[test]
    fn empty_delta_changes_nothing() {
        let mut state = SessionState::new("q");
        state.apply(StateDelta {
            draft_analysis: Some("v1".to_string()),
            ..Default::default()
        });
        let snapshot = state.clone();

        state.apply(StateDelta::default());

        assert_eq!(state.messages.len(), snapshot.messages.len());
        assert_eq!(state.draft_analysis, snapshot.draft_analysis);
        assert_eq!(state.critique_cycles, snapshot.critique_cycles);
    }

    #[test]
    fn critique_flags_track_pendingness() {
        let mut state = SessionState::new("q");
        assert!(!state.reflection_pending);

        state.apply(StateDelta {
            reflection: Some("needs work".to_string()),
            critique_completed: true,
            ..Default::default()
        });
        assert!(state.reflection_pending);
        assert_eq!(state.critique_cycles, 1);

        state.apply(StateDelta {
            draft_analysis: Some("v2".to_string()),
            reflection_addressed: true,
            ..Default::default()
        });
        assert!(!state.reflection_pending);
        assert_eq!(state.critique_cycles, 1);
    }

    #[test]
    fn final_report_is_immutable_once_set() {
        let mut state = SessionState::new("q");
        state.apply(StateDelta {
            final_report: Some("the report".to_string()),
            ..Default::default()
        });
        state.apply(StateDelta {
            final_report: Some("overwrite attempt".to_string()),
            ..Default::default()
        });
        assert_eq!(state.final_report.as_deref(), Some("the report"));
        assert!(state.is_complete());
    }
}
