//! Critique step: review the current draft

use crate::error::Result;
use crate::state::{SessionState, StateDelta};
use std::sync::Arc;
use tracing::{debug, warn};
use trend_llm::{CompletionRequest, LLMProvider, Message};

/// Reflection written when there is no draft to critique
///
/// The loop shape makes this unreachable in practice, but the step still
/// has to produce something sensible without an oracle call.
const MISSING_DRAFT_REFLECTION: &str =
    "No draft analysis was available to critique. Produce a draft before requesting review.";

/// The critique step
///
/// One oracle call with only the draft as context; the transcript is not
/// shared with the critic so the review stays independent.
pub struct CriticStep {
    provider: Arc<dyn LLMProvider>,
    prompt: String,
    model: String,
}

impl CriticStep {
    pub fn new(
        provider: Arc<dyn LLMProvider>,
        prompt: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            prompt: prompt.into(),
            model: model.into(),
        }
    }

    /// Run one critique pass
    pub async fn run(&self, state: &SessionState) -> Result<StateDelta> {
        let Some(draft) = &state.draft_analysis else {
            warn!("critic invoked without a draft, writing static diagnostic");
            return Ok(StateDelta {
                reflection: Some(MISSING_DRAFT_REFLECTION.to_string()),
                ..Default::default()
            });
        };

        debug!(cycle = state.critique_cycles + 1, "critiquing draft");

        let request = CompletionRequest::builder(&self.model)
            .system(self.prompt.clone())
            .add_message(Message::user(format!(
                "Review this trend analysis draft:\n\n{draft}"
            )))
            .build();

        let response = self.provider.complete(request).await?;
        let reflection = response.message.text().unwrap_or_default().to_string();

        Ok(StateDelta {
            messages: vec![response.message],
            reflection: Some(reflection),
            critique_completed: true,
            ..Default::default()
        })
    }
}
