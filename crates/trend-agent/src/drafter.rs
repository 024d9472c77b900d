//! Drafting step: turn collected data into a written analysis

use crate::error::Result;
use crate::state::{SessionState, StateDelta};
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;
use trend_llm::{CompletionRequest, LLMProvider, Message};

/// The drafting step
///
/// Formats whatever data the state holds into a single textual brief and
/// asks the oracle for an analysis. Never fails on missing data; the brief
/// says so explicitly instead.
pub struct DrafterStep {
    provider: Arc<dyn LLMProvider>,
    prompt: String,
    model: String,
}

impl DrafterStep {
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

    /// Run one drafting pass
    pub async fn run(&self, state: &SessionState) -> Result<StateDelta> {
        let brief = format_brief(state);
        debug!(revising = state.reflection_pending, "drafting analysis");

        let request = CompletionRequest::builder(&self.model)
            .system(self.prompt.clone())
            .add_message(Message::user(brief))
            .build();

        let response = self.provider.complete(request).await?;
        let draft = response.message.text().unwrap_or_default().to_string();

        Ok(StateDelta {
            messages: vec![response.message],
            draft_analysis: Some(draft),
            reflection_addressed: state.reflection_pending,
            ..Default::default()
        })
    }
}

/// Format the data brief for the oracle
///
/// Indicators first; when absent, the last five raw OHLCV rows stand in;
/// when neither exists the brief says so. A pending reflection turns the
/// brief into a revision request carrying the prior draft and the critique.
fn format_brief(state: &SessionState) -> String {
    let mut parts = vec![format!("Research question: {}", state.query)];

    match &state.technical_analysis {
        Some(indicators) => {
            parts.push(format!(
                "Technical indicators:\n{}",
                serde_json::to_string_pretty(indicators).unwrap_or_else(|_| indicators.to_string())
            ));
        }
        None => match last_rows(state.market_data.as_ref(), 5) {
            Some(rows) => {
                parts.push(format!(
                    "No indicator summary available. Most recent OHLCV rows:\n{}",
                    serde_json::to_string_pretty(&rows).unwrap_or_default()
                ));
            }
            None => parts.push("Price data: no data available.".to_string()),
        },
    }

    match &state.sentiment_analysis {
        Some(results) => {
            parts.push(format!(
                "Search results:\n{}",
                serde_json::to_string_pretty(results).unwrap_or_else(|_| results.to_string())
            ));
        }
        None => parts.push("Search results: no data available.".to_string()),
    }

    if state.reflection_pending {
        if let (Some(draft), Some(reflection)) = (&state.draft_analysis, &state.reflection) {
            parts.push(format!(
                "Your previous draft:\n{draft}\n\nA reviewer raised these points:\n{reflection}\n\n\
                 Revise the analysis to address the critique."
            ));
        }
    }

    parts.join("\n\n")
}

/// Last `n` rows of the market-data payload, if any
fn last_rows(market_data: Option<&Value>, n: usize) -> Option<Vec<Value>> {
    let rows = market_data?.get("data")?.as_array()?;
    if rows.is_empty() {
        return None;
    }
    Some(rows[rows.len().saturating_sub(n)..].to_vec())
}
