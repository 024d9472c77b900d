//! Loop driver: owns the canonical state and sequences the steps
//!
//! One run is a sequence of planning turns. After each turn the router picks
//! the arm: execute the requested tools and plan again, or draft and
//! critique and plan again, or stop on a final report. The driver is the
//! only place deltas are merged.

use crate::config::AgentConfig;
use crate::critic::CriticStep;
use crate::drafter::DrafterStep;
use crate::error::Result;
use crate::planner::PlannerStep;
use crate::prompts::PromptSet;
use crate::router::{Route, route};
use crate::state::{SessionState, StateDelta};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, warn};
use trend_llm::{ContentBlock, LLMProvider, Message, ToolDefinition};
use trend_tools::ToolRegistry;

/// Observer of per-step state deltas
///
/// Every delta is reported before it is merged, so an observer sees exactly
/// what each step contributed. All methods default to no-ops.
#[async_trait]
pub trait StepObserver: Send + Sync {
    /// A step produced a delta
    async fn on_step(&self, _step: &str, _delta: &StateDelta) {}

    /// The run finished
    async fn on_complete(&self, _state: &SessionState) {}
}

/// Observer that ignores everything
pub struct NoOpObserver;

#[async_trait]
impl StepObserver for NoOpObserver {}

/// Outcome of a completed run
#[derive(Debug)]
pub struct RunOutcome {
    /// Final accumulated state
    pub state: SessionState,

    /// Whether the report was forced by the planning-turn cap
    pub forced: bool,
}

impl RunOutcome {
    /// The final report, if one was produced
    pub fn report(&self) -> Option<&str> {
        self.state.final_report.as_deref()
    }
}

/// Drives the plan → act → draft → critique → revise loop
pub struct LoopDriver {
    planner: PlannerStep,
    drafter: DrafterStep,
    critic: CriticStep,
    registry: Arc<ToolRegistry>,
    max_cycles: usize,
    observer: Arc<dyn StepObserver>,
}

impl LoopDriver {
    /// Create a driver wired to one oracle provider and a tool registry
    pub fn new(
        provider: Arc<dyn LLMProvider>,
        registry: Arc<ToolRegistry>,
        config: &AgentConfig,
        prompts: &PromptSet,
    ) -> Self {
        let tool_definitions: Vec<ToolDefinition> = registry
            .list_tools()
            .iter()
            .map(|tool| ToolDefinition::new(tool.name(), tool.description(), tool.input_schema()))
            .collect();

        Self {
            planner: PlannerStep::new(
                provider.clone(),
                prompts.planner.clone(),
                config.planner_model.clone(),
                tool_definitions,
            ),
            drafter: DrafterStep::new(
                provider.clone(),
                prompts.drafter.clone(),
                config.drafter_model.clone(),
            ),
            critic: CriticStep::new(
                provider,
                prompts.critic.clone(),
                config.critic_model.clone(),
            ),
            registry,
            max_cycles: config.max_cycles,
            observer: Arc::new(NoOpObserver),
        }
    }

    /// Attach a step observer
    pub fn with_observer(mut self, observer: Arc<dyn StepObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Run the loop to completion for one query
    pub async fn run(&self, query: impl Into<String>) -> Result<RunOutcome> {
        let mut state = SessionState::new(query);
        let mut forced = false;

        for cycle in 1..=self.max_cycles {
            info!(cycle, max = self.max_cycles, "planning turn");

            let output = self.planner.run(&state).await?;
            self.observer.on_step("planner", &output.delta).await;
            state.apply(output.delta);

            match route(&state) {
                Route::Finish => {
                    debug!("final report produced, stopping");
                    break;
                }
                Route::RunTools => {
                    let delta = self.execute_tools(&state).await;
                    self.observer.on_step("tools", &delta).await;
                    state.apply(delta);
                }
                Route::Draft => {
                    let delta = self.drafter.run(&state).await?;
                    self.observer.on_step("drafter", &delta).await;
                    state.apply(delta);

                    let delta = self.critic.run(&state).await?;
                    self.observer.on_step("critic", &delta).await;
                    state.apply(delta);
                }
            }
        }

        if !state.is_complete() {
            warn!(
                max_cycles = self.max_cycles,
                "planning-turn cap reached without a report, forcing best effort"
            );
            forced = true;
            let report = best_effort_report(&state);
            let delta = StateDelta {
                final_report: Some(report),
                ..Default::default()
            };
            self.observer.on_step("circuit_breaker", &delta).await;
            state.apply(delta);
        }

        self.observer.on_complete(&state).await;
        Ok(RunOutcome { state, forced })
    }

    /// Execute the tool calls of the latest assistant turn, in request order
    async fn execute_tools(&self, state: &SessionState) -> StateDelta {
        let mut messages = Vec::new();

        let tool_uses: Vec<ContentBlock> = state
            .messages
            .last()
            .map(|m| m.tool_uses().into_iter().cloned().collect())
            .unwrap_or_default();

        for block in tool_uses {
            let ContentBlock::ToolUse { id, name, input } = block else {
                continue;
            };

            let Some(tool) = self.registry.get(&name) else {
                warn!(tool = %name, "requested tool is not registered");
                messages.push(Message::tool_error(
                    id,
                    name.clone(),
                    format!("Tool not found: {name}"),
                ));
                continue;
            };

            info!(tool = %name, "executing tool");
            match tool.execute(input).await {
                Ok(result) => {
                    let content =
                        serde_json::to_string(&result).unwrap_or_else(|_| result.to_string());
                    messages.push(Message::tool_result(id, name, content));
                }
                Err(e) => {
                    warn!(tool = %name, error = %e, "tool rejected its parameters");
                    messages.push(Message::tool_error(id, name, e.to_string()));
                }
            }
        }

        StateDelta {
            messages,
            ..Default::default()
        }
    }
}

/// Best-effort report when the planning-turn cap is hit
fn best_effort_report(state: &SessionState) -> String {
    match &state.draft_analysis {
        Some(draft) => format!(
            "NOTE: the analysis loop hit its turn limit before the planner signed off. \
             The latest draft follows.\n\n{draft}"
        ),
        None => "The analysis loop hit its turn limit before any draft was produced. \
                 No report is available."
            .to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{ScriptedProvider, StaticTool, text_response, tool_call_response};
    use serde_json::json;
    use std::sync::Mutex;

    fn registry_with_market_tool() -> (Arc<ToolRegistry>, Arc<StaticTool>) {
        let tool = Arc::new(StaticTool::new(
            "get_ohlcv_data",
            json!({"ticker": "BTC-USD", "data": [{"close": 97000.0}]}),
        ));
        let registry = Arc::new(ToolRegistry::new());
        registry.register(tool.clone());
        (registry, tool)
    }

    fn driver(provider: Arc<ScriptedProvider>, registry: Arc<ToolRegistry>) -> LoopDriver {
        LoopDriver::new(
            provider,
            registry,
            &AgentConfig::default(),
            &PromptSet::builtin(),
        )
    }

    #[tokio::test]
    async fn happy_path_tools_draft_critique_finish() {
        // Scripted run: plan (tools) → plan (draft) → draft → critique →
        // plan (final report).
        let provider = Arc::new(ScriptedProvider::new(vec![
            tool_call_response(vec![("c1", "get_ohlcv_data", json!({}))]),
            text_response("data collected, moving to analysis"),
            text_response("draft: bitcoin trends upward"),
            text_response("critique: cite the closing price"),
            text_response("Final report: bitcoin closed at 97000 and trends upward."),
        ]));
        let (registry, tool) = registry_with_market_tool();

        let outcome = driver(provider.clone(), registry).run("btc trend").await.unwrap();

        assert!(!outcome.forced);
        assert_eq!(tool.call_count(), 1);
        assert_eq!(provider.call_count(), 5);
        assert_eq!(
            outcome.report(),
            Some("Final report: bitcoin closed at 97000 and trends upward.")
        );
        assert_eq!(outcome.state.critique_cycles, 1);
        assert_eq!(
            outcome.state.market_data.as_ref().unwrap()["ticker"],
            "BTC-USD"
        );
        assert_eq!(
            outcome.state.draft_analysis.as_deref(),
            Some("draft: bitcoin trends upward")
        );
    }

    #[tokio::test]
    async fn revise_directive_drives_a_second_drafting_pass() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            text_response("starting analysis"),
            text_response("draft v1"),
            text_response("critique: too thin"),
            text_response("REVISE: expand on the critique"),
            text_response("draft v2"),
            text_response("critique: better"),
            text_response("Final report: done."),
        ]));
        let registry = Arc::new(ToolRegistry::new());

        let outcome = driver(provider, registry).run("btc trend").await.unwrap();

        assert!(!outcome.forced);
        assert_eq!(outcome.state.critique_cycles, 2);
        assert_eq!(outcome.state.draft_analysis.as_deref(), Some("draft v2"));
        assert_eq!(outcome.report(), Some("Final report: done."));
    }

    #[tokio::test]
    async fn turn_cap_forces_best_effort_report() {
        // The planner keeps asking for revisions and never signs off.
        let provider = Arc::new(ScriptedProvider::new(vec![
            text_response("starting analysis"),
            text_response("draft v1"),
            text_response("critique: weak"),
            text_response("REVISE: again"),
            text_response("draft v2"),
            text_response("critique: still weak"),
            text_response("REVISE: again"),
            text_response("draft v3"),
            text_response("critique: no"),
        ]));
        let registry = Arc::new(ToolRegistry::new());

        let config = AgentConfig::default().with_max_cycles(3);
        let driver = LoopDriver::new(provider, registry, &config, &PromptSet::builtin());

        let outcome = driver.run("btc trend").await.unwrap();

        assert!(outcome.forced);
        let report = outcome.report().unwrap();
        assert!(report.contains("turn limit"));
        assert!(report.contains("draft v3"));
    }

    #[tokio::test]
    async fn failed_indicator_payload_never_reaches_state() {
        let market = Arc::new(StaticTool::new(
            "get_ohlcv_data",
            json!({"ticker": "BTC-USD", "data": [{"close": 96000.0}, {"close": 97000.0}]}),
        ));
        let indicators = Arc::new(StaticTool::new(
            "calculate_technical_indicators",
            json!({"error": "No price history available for BTC-USD over 1y"}),
        ));
        let registry = Arc::new(ToolRegistry::new());
        registry.register(market);
        registry.register(indicators);

        let provider = Arc::new(ScriptedProvider::new(vec![
            tool_call_response(vec![
                ("c1", "get_ohlcv_data", json!({})),
                ("c2", "calculate_technical_indicators", json!({})),
            ]),
            text_response("working from raw prices"),
            text_response("draft from raw rows"),
            text_response("critique"),
            text_response("Final report."),
        ]));

        let outcome = driver(provider, registry).run("btc trend").await.unwrap();

        // The error payload stays in the transcript but never writes state;
        // the drafter worked from the raw market data instead.
        assert!(outcome.state.technical_analysis.is_none());
        assert!(outcome.state.market_data.is_some());
        assert_eq!(
            outcome.state.draft_analysis.as_deref(),
            Some("draft from raw rows")
        );
    }

    #[tokio::test]
    async fn unknown_tool_becomes_error_result() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            tool_call_response(vec![("c1", "nonexistent_tool", json!({}))]),
            text_response("proceeding without that data"),
            text_response("draft"),
            text_response("critique"),
            text_response("Final report."),
        ]));
        let registry = Arc::new(ToolRegistry::new());

        let outcome = driver(provider, registry).run("btc trend").await.unwrap();

        let error_turn = outcome
            .state
            .messages
            .iter()
            .find(|m| m.is_tool_result())
            .unwrap();
        match error_turn.tool_results()[0] {
            ContentBlock::ToolResult { is_error, content, .. } => {
                assert_eq!(*is_error, Some(true));
                assert!(content.contains("Tool not found"));
            }
            _ => panic!("expected tool result"),
        }
        // The failed call wrote nothing into state.
        assert!(outcome.state.market_data.is_none());
    }

    #[tokio::test]
    async fn observer_sees_every_delta_before_merge() {
        struct RecordingObserver {
            steps: Mutex<Vec<String>>,
        }

        #[async_trait]
        impl StepObserver for RecordingObserver {
            async fn on_step(&self, step: &str, _delta: &StateDelta) {
                self.steps
                    .lock()
                    .expect("observer lock poisoned")
                    .push(step.to_string());
            }
        }

        let provider = Arc::new(ScriptedProvider::new(vec![
            text_response("starting"),
            text_response("draft"),
            text_response("critique"),
            text_response("Final report."),
        ]));
        let observer = Arc::new(RecordingObserver {
            steps: Mutex::new(Vec::new()),
        });
        let registry = Arc::new(ToolRegistry::new());

        let driver = driver(provider, registry).with_observer(observer.clone());
        driver.run("btc trend").await.unwrap();

        let steps = observer.steps.lock().unwrap().clone();
        assert_eq!(steps, vec!["planner", "drafter", "critic", "planner"]);
    }

    #[tokio::test]
    async fn multiple_tool_calls_execute_in_request_order() {
        let market = Arc::new(StaticTool::new("get_ohlcv_data", json!({"data": []})));
        let search = Arc::new(StaticTool::new("web_search", json!([{"title": "t"}])));
        let registry = Arc::new(ToolRegistry::new());
        registry.register(market.clone());
        registry.register(search.clone());

        let provider = Arc::new(ScriptedProvider::new(vec![
            tool_call_response(vec![
                ("c1", "get_ohlcv_data", json!({})),
                ("c2", "web_search", json!({"query": "btc"})),
            ]),
            text_response("got both"),
            text_response("draft"),
            text_response("critique"),
            text_response("Final report."),
        ]));

        let outcome = driver(provider, registry).run("btc trend").await.unwrap();

        assert_eq!(market.call_count(), 1);
        assert_eq!(search.call_count(), 1);

        let names: Vec<_> = outcome
            .state
            .messages
            .iter()
            .flat_map(|m| m.tool_results())
            .map(|b| match b {
                ContentBlock::ToolResult { name, .. } => name.clone(),
                _ => unreachable!(),
            })
            .collect();
        assert_eq!(names, vec!["get_ohlcv_data", "web_search"]);
    }
}
