//! Orchestration core for the trend-analysis agent
//!
//! Implements the cyclic plan → act → draft → critique → revise loop over a
//! shared [`SessionState`]. Components receive a read-only view of the state
//! and return a [`StateDelta`]; the [`LoopDriver`] is the sole owner of the
//! canonical state and the only place deltas are merged.

pub mod config;
pub mod critic;
pub mod drafter;
pub mod driver;
pub mod error;
pub mod planner;
pub mod prompts;
pub mod router;
pub mod state;

#[cfg(test)]
pub(crate) mod testing;

pub use config::AgentConfig;
pub use critic::CriticStep;
pub use drafter::DrafterStep;
pub use driver::{LoopDriver, NoOpObserver, RunOutcome, StepObserver};
pub use error::{AgentError, Result};
pub use planner::{PlannerDecision, PlannerOutput, PlannerStep};
pub use prompts::PromptSet;
pub use router::{Route, route};
pub use state::{SessionState, StateDelta};
