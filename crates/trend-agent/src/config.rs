//! Run configuration

use crate::error::{AgentError, Result};
use std::path::PathBuf;

/// Configuration for one agent run
///
/// Model selection is per role: the planner and drafter use the stronger
/// model, the critic runs on a cheaper one.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Model for the planning step
    pub planner_model: String,

    /// Model for the drafting step
    pub drafter_model: String,

    /// Model for the critique step
    pub critic_model: String,

    /// Directory holding planner.md / drafter.md / critic.md
    pub prompts_dir: PathBuf,

    /// Maximum planning turns before forcing a best-effort report
    pub max_cycles: usize,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            planner_model: "gpt-4o".to_string(),
            drafter_model: "gpt-4o".to_string(),
            critic_model: "gpt-4o-mini".to_string(),
            prompts_dir: PathBuf::from("prompts"),
            max_cycles: 12,
        }
    }
}

impl AgentConfig {
    /// Build a default config after verifying required secrets
    ///
    /// Both API keys are checked up front, before any session state exists;
    /// a missing key aborts the run.
    pub fn from_env() -> Result<Self> {
        for key in ["OPENAI_API_KEY", "SERPAPI_API_KEY"] {
            if std::env::var(key).is_err() {
                return Err(AgentError::Config(format!(
                    "{key} environment variable not set"
                )));
            }
        }
        Ok(Self::default())
    }

    /// Set the model used by all three roles
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        let model = model.into();
        self.planner_model = model.clone();
        self.drafter_model = model.clone();
        self.critic_model = model;
        self
    }

    /// Set the critic's model
    pub fn with_critic_model(mut self, model: impl Into<String>) -> Self {
        self.critic_model = model.into();
        self
    }

    /// Set the prompts directory
    pub fn with_prompts_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.prompts_dir = dir.into();
        self
    }

    /// Set the planning-turn cap
    pub fn with_max_cycles(mut self, max_cycles: usize) -> Self {
        self.max_cycles = max_cycles;
        self
    }
}
