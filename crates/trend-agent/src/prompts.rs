//! Prompt loading with built-in fallbacks

use std::path::Path;
use tracing::{debug, warn};

const DEFAULT_PLANNER_PROMPT: &str = "You are a research planner for financial trend analysis. \
     Decide which data is still missing and request it with the available tools. \
     When the analysis has been drafted and critiqued, either reply starting with \
     'REVISE:' to request another drafting pass or write the final report.";

const DEFAULT_DRAFTER_PROMPT: &str = "You are a market analyst. Write a clear, structured trend \
     analysis from the data brief you are given. Cover price action, technical \
     indicators, and sentiment, and state your confidence.";

const DEFAULT_CRITIC_PROMPT: &str = "You are a critical reviewer of financial analysis. Point out \
     unsupported claims, missing evidence, and unclear reasoning in the draft. \
     Be specific and concise.";

/// System prompts for the three oracle-backed steps
///
/// Loaded by name from a prompts directory; a missing or unreadable file
/// logs a warning and falls back to a built-in minimal instruction.
#[derive(Debug, Clone)]
pub struct PromptSet {
    pub planner: String,
    pub drafter: String,
    pub critic: String,
}

impl PromptSet {
    /// Load prompts from a directory containing planner.md, drafter.md, critic.md
    pub fn load(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            planner: load_or_default(dir, "planner.md", DEFAULT_PLANNER_PROMPT),
            drafter: load_or_default(dir, "drafter.md", DEFAULT_DRAFTER_PROMPT),
            critic: load_or_default(dir, "critic.md", DEFAULT_CRITIC_PROMPT),
        }
    }

    /// The built-in prompt set, used when no prompts directory exists
    pub fn builtin() -> Self {
        Self {
            planner: DEFAULT_PLANNER_PROMPT.to_string(),
            drafter: DEFAULT_DRAFTER_PROMPT.to_string(),
            critic: DEFAULT_CRITIC_PROMPT.to_string(),
        }
    }
}

fn load_or_default(dir: &Path, name: &str, fallback: &str) -> String {
    let path = dir.join(name);
    match std::fs::read_to_string(&path) {
        Ok(content) if !content.trim().is_empty() => {
            debug!(path = %path.display(), "loaded prompt");
            content
        }
        Ok(_) => {
            warn!(path = %path.display(), "prompt file is empty, using built-in default");
            fallback.to_string()
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to read prompt file, using built-in default");
            fallback.to_string()
        }
    }
}
