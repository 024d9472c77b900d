//! Command-line interface for the trend-analysis agent

use async_trait::async_trait;
use clap::Parser;
use std::io::Write;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use trend_agent::{
    AgentConfig, LoopDriver, PromptSet, SessionState, StateDelta, StepObserver,
};
use trend_llm::OpenAIProvider;
use trend_tools::{IndicatorTool, MarketDataTool, ToolRegistry, WebSearchTool};

#[derive(Parser, Debug)]
#[command(name = "trend-agent")]
#[command(about = "LLM-driven bitcoin trend-analysis research agent", long_about = None)]
struct Args {
    /// Research question (prompted for when omitted)
    query: Option<String>,

    /// Directory holding planner.md / drafter.md / critic.md
    #[arg(long, default_value = "prompts")]
    prompts_dir: String,

    /// Maximum planning turns before forcing a best-effort report
    #[arg(long)]
    max_cycles: Option<usize>,

    /// Model for the planner and drafter (the critic keeps its default)
    #[arg(long)]
    model: Option<String>,
}

/// Observer that streams each step's delta to stdout
struct PrintObserver;

#[async_trait]
impl StepObserver for PrintObserver {
    async fn on_step(&self, step: &str, delta: &StateDelta) {
        let rendered = serde_json::to_string_pretty(delta)
            .unwrap_or_else(|_| "<unserializable delta>".to_string());
        println!("--- {step} ---");
        println!("{rendered}");
    }
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn read_query_from_stdin() -> anyhow::Result<String> {
    print!("Enter your research question: ");
    std::io::stdout().flush()?;
    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    let query = line.trim().to_string();
    if query.is_empty() {
        anyhow::bail!("no query provided");
    }
    Ok(query)
}

fn print_outcome(state: &SessionState, forced: bool) {
    match &state.final_report {
        Some(report) => {
            if forced {
                println!("\n=== Best-effort report (turn limit reached) ===\n");
            } else {
                println!("\n=== Final report ===\n");
            }
            println!("{report}");
        }
        None => {
            println!("\nNo report was produced. Accumulated state:\n");
            println!(
                "{}",
                serde_json::to_string_pretty(state)
                    .unwrap_or_else(|_| "<unserializable state>".to_string())
            );
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let args = Args::parse();

    // Secrets are verified before any session state exists.
    let mut config = AgentConfig::from_env()?.with_prompts_dir(&args.prompts_dir);
    if let Some(max_cycles) = args.max_cycles {
        config = config.with_max_cycles(max_cycles);
    }
    if let Some(model) = &args.model {
        config.planner_model = model.clone();
        config.drafter_model = model.clone();
    }

    let query = match args.query {
        Some(q) => q,
        None => read_query_from_stdin()?,
    };

    info!(query = %query, "starting research run");

    let provider = Arc::new(OpenAIProvider::from_env()?);

    let registry = Arc::new(ToolRegistry::new());
    registry.register(Arc::new(MarketDataTool::new()));
    registry.register(Arc::new(IndicatorTool::new()));
    registry.register(Arc::new(WebSearchTool::from_env()?));

    let prompts = PromptSet::load(&config.prompts_dir);

    let driver = LoopDriver::new(provider, registry, &config, &prompts)
        .with_observer(Arc::new(PrintObserver));

    let outcome = driver.run(query).await?;
    print_outcome(&outcome.state, outcome.forced);

    Ok(())
}
