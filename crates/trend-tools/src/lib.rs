//! Tool layer for the trend-analysis agent
//!
//! Defines the [`Tool`] trait and [`ToolRegistry`], plus the three concrete
//! tools the planner can request: OHLCV market data, technical indicators,
//! and web search.
//!
//! Tools report expected failures (network errors, empty data, bad upstream
//! responses) as tagged JSON payloads (`{"error": "..."}`) returned as `Ok`,
//! so the planner can see and reason about them in the transcript. Only
//! parameter deserialization failures surface as `Err`.

pub mod error;
pub mod market_data;
pub mod registry;
pub mod search;
pub mod technical;
pub mod tool;
pub mod yahoo;

pub use error::{Result, ToolError};
pub use market_data::MarketDataTool;
pub use registry::ToolRegistry;
pub use search::WebSearchTool;
pub use technical::IndicatorTool;
pub use tool::Tool;
