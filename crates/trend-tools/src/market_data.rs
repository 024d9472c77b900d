//! Tool for fetching raw OHLCV market data

use crate::tool::Tool;
use crate::yahoo::YahooFinanceClient;
use crate::{Result, ToolError};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::debug;

/// Tool for fetching OHLCV price history
///
/// Returns the raw bars the drafter can fall back on when no indicator
/// summary is available.
pub struct MarketDataTool {
    yahoo_client: YahooFinanceClient,
}

#[derive(Debug, Deserialize)]
struct MarketDataParams {
    #[serde(default = "default_ticker")]
    ticker: String,
    #[serde(default = "default_period")]
    period: String,
    #[serde(default = "default_interval")]
    interval: String,
}

fn default_ticker() -> String {
    "BTC-USD".to_string()
}

fn default_period() -> String {
    "30d".to_string()
}

fn default_interval() -> String {
    "1d".to_string()
}

impl MarketDataTool {
    /// Create a new market data tool
    pub fn new() -> Self {
        Self {
            yahoo_client: YahooFinanceClient::new(),
        }
    }

    async fn fetch(&self, params: MarketDataParams) -> Value {
        let ticker = params.ticker.to_uppercase();
        debug!(
            ticker = %ticker,
            period = %params.period,
            interval = %params.interval,
            "fetching OHLCV history"
        );

        let bars = match self
            .yahoo_client
            .get_ohlcv(&ticker, &params.period, &params.interval)
            .await
        {
            Ok(bars) => bars,
            Err(e) => return json!({ "error": e.to_string() }),
        };

        if bars.is_empty() {
            return json!({
                "error": format!("No OHLCV data available for {ticker} over {}", params.period)
            });
        }

        let data: Vec<_> = bars
            .iter()
            .map(|b| {
                json!({
                    "date": b.date.to_rfc3339(),
                    "open": b.open,
                    "high": b.high,
                    "low": b.low,
                    "close": b.close,
                    "volume": b.volume,
                })
            })
            .collect();

        json!({
            "ticker": ticker,
            "period": params.period,
            "interval": params.interval,
            "data": data,
        })
    }
}

impl Default for MarketDataTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for MarketDataTool {
    async fn execute(&self, params: Value) -> Result<Value> {
        let params: MarketDataParams = serde_json::from_value(params)
            .map_err(|e| ToolError::InvalidParameters(e.to_string()))?;

        Ok(self.fetch(params).await)
    }

    fn name(&self) -> &'static str {
        "get_ohlcv_data"
    }

    fn description(&self) -> &'static str {
        "Fetch historical OHLCV (open, high, low, close, volume) price data for a ticker. \
         Defaults to BTC-USD over the last 30 days at daily resolution."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "ticker": {
                    "type": "string",
                    "description": "Ticker symbol (e.g., 'BTC-USD', 'ETH-USD')",
                    "default": "BTC-USD"
                },
                "period": {
                    "type": "string",
                    "description": "Time range for historical data",
                    "enum": ["1d", "5d", "7d", "30d", "1mo", "3mo", "6mo", "1y", "2y", "5y", "ytd", "max"],
                    "default": "30d"
                },
                "interval": {
                    "type": "string",
                    "description": "Bar resolution",
                    "enum": ["1d", "1wk", "1mo"],
                    "default": "1d"
                }
            }
        })
    }
}
