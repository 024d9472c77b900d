//! Tool for calculating technical indicators

use crate::tool::Tool;
use crate::yahoo::YahooFinanceClient;
use crate::{Result, ToolError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use ta::{
    Next,
    indicators::{ExponentialMovingAverage, RelativeStrengthIndex},
};
use tracing::debug;

/// Tool for computing a technical indicator summary from price history
pub struct IndicatorTool {
    yahoo_client: YahooFinanceClient,
}

#[derive(Debug, Deserialize)]
struct IndicatorParams {
    #[serde(default = "default_ticker")]
    ticker: String,
    #[serde(default = "default_period")]
    period: String,
}

fn default_ticker() -> String {
    "BTC-USD".to_string()
}

fn default_period() -> String {
    "1y".to_string()
}

/// Summary of technical indicators at the latest close
///
/// Indicators that cannot be computed from the available history are `None`
/// and serialize as JSON `null`, never as a sentinel value.
#[derive(Debug, Clone, Serialize)]
pub struct IndicatorSummary {
    pub ticker: String,
    pub last_close: f64,
    pub rsi_14: Option<f64>,
    pub ema_50: Option<f64>,
    pub ema_200: Option<f64>,
    pub macd: Option<f64>,
    pub macd_signal: Option<f64>,
    pub macd_histogram: Option<f64>,
}

impl IndicatorTool {
    /// Create a new indicator tool
    pub fn new() -> Self {
        Self {
            yahoo_client: YahooFinanceClient::new(),
        }
    }

    async fn calculate(&self, params: IndicatorParams) -> Value {
        let ticker = params.ticker.to_uppercase();
        debug!(ticker = %ticker, period = %params.period, "computing indicator summary");

        let bars = match self
            .yahoo_client
            .get_ohlcv(&ticker, &params.period, "1d")
            .await
        {
            Ok(bars) => bars,
            Err(e) => return json!({ "error": e.to_string() }),
        };

        if bars.is_empty() {
            return json!({
                "error": format!("No price history available for {ticker} over {}", params.period)
            });
        }

        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        match summarize_indicators(&ticker, &closes) {
            Ok(summary) => json!(summary),
            Err(e) => json!({ "error": e }),
        }
    }
}

impl Default for IndicatorTool {
    fn default() -> Self {
        Self::new()
    }
}

/// Compute the indicator summary over a series of closing prices
///
/// RSI(14) needs more than 14 closes to be meaningful; the EMAs need at
/// least their own period of history; the MACD family (12/26/9) needs the
/// slow EMA plus the signal window to have warmed up.
fn summarize_indicators(ticker: &str, closes: &[f64]) -> std::result::Result<IndicatorSummary, String> {
    let last_close = *closes.last().ok_or_else(|| "Empty close series".to_string())?;

    let rsi_14 = if closes.len() > 14 {
        let mut rsi = RelativeStrengthIndex::new(14).map_err(|e| e.to_string())?;
        Some(closes.iter().fold(0.0, |_, &c| rsi.next(c)))
    } else {
        None
    };

    let ema_50 = final_ema(closes, 50)?;
    let ema_200 = final_ema(closes, 200)?;

    // MACD(12, 26, 9) computed as EMA differences; the ta crate's bundled
    // MACD type does not expose the warmed-up signal line directly.
    let (macd, macd_signal, macd_histogram) = if closes.len() >= 35 {
        let mut ema12 = ExponentialMovingAverage::new(12).map_err(|e| e.to_string())?;
        let mut ema26 = ExponentialMovingAverage::new(26).map_err(|e| e.to_string())?;
        let mut signal = ExponentialMovingAverage::new(9).map_err(|e| e.to_string())?;

        let mut macd_value = 0.0;
        let mut signal_value = 0.0;
        for &close in closes {
            macd_value = ema12.next(close) - ema26.next(close);
            signal_value = signal.next(macd_value);
        }

        (
            Some(macd_value),
            Some(signal_value),
            Some(macd_value - signal_value),
        )
    } else {
        (None, None, None)
    };

    Ok(IndicatorSummary {
        ticker: ticker.to_string(),
        last_close,
        rsi_14,
        ema_50,
        ema_200,
        macd,
        macd_signal,
        macd_histogram,
    })
}

/// Final EMA value over the series, or None with insufficient history
fn final_ema(closes: &[f64], period: usize) -> std::result::Result<Option<f64>, String> {
    if closes.len() < period {
        return Ok(None);
    }
    let mut ema = ExponentialMovingAverage::new(period).map_err(|e| e.to_string())?;
    Ok(Some(closes.iter().fold(0.0, |_, &c| ema.next(c))))
}

#[async_trait]
impl Tool for IndicatorTool {
    async fn execute(&self, params: Value) -> Result<Value> {
        let params: IndicatorParams = serde_json::from_value(params)
            .map_err(|e| ToolError::InvalidParameters(e.to_string()))?;

        Ok(self.calculate(params).await)
    }

    fn name(&self) -> &'static str {
        "calculate_technical_indicators"
    }

    fn description(&self) -> &'static str {
        "Compute a technical indicator summary (RSI-14, EMA-50, EMA-200, MACD 12/26/9) \
         from a ticker's daily closing prices. Defaults to BTC-USD over one year."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "ticker": {
                    "type": "string",
                    "description": "Ticker symbol (e.g., 'BTC-USD')",
                    "default": "BTC-USD"
                },
                "period": {
                    "type": "string",
                    "description": "Time range of daily history to compute from",
                    "enum": ["3mo", "6mo", "1y", "2y", "5y", "ytd", "max"],
                    "default": "1y"
                }
            }
        })
    }
}
