//! Yahoo Finance API client for OHLCV history

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use yahoo_finance_api as yahoo;

/// Errors from the Yahoo Finance client
///
/// Callers fold these into `{"error": ...}` tool payloads; the type exists
/// so the client itself stays payload-agnostic.
#[derive(Debug, thiserror::Error)]
pub enum YahooClientError {
    #[error("Yahoo Finance error: {0}")]
    Api(String),

    #[error("Invalid period: {0}")]
    InvalidPeriod(String),
}

/// A single OHLCV bar
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OhlcvBar {
    pub date: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

/// Yahoo Finance API client
///
/// Stateless; the underlying connector is rebuilt per request, matching how
/// the yahoo_finance_api crate is designed to be used.
pub struct YahooFinanceClient {}

impl YahooFinanceClient {
    /// Create a new Yahoo Finance client
    pub fn new() -> Self {
        Self {}
    }

    /// Fetch OHLCV history for a ticker over a named period
    ///
    /// `period` uses the yfinance-style vocabulary ("30d", "1mo", "1y",
    /// "ytd", "max", ...); `interval` is passed through to Yahoo ("1d",
    /// "1wk", "1mo").
    pub async fn get_ohlcv(
        &self,
        ticker: &str,
        period: &str,
        interval: &str,
    ) -> Result<Vec<OhlcvBar>, YahooClientError> {
        let end = Utc::now();
        let start = period_start(period, end)?;

        let provider =
            yahoo::YahooConnector::new().map_err(|e| YahooClientError::Api(e.to_string()))?;

        // Convert chrono DateTime to time OffsetDateTime
        let start_odt = OffsetDateTime::from_unix_timestamp(start.timestamp())
            .map_err(|e| YahooClientError::Api(format!("Invalid start timestamp: {e}")))?;
        let end_odt = OffsetDateTime::from_unix_timestamp(end.timestamp())
            .map_err(|e| YahooClientError::Api(format!("Invalid end timestamp: {e}")))?;

        let response = provider
            .get_quote_history_interval(ticker, start_odt, end_odt, interval)
            .await
            .map_err(|e| YahooClientError::Api(e.to_string()))?;

        let quotes = response
            .quotes()
            .map_err(|e| YahooClientError::Api(e.to_string()))?;

        Ok(quotes
            .iter()
            .map(|q| OhlcvBar {
                date: DateTime::from_timestamp(q.timestamp as i64, 0).unwrap_or_else(Utc::now),
                open: q.open,
                high: q.high,
                low: q.low,
                close: q.close,
                volume: q.volume,
            })
            .collect())
    }
}

impl Default for YahooFinanceClient {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for YahooFinanceClient {
    fn clone(&self) -> Self {
        Self::new()
    }
}

/// Resolve a named period to its start timestamp
fn period_start(period: &str, end: DateTime<Utc>) -> Result<DateTime<Utc>, YahooClientError> {
    let start = match period {
        "1d" => end - chrono::Duration::days(1),
        "5d" => end - chrono::Duration::days(5),
        "7d" => end - chrono::Duration::days(7),
        "30d" | "1mo" => end - chrono::Duration::days(30),
        "60d" => end - chrono::Duration::days(60),
        "90d" | "3mo" => end - chrono::Duration::days(90),
        "6mo" => end - chrono::Duration::days(180),
        "1y" => end - chrono::Duration::days(365),
        "2y" => end - chrono::Duration::days(730),
        "5y" => end - chrono::Duration::days(1825),
        "10y" => end - chrono::Duration::days(3650),
        "ytd" => {
            let year = end.year();
            chrono::NaiveDate::from_ymd_opt(year, 1, 1)
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|dt| dt.and_utc())
                .ok_or_else(|| YahooClientError::InvalidPeriod(period.to_string()))?
        }
        "max" => end - chrono::Duration::days(36500), // ~100 years
        _ => return Err(YahooClientError::InvalidPeriod(period.to_string())),
    };
    Ok(start)
}
