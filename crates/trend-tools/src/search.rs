//! Tool for web search via SerpAPI

use crate::tool::Tool;
use crate::{Result, ToolError};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::debug;

const SERPAPI_ENDPOINT: &str = "https://serpapi.com/search.json";

/// Tool for searching the web for qualitative market signals
///
/// Queries SerpAPI's Google endpoint, preferring organic results and falling
/// back to news results. All failure modes come back as `[{"error": ...}]`
/// payloads so the planner can see them in the transcript.
pub struct WebSearchTool {
    client: Client,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct SearchParams {
    query: String,
    #[serde(default = "default_max_results")]
    max_results: usize,
}

fn default_max_results() -> usize {
    5
}

#[derive(Debug, Deserialize)]
struct SerpApiResponse {
    #[serde(default)]
    organic_results: Vec<SerpApiResult>,
    #[serde(default)]
    news_results: Vec<SerpApiResult>,
}

#[derive(Debug, Deserialize)]
struct SerpApiResult {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    link: Option<String>,
    #[serde(default)]
    snippet: Option<String>,
}

impl WebSearchTool {
    /// Create a new web search tool with the given SerpAPI key
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
        }
    }

    /// Create a tool from the `SERPAPI_API_KEY` environment variable
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("SERPAPI_API_KEY").map_err(|_| {
            ToolError::ConfigError("SERPAPI_API_KEY environment variable not set".to_string())
        })?;
        Ok(Self::new(api_key))
    }

    async fn search(&self, params: SearchParams) -> Value {
        debug!(query = %params.query, max_results = params.max_results, "running web search");

        let response = match self
            .client
            .get(SERPAPI_ENDPOINT)
            .query(&[
                ("engine", "google"),
                ("q", params.query.as_str()),
                ("api_key", self.api_key.as_str()),
            ])
            .send()
            .await
        {
            Ok(resp) => resp,
            Err(e) => return json!([{ "error": format!("Search request failed: {e}") }]),
        };

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return json!([{ "error": format!("Search API error {status}: {body}") }]);
        }

        let parsed: SerpApiResponse = match response.json().await {
            Ok(parsed) => parsed,
            Err(e) => return json!([{ "error": format!("Failed to parse search response: {e}") }]),
        };

        // Prefer organic results; some query classes only populate news.
        let results = if parsed.organic_results.is_empty() {
            parsed.news_results
        } else {
            parsed.organic_results
        };

        if results.is_empty() {
            return json!([{
                "snippet": format!("no results found for query: {}", params.query)
            }]);
        }

        let entries: Vec<Value> = results
            .into_iter()
            .take(params.max_results)
            .map(|r| {
                json!({
                    "title": r.title.unwrap_or_default(),
                    "url": r.link.unwrap_or_default(),
                    "snippet": r.snippet.unwrap_or_default(),
                })
            })
            .collect();

        json!(entries)
    }
}

#[async_trait]
impl Tool for WebSearchTool {
    async fn execute(&self, params: Value) -> Result<Value> {
        let params: SearchParams = serde_json::from_value(params)
            .map_err(|e| ToolError::InvalidParameters(e.to_string()))?;

        Ok(self.search(params).await)
    }

    fn name(&self) -> &'static str {
        "web_search"
    }

    fn description(&self) -> &'static str {
        "Search the web for recent news and commentary. Returns a list of results \
         with title, URL, and snippet. Useful for gauging market sentiment."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "Search query (e.g., 'bitcoin market sentiment this week')"
                },
                "max_results": {
                    "type": "integer",
                    "description": "Maximum number of results to return",
                    "default": 5
                }
            },
            "required": ["query"]
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tool_metadata() {
        let tool = WebSearchTool::new("test-key");
        assert_eq!(tool.name(), "web_search");
        let schema = tool.input_schema();
        assert_eq!(schema["required"][0], "query");
    }

    #[tokio::test]
    async fn query_is_required() {
        let tool = WebSearchTool::new("test-key");
        let result = tool.execute(json!({"max_results": 3})).await;
        assert!(matches!(result, Err(ToolError::InvalidParameters(_))));
    }

    #[test]
    fn response_shape_parses() {
        let raw = json!({
            "organic_results": [
                {"title": "BTC rallies", "link": "https://example.com/a", "snippet": "Bitcoin is up"},
                {"title": "No snippet here", "link": "https://example.com/b"}
            ]
        });
        let parsed: SerpApiResponse = serde_json::from_value(raw).unwrap();
        assert_eq!(parsed.organic_results.len(), 2);
        assert!(parsed.organic_results[1].snippet.is_none());
        assert!(parsed.news_results.is_empty());
    }

    #[tokio::test]
    #[ignore] // Requires network access and a SerpAPI key
    async fn live_search() {
        let tool = WebSearchTool::from_env().unwrap();
        let result = tool
            .execute(json!({"query": "bitcoin price news"}))
            .await
            .unwrap();
        assert!(result.is_array());
    }
}
