use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use super::{Tool, ToolError, ToolOutput, ToolResult};

const SERPER_SEARCH_URL: &str = "https://google.serper.dev/search";
const RESULT_COUNT: u64 = 10;
const SEARCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Web search backed by the Serper API
pub struct WebSearchTool {
    api_key: String,
    endpoint: String,
    client: reqwest::Client,
}

impl WebSearchTool {
    pub fn new(api_key: impl Into<String>) -> ToolResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(SEARCH_TIMEOUT)
            .build()
            .map_err(|e| ToolError::Execution(format!("Failed to create search client: {}", e)))?;

        Ok(Self {
            api_key: api_key.into(),
            endpoint: SERPER_SEARCH_URL.to_string(),
            client,
        })
    }

    /// Send searches to a different endpoint
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    async fn search(&self, query: &str) -> Result<SerperResponse, String> {
        let response = self
            .client
            .post(&self.endpoint)
            .header("X-API-KEY", &self.api_key)
            .json(&json!({ "q": query, "num": RESULT_COUNT }))
            .send()
            .await
            .map_err(|e| format!("Search request failed: {}", e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(format!("Search API returned {}: {}", status, body));
        }

        response
            .json::<SerperResponse>()
            .await
            .map_err(|e| format!("Failed to parse search response: {}", e))
    }

    /// Render organic results as Title/Link/Snippet blocks
    fn format_results(results: &SerperResponse) -> String {
        if results.organic.is_empty() {
            return "No results found.".to_string();
        }

        results
            .organic
            .iter()
            .map(|r| {
                format!(
                    "Title: {}\nLink: {}\nSnippet: {}",
                    r.title,
                    r.link,
                    r.snippet.as_deref().unwrap_or("")
                )
            })
            .collect::<Vec<_>>()
            .join("\n---\n")
    }
}

#[async_trait]
impl Tool for WebSearchTool {
    fn name(&self) -> &str {
        "search_internet"
    }

    fn description(&self) -> &str {
        "Search the internet for a query and return the top results with title, link and snippet"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "search_query": {
                    "type": "string",
                    "description": "Query to search the internet for"
                }
            },
            "required": ["search_query"]
        })
    }

    async fn execute(&self, args: serde_json::Value) -> ToolResult<ToolOutput> {
        let query = args["search_query"]
            .as_str()
            .filter(|q| !q.trim().is_empty())
            .ok_or_else(|| {
                ToolError::InvalidArguments("Missing 'search_query' parameter".to_string())
            })?;

        tracing::debug!(query, "Searching the web");

        match self.search(query).await {
            Ok(results) => Ok(ToolOutput::ok(Self::format_results(&results))),
            Err(e) => Ok(ToolOutput::err(e)),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct SerperResponse {
    #[serde(default)]
    organic: Vec<OrganicResult>,
}

#[derive(Debug, Deserialize)]
struct OrganicResult {
    #[serde(default)]
    title: String,
    #[serde(default)]
    link: String,
    snippet: Option<String>,
}
