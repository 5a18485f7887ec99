use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

use crate::config::WebSearchConfig;
use crate::models::Snippet;
use crate::services::retriever::Retriever;
use crate::utils::error::{AssistantError, Result};

pub const WEB_RETRIEVER: &str = "web";

#[derive(Serialize)]
struct TavilySearchRequest<'a> {
    api_key: &'a str,
    query: &'a str,
    max_results: usize,
}

#[derive(Deserialize)]
struct TavilySearchResponse {
    #[serde(default)]
    results: Vec<TavilyResult>,
}

#[derive(Deserialize)]
struct TavilyResult {
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    content: String,
    #[serde(default)]
    score: f32,
}

/// Live web search through the Tavily API. Failures are surfaced, never retried.
pub struct WebSearchService {
    client: Client,
    base_url: String,
    api_key: String,
    max_results: usize,
}

impl WebSearchService {
    pub fn new(config: &WebSearchConfig, api_key: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            max_results: config.max_results,
        })
    }
}

#[async_trait]
impl Retriever for WebSearchService {
    fn name(&self) -> &str {
        WEB_RETRIEVER
    }

    async fn retrieve(&self, query: &str) -> Result<Vec<Snippet>> {
        info!("Web search for query: {}", query);

        let request = TavilySearchRequest {
            api_key: &self.api_key,
            query,
            max_results: self.max_results,
        };

        let response = self
            .client
            .post(format!("{}/search", self.base_url))
            .json(&request)
            .send()
            .await
            .map_err(|e| AssistantError::UpstreamUnavailable(format!("Web search failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AssistantError::UpstreamUnavailable(format!(
                "Web search API error ({}): {}",
                status, body
            )));
        }

        let payload: TavilySearchResponse = response.json().await.map_err(|e| {
            AssistantError::UpstreamUnavailable(format!("Failed to parse web search response: {}", e))
        })?;

        let snippets: Vec<Snippet> = payload
            .results
            .into_iter()
            .filter(|r| !r.content.trim().is_empty())
            .take(self.max_results)
            .map(|r| {
                Snippet::new(WEB_RETRIEVER, r.content, r.score)
                    .with_title(r.title)
                    .with_url(r.url)
            })
            .collect();

        debug!("Web search returned {} results", snippets.len());

        Ok(snippets)
    }
}
