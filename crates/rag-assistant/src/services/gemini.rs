use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::config::EmbeddingConfig;
use crate::services::embedding_service::{check_dimension, EmbeddingProvider};
use crate::utils::error::{AssistantError, Result};

#[derive(Serialize)]
struct OpenAiEmbeddingRequest<'a> {
    input: &'a str,
    model: &'a str,
}

#[derive(Deserialize)]
struct OpenAiEmbeddingResponse {
    data: Vec<OpenAiEmbeddingData>,
}

#[derive(Deserialize)]
struct OpenAiEmbeddingData {
    embedding: Vec<f32>,
}

/// Hosted embeddings through Gemini's OpenAI-compatible endpoint.
/// `base_url` is expected to point at `.../v1beta/openai`.
#[derive(Clone)]
pub struct GeminiEmbedder {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    dimension: usize,
}

impl GeminiEmbedder {
    pub fn new(config: &EmbeddingConfig, api_key: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            model: config.model.clone(),
            dimension: config.dimension,
        })
    }
}

#[async_trait]
impl EmbeddingProvider for GeminiEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        debug!("Requesting Gemini embedding ({}) for {} chars", self.model, text.len());

        let request = OpenAiEmbeddingRequest {
            input: text,
            model: &self.model,
        };

        let response = self
            .client
            .post(format!("{}/embeddings", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| AssistantError::UpstreamUnavailable(format!("Gemini Network Error: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(AssistantError::UpstreamUnavailable(format!(
                "Gemini API Error ({}): {}",
                status, text
            )));
        }

        let body: OpenAiEmbeddingResponse = response.json().await.map_err(|e| {
            AssistantError::UpstreamUnavailable(format!("Failed to parse Gemini Embedding: {}", e))
        })?;

        let embedding = body
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| {
                AssistantError::UpstreamUnavailable("Gemini returned no embedding data".to_string())
            })?;

        check_dimension(&embedding, self.dimension)?;
        Ok(embedding)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}
