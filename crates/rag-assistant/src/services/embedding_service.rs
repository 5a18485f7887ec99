use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use crate::config::EmbeddingConfig;
use crate::utils::error::{AssistantError, Result};

#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Sequential by default; providers with a batch endpoint can override.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut embeddings = Vec::with_capacity(texts.len());
        for text in texts {
            embeddings.push(self.embed(text).await?);
        }
        Ok(embeddings)
    }

    fn dimension(&self) -> usize;
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    content: &'a str,
    input: &'a str,
}

/// Local embedding model served by llama.cpp's `llama-server --embedding`.
#[derive(Clone)]
pub struct EmbeddingService {
    client: Client,
    base_url: String,
    dimension: usize,
}

impl EmbeddingService {
    pub fn new(config: &EmbeddingConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            dimension: config.dimension,
        })
    }
}

#[async_trait]
impl EmbeddingProvider for EmbeddingService {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        debug!("Generating embedding for {} chars", text.len());

        // Send both keys, llama-server and OpenAI-style servers each read one
        let request = EmbeddingRequest {
            content: text,
            input: text,
        };

        let response = self
            .client
            .post(format!("{}/embedding", self.base_url))
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                AssistantError::UpstreamUnavailable(format!(
                    "Failed to connect to embedding server: {}",
                    e
                ))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AssistantError::UpstreamUnavailable(format!(
                "Embedding API error ({}): {}",
                status, body
            )));
        }

        let json_value: Value = response.json().await.map_err(|e| {
            AssistantError::UpstreamUnavailable(format!(
                "Failed to parse embedding response as JSON: {}",
                e
            ))
        })?;

        let embedding = parse_embedding(&json_value)?;
        check_dimension(&embedding, self.dimension)?;
        Ok(embedding)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

/// Accepts the shapes returned by llama.cpp and OpenAI-compatible servers:
/// `{"embedding": [..]}`, `[..]`, `[{"embedding": [..]}]`, `[{"embedding": [[..]]}]`
/// and `{"data": [{"embedding": [..]}]}`.
pub(crate) fn parse_embedding(value: &Value) -> Result<Vec<f32>> {
    let unrecognized =
        || AssistantError::UpstreamUnavailable(format!("Unrecognized embedding response format: {}", value));

    let vector = match value {
        Value::Array(items) => match items.first() {
            Some(Value::Object(first)) => first.get("embedding").ok_or_else(unrecognized)?,
            Some(_) => value,
            None => {
                return Err(AssistantError::UpstreamUnavailable(
                    "Empty array returned from embedding server".to_string(),
                ))
            }
        },
        Value::Object(obj) => {
            if let Some(embedding) = obj.get("embedding") {
                embedding
            } else {
                obj.get("data")
                    .and_then(|data| data.get(0))
                    .and_then(|first| first.get("embedding"))
                    .ok_or_else(unrecognized)?
            }
        }
        _ => return Err(unrecognized()),
    };

    // llama-server with pooling=none nests one vector per token; take the first row
    let vector = match vector.get(0) {
        Some(inner @ Value::Array(_)) => inner,
        _ => vector,
    };

    let floats: Vec<f32> = vector
        .as_array()
        .ok_or_else(unrecognized)?
        .iter()
        .filter_map(|v| v.as_f64().map(|f| f as f32))
        .collect();

    if floats.is_empty() {
        return Err(AssistantError::UpstreamUnavailable(
            "Generated embedding is empty".to_string(),
        ));
    }

    Ok(floats)
}

pub(crate) fn check_dimension(embedding: &[f32], expected: usize) -> Result<()> {
    if embedding.len() != expected {
        return Err(AssistantError::Index(format!(
            "Embedding dimension mismatch: expected {}, got {}",
            expected,
            embedding.len()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(base_url: String, dimension: usize) -> EmbeddingConfig {
        EmbeddingConfig {
            base_url,
            dimension,
            ..EmbeddingConfig::default()
        }
    }

    #[test]
    fn test_parse_known_shapes() {
        let shapes = [
            json!({"embedding": [0.1, 0.2]}),
            json!([0.1, 0.2]),
            json!([{"index": 0, "embedding": [0.1, 0.2]}]),
            json!([{"index": 0, "embedding": [[0.1, 0.2]]}]),
            json!({"data": [{"embedding": [0.1, 0.2]}]}),
        ];
        for shape in shapes {
            let parsed = parse_embedding(&shape).unwrap();
            assert_eq!(parsed.len(), 2, "shape {}", shape);
        }
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_embedding(&json!({"foo": 1})).is_err());
        assert!(parse_embedding(&json!([])).is_err());
        assert!(parse_embedding(&json!({"embedding": []})).is_err());
        assert!(parse_embedding(&json!("text")).is_err());
    }

    #[tokio::test]
    async fn test_embed_against_llama_server() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/embedding"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"embedding": [1.0, 0.0, 0.5]})))
            .expect(1)
            .mount(&server)
            .await;

        let service = EmbeddingService::new(&config(server.uri(), 3)).unwrap();
        let embedding = service.embed("hello").await.unwrap();
        assert_eq!(embedding, vec![1.0, 0.0, 0.5]);
    }

    #[tokio::test]
    async fn test_dimension_mismatch_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/embedding"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"embedding": [1.0, 0.0]})))
            .mount(&server)
            .await;

        let service = EmbeddingService::new(&config(server.uri(), 384)).unwrap();
        let err = service.embed("hello").await.unwrap_err();
        assert!(matches!(err, AssistantError::Index(_)));
    }

    #[tokio::test]
    async fn test_server_error_is_upstream_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/embedding"))
            .respond_with(ResponseTemplate::new(503).set_body_string("loading model"))
            .mount(&server)
            .await;

        let service = EmbeddingService::new(&config(server.uri(), 3)).unwrap();
        let err = service.embed("hello").await.unwrap_err();
        assert!(matches!(err, AssistantError::UpstreamUnavailable(ref m) if m.contains("503")));
    }
}
