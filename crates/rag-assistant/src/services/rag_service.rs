use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};

use crate::config::RagConfig;
use crate::models::Snippet;
use crate::services::embedding_service::EmbeddingProvider;
use crate::services::retriever::Retriever;
use crate::services::vector_store::InMemoryVectorStore;
use crate::utils::error::Result;

pub const LOCAL_RETRIEVER: &str = "document";

/// Nearest-neighbour retrieval over the in-memory document index
pub struct RagService {
    store: Arc<InMemoryVectorStore>,
    embedder: Arc<dyn EmbeddingProvider>,
    top_k: usize,
    min_score: Option<f32>,
}

impl RagService {
    pub fn new(
        store: Arc<InMemoryVectorStore>,
        embedder: Arc<dyn EmbeddingProvider>,
        config: &RagConfig,
    ) -> Self {
        Self {
            store,
            embedder,
            top_k: config.retrieval_top_k,
            min_score: config.min_score,
        }
    }
}

#[async_trait]
impl Retriever for RagService {
    fn name(&self) -> &str {
        LOCAL_RETRIEVER
    }

    async fn retrieve(&self, query: &str) -> Result<Vec<Snippet>> {
        info!("Retrieving document context for query: {}", query);

        let query_embedding = self.embedder.embed(query).await?;
        let results = self.store.search(&query_embedding, self.top_k, self.min_score)?;

        debug!("Retrieved {} chunks", results.len());

        Ok(results
            .into_iter()
            .map(|r| Snippet::new(LOCAL_RETRIEVER, r.chunk.content, r.similarity))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::TextChunk;
    use crate::services::test_support::HashEmbedder;

    async fn indexed(texts: &[&str], embedder: &HashEmbedder) -> InMemoryVectorStore {
        let mut store = InMemoryVectorStore::new(embedder.dimension());
        for (index, text) in texts.iter().enumerate() {
            let chunk = TextChunk {
                index,
                content: text.to_string(),
                start_pos: 0,
                end_pos: text.len(),
            };
            store.add(chunk, embedder.embed(text).await.unwrap()).unwrap();
        }
        store
    }

    #[tokio::test]
    async fn test_returns_at_most_top_k_ranked() {
        let embedder = Arc::new(HashEmbedder::new(16));
        let texts = ["aaaa", "bbbb", "cccc", "dddd", "eeee", "ffff", "aaab"];
        let store = Arc::new(indexed(&texts, &embedder).await);

        let rag = RagService::new(store, embedder.clone(), &RagConfig::default());

        let snippets = rag.retrieve("aaaa").await.unwrap();
        assert_eq!(snippets.len(), 5);
        assert_eq!(snippets[0].content, "aaaa");
        assert_eq!(snippets[1].content, "aaab");
        assert!(snippets.iter().all(|s| s.source == LOCAL_RETRIEVER));
        assert!(snippets.windows(2).all(|w| w[0].score >= w[1].score));
    }

    /// Embeds every query as due east.
    struct EastEmbedder;

    #[async_trait]
    impl EmbeddingProvider for EastEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Ok(vec![1.0, 0.0])
        }

        fn dimension(&self) -> usize {
            2
        }
    }

    fn compass_store() -> Arc<InMemoryVectorStore> {
        let points = [
            ("east", [1.0, 0.0]),
            ("north-east", [1.0, 1.0]),
            ("west", [-1.0, 0.0]),
            ("north-west", [-1.0, 1.0]),
            ("south-west", [-1.0, -1.0]),
            ("far-west", [-2.0, 0.1]),
        ];
        let mut store = InMemoryVectorStore::new(2);
        for (index, (name, vector)) in points.iter().enumerate() {
            let chunk = TextChunk {
                index,
                content: name.to_string(),
                start_pos: 0,
                end_pos: name.len(),
            };
            store.add(chunk, vector.to_vec()).unwrap();
        }
        Arc::new(store)
    }

    #[tokio::test]
    async fn test_default_config_returns_k_closest_even_when_dissimilar() {
        let rag = RagService::new(compass_store(), Arc::new(EastEmbedder), &RagConfig::default());

        let snippets = rag.retrieve("which way?").await.unwrap();
        let names: Vec<&str> = snippets.iter().map(|s| s.content.as_str()).collect();
        assert_eq!(names.len(), 5);
        assert_eq!(&names[..2], &["east", "north-east"]);
        assert!(snippets[2].score < 0.0);
    }

    #[tokio::test]
    async fn test_min_score_floor_when_configured() {
        let config = RagConfig {
            min_score: Some(0.0),
            ..RagConfig::default()
        };
        let rag = RagService::new(compass_store(), Arc::new(EastEmbedder), &config);

        assert_eq!(rag.retrieve("which way?").await.unwrap().len(), 2);
    }
}
