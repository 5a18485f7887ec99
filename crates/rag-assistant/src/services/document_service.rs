use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, instrument};

use crate::config::RagConfig;
use crate::document::{DocumentParser, TextChunker};
use crate::services::embedding_service::EmbeddingProvider;
use crate::services::vector_store::InMemoryVectorStore;
use crate::utils::error::{AssistantError, Result};

/// Builds the in-memory index: parse, chunk, embed, insert.
pub struct DocumentService {
    chunker: TextChunker,
    embedder: Arc<dyn EmbeddingProvider>,
}

impl DocumentService {
    pub fn new(config: &RagConfig, embedder: Arc<dyn EmbeddingProvider>) -> Result<Self> {
        let chunker = TextChunker::new(config.chunk_size, config.chunk_overlap, config.chunk_strategy)?;
        Ok(Self { chunker, embedder })
    }

    #[instrument(skip(self, path), fields(path = %path.display()))]
    pub async fn index(&self, path: &Path) -> Result<InMemoryVectorStore> {
        let start = Instant::now();

        let parsed = DocumentParser::parse(path)?;
        let chunks = self.chunker.chunk(&parsed.content)?;

        let texts: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
        let embeddings = self.embedder.embed_batch(&texts).await?;
        if embeddings.len() != chunks.len() {
            return Err(AssistantError::Index(format!(
                "embedding backend returned {} vectors for {} chunks",
                embeddings.len(),
                chunks.len()
            )));
        }

        let mut store = InMemoryVectorStore::new(self.embedder.dimension());
        for (chunk, embedding) in chunks.into_iter().zip(embeddings) {
            store.add(chunk, embedding)?;
        }

        info!(
            "Indexed {} chunks ({} chars, {:?} pages) in {} ms",
            store.len(),
            parsed.metadata.char_count,
            parsed.metadata.pages,
            start.elapsed().as_millis()
        );

        Ok(store)
    }
}
