use std::cmp::Ordering;
use tracing::debug;

use crate::document::TextChunk;
use crate::utils::error::{AssistantError, Result};
use crate::utils::similarity::cosine_similarity;

#[derive(Debug, Clone)]
pub struct IndexedChunk {
    pub chunk: TextChunk,
    pub embedding: Vec<f32>,
}

#[derive(Debug, Clone)]
pub struct ScoredChunk {
    pub chunk: TextChunk,
    pub similarity: f32,
}

/// Flat in-memory index scanned with cosine similarity. Filled once at start-up.
#[derive(Debug)]
pub struct InMemoryVectorStore {
    dimension: usize,
    entries: Vec<IndexedChunk>,
}

impl InMemoryVectorStore {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            entries: Vec::new(),
        }
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn add(&mut self, chunk: TextChunk, embedding: Vec<f32>) -> Result<()> {
        if embedding.len() != self.dimension {
            return Err(AssistantError::Index(format!(
                "chunk {} has dimension {}, index expects {}",
                chunk.index,
                embedding.len(),
                self.dimension
            )));
        }
        self.entries.push(IndexedChunk { chunk, embedding });
        Ok(())
    }

    /// Top `k` chunks by similarity (descending), ties by chunk order.
    pub fn search(&self, query: &[f32], k: usize, min_score: Option<f32>) -> Result<Vec<ScoredChunk>> {
        if query.len() != self.dimension {
            return Err(AssistantError::Index(format!(
                "query has dimension {}, index expects {}",
                query.len(),
                self.dimension
            )));
        }

        let mut scored = Vec::with_capacity(self.entries.len());
        for entry in &self.entries {
            let similarity = cosine_similarity(query, &entry.embedding)?;
            if min_score.map_or(true, |floor| similarity >= floor) {
                scored.push((similarity, entry));
            }
        }

        scored.sort_by(|a, b| {
            b.0.partial_cmp(&a.0)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.1.chunk.index.cmp(&b.1.chunk.index))
        });
        scored.truncate(k);

        debug!(
            "Vector search matched {} of {} chunks (k={}, min_score={:?})",
            scored.len(),
            self.entries.len(),
            k,
            min_score
        );

        Ok(scored
            .into_iter()
            .map(|(similarity, entry)| ScoredChunk {
                chunk: entry.chunk.clone(),
                similarity,
            })
            .collect())
    }
}
