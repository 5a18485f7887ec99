use text_splitter::{ChunkConfig, TextSplitter};
use tracing::debug;

use crate::config::ChunkStrategy;
use crate::utils::error::{AssistantError, Result};

/// Contiguous span of source text. Positions are character offsets, end exclusive.
#[derive(Debug, Clone, PartialEq)]
pub struct TextChunk {
    pub index: usize,
    pub content: String,
    pub start_pos: usize,
    pub end_pos: usize,
}

pub struct TextChunker {
    chunk_size: usize,
    overlap: usize,
    strategy: ChunkStrategy,
}

impl TextChunker {
    pub fn new(chunk_size: usize, overlap: usize, strategy: ChunkStrategy) -> Result<Self> {
        if chunk_size == 0 || overlap >= chunk_size {
            return Err(AssistantError::Configuration(format!(
                "invalid chunking: size={} overlap={}",
                chunk_size, overlap
            )));
        }

        Ok(Self {
            chunk_size,
            overlap,
            strategy,
        })
    }

    pub fn chunk(&self, text: &str) -> Result<Vec<TextChunk>> {
        if text.is_empty() {
            return Ok(Vec::new());
        }

        let chunks = match self.strategy {
            ChunkStrategy::Fixed => self.chunk_fixed(text),
            ChunkStrategy::Semantic => self.chunk_semantic(text)?,
        };

        debug!(
            "Created {} chunks ({:?}, size={}, overlap={})",
            chunks.len(),
            self.strategy,
            self.chunk_size,
            self.overlap
        );

        Ok(chunks)
    }

    /// Fixed windows; consecutive chunks share exactly `overlap` characters.
    fn chunk_fixed(&self, text: &str) -> Vec<TextChunk> {
        let chars: Vec<char> = text.chars().collect();
        let total_len = chars.len();
        let step = self.chunk_size - self.overlap;

        let mut chunks = Vec::with_capacity(total_len / step + 1);
        let mut start = 0;

        while start < total_len {
            let end = std::cmp::min(start + self.chunk_size, total_len);

            chunks.push(TextChunk {
                index: chunks.len(),
                content: chars[start..end].iter().collect(),
                start_pos: start,
                end_pos: end,
            });

            if end >= total_len {
                break;
            }

            start += step;
        }

        chunks
    }

    /// Boundary-aware splitting; sizes are bounded the same way but overlap is best effort.
    fn chunk_semantic(&self, text: &str) -> Result<Vec<TextChunk>> {
        let config = ChunkConfig::new(self.chunk_size)
            .with_overlap(self.overlap)
            .map_err(|e| AssistantError::Configuration(e.to_string()))?;
        let splitter = TextSplitter::new(config);

        let chunks = splitter
            .chunk_indices(text)
            .enumerate()
            .map(|(index, (byte_offset, content))| {
                let start_pos = text[..byte_offset].chars().count();
                TextChunk {
                    index,
                    content: content.to_string(),
                    start_pos,
                    end_pos: start_pos + content.chars().count(),
                }
            })
            .collect();

        Ok(chunks)
    }
}
