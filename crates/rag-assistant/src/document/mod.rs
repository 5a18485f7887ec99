pub mod chunker;
pub mod parser;

pub use chunker::{TextChunk, TextChunker};
pub use parser::{DocumentMetadata, DocumentParser, ParsedDocument};
