pub mod augmentor;
pub mod conversation;
pub mod document_service;
pub mod embedding_service;
pub mod gemini;
pub mod llm_service;
pub mod query_router;
pub mod rag_service;
pub mod retriever;
pub mod vector_store;
pub mod web_search;

#[cfg(test)]
pub(crate) mod test_support;

pub use augmentor::{AugmentedQuery, RetrievalAugmentor};
pub use conversation::{ChatMemory, ChatSession, SessionBuilder};
pub use document_service::DocumentService;
pub use embedding_service::{EmbeddingProvider, EmbeddingService};
pub use gemini::GeminiEmbedder;
pub use llm_service::{ChatModel, LlmService};
pub use query_router::{
    AlwaysAllRouter, KeywordRouter, LlmQueryRouter, NoRetrievalRouter, QueryRouter, RouterDecision,
};
pub use rag_service::RagService;
pub use retriever::Retriever;
pub use vector_store::InMemoryVectorStore;
pub use web_search::WebSearchService;
