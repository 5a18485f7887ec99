pub mod credentials;
pub mod settings;

pub use credentials::Credentials;
pub use settings::{
    ChatConfig, ChunkStrategy, EmbeddingBackend, EmbeddingConfig, LlmConfig, LoggingConfig,
    PromptsConfig, RagConfig, RouterConfig, RouterMode, Settings, WebSearchConfig,
    DEFAULT_SYSTEM_ROLE,
};
