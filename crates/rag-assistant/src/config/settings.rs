use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::utils::error::{AssistantError, Result};

pub const DEFAULT_SYSTEM_ROLE: &str = "You are a helpful assistant.";

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(default)]
pub struct Settings {
    pub llm: LlmConfig,
    pub embedding: EmbeddingConfig,
    pub rag: RagConfig,
    pub web_search: WebSearchConfig,
    pub router: RouterConfig,
    pub chat: ChatConfig,
    pub prompts: PromptsConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct LlmConfig {
    pub base_url: String,
    pub model: String,
    pub api_key_env: String,
    pub timeout_seconds: u64,
    pub temperature: Option<f32>,
    pub max_tokens: Option<usize>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com/v1beta/openai".to_string(),
            model: "gemini-2.5-flash".to_string(),
            api_key_env: "GEMINI_KEY".to_string(),
            timeout_seconds: 60,
            temperature: None,
            max_tokens: None,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EmbeddingBackend {
    LlamaServer, // local llama.cpp server
    Gemini,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub backend: EmbeddingBackend,
    pub base_url: String,
    pub model: String,
    pub dimension: usize,
    pub timeout_seconds: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            backend: EmbeddingBackend::LlamaServer,
            base_url: "http://127.0.0.1:8081".to_string(),
            model: "all-MiniLM-L6-v2".to_string(),
            dimension: 384,
            timeout_seconds: 60,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChunkStrategy {
    Fixed,
    Semantic,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct RagConfig {
    pub enabled: bool,
    pub document_path: PathBuf,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub chunk_strategy: ChunkStrategy,
    pub retrieval_top_k: usize,
    /// Similarity floor; `None` keeps the plain top-k.
    pub min_score: Option<f32>,
    pub max_context_chars: usize,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            document_path: PathBuf::from("resources/document.pdf"),
            chunk_size: 500,
            chunk_overlap: 50,
            chunk_strategy: ChunkStrategy::Fixed,
            retrieval_top_k: 5,
            min_score: None,
            max_context_chars: 8_000,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct WebSearchConfig {
    pub enabled: bool,
    pub base_url: String,
    pub api_key_env: String,
    pub max_results: usize,
    pub timeout_seconds: u64,
}

impl Default for WebSearchConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: "https://api.tavily.com".to_string(),
            api_key_env: "TAVILY_KEY".to_string(),
            max_results: 5,
            timeout_seconds: 30,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RouterMode {
    None,
    AlwaysAll,
    Conditional,
    Keyword,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct RouterConfig {
    pub mode: RouterMode,
    pub keywords: Vec<String>,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            mode: RouterMode::Conditional,
            keywords: Vec::new(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct ChatConfig {
    pub memory_window: usize,
    pub default_role: String,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            memory_window: 10,
            default_role: DEFAULT_SYSTEM_ROLE.to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct PromptsConfig {
    /// `{{query}}` is replaced by the user's query.
    pub routing_prompt: String,
    pub context_header: String,
}

impl Default for PromptsConfig {
    fn default() -> Self {
        Self {
            routing_prompt: "Est-ce que la requête '{{query}}' porte sur le contenu du document indexé ? \
                             Réponds seulement par 'oui', 'non', ou 'peut-être'."
                .to_string(),
            context_header: "Answer using the following information:".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(default)]
pub struct LoggingConfig {
    /// Directory for daily-rolling log files; stdout only when unset.
    pub file_dir: Option<PathBuf>,
}

/// `APP__SECTION__KEY` overrides; list settings take comma-separated values.
fn environment() -> Environment {
    Environment::with_prefix("APP")
        .separator("__")
        .try_parsing(true)
        .list_separator(",")
        .with_list_parse_key("router.keywords")
}

impl Settings {
    /// Defaults, then `config/settings.toml` (optional), then `APP__*` env overrides.
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let config = Config::builder()
            .add_source(File::with_name("config/settings").required(false))
            .add_source(environment())
            .build()?;

        let settings: Settings = config.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if self.rag.chunk_size == 0 {
            return Err(AssistantError::Configuration(
                "rag.chunk_size must be greater than zero".to_string(),
            ));
        }
        if self.rag.chunk_overlap >= self.rag.chunk_size {
            return Err(AssistantError::Configuration(format!(
                "rag.chunk_overlap ({}) must be smaller than rag.chunk_size ({})",
                self.rag.chunk_overlap, self.rag.chunk_size
            )));
        }
        if self.chat.memory_window < 2 {
            return Err(AssistantError::Configuration(
                "chat.memory_window must hold at least the system message and one turn".to_string(),
            ));
        }
        if self.router.mode == RouterMode::Keyword && self.router.keywords.is_empty() {
            return Err(AssistantError::Configuration(
                "router.keywords cannot be empty in keyword mode".to_string(),
            ));
        }
        let header_len = self.prompts.context_header.chars().count() + 1;
        if self.rag.max_context_chars != 0 && self.rag.max_context_chars <= header_len {
            return Err(AssistantError::Configuration(format!(
                "rag.max_context_chars ({}) leaves no room after the context header ({} chars)",
                self.rag.max_context_chars, header_len
            )));
        }
        if !self.prompts.routing_prompt.contains("{{query}}") {
            return Err(AssistantError::Configuration(
                "prompts.routing_prompt must contain the {{query}} placeholder".to_string(),
            ));
        }
        Ok(())
    }
}
