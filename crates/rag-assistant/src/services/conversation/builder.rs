use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::{Credentials, EmbeddingBackend, RouterMode, Settings};
use crate::services::augmentor::RetrievalAugmentor;
use crate::services::conversation::session::ChatSession;
use crate::services::document_service::DocumentService;
use crate::services::embedding_service::{EmbeddingProvider, EmbeddingService};
use crate::services::gemini::GeminiEmbedder;
use crate::services::llm_service::{ChatModel, LlmService};
use crate::services::query_router::{
    AlwaysAllRouter, KeywordRouter, LlmQueryRouter, NoRetrievalRouter, QueryRouter,
};
use crate::services::rag_service::{RagService, LOCAL_RETRIEVER};
use crate::services::retriever::Retriever;
use crate::services::web_search::WebSearchService;
use crate::utils::error::{AssistantError, Result};

/// Wires a [`ChatSession`] from settings.
///
/// Backends default to the HTTP clients when built through [`SessionBuilder::with_credentials`];
/// any of them can be swapped beforehand.
pub struct SessionBuilder {
    settings: Settings,
    chat_model: Option<Arc<dyn ChatModel>>,
    embedder: Option<Arc<dyn EmbeddingProvider>>,
    web_retriever: Option<Arc<dyn Retriever>>,
}

impl SessionBuilder {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            chat_model: None,
            embedder: None,
            web_retriever: None,
        }
    }

    pub fn chat_model(mut self, model: Arc<dyn ChatModel>) -> Self {
        self.chat_model = Some(model);
        self
    }

    pub fn embedder(mut self, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    pub fn web_retriever(mut self, retriever: Arc<dyn Retriever>) -> Self {
        self.web_retriever = Some(retriever);
        self
    }

    /// Fills every backend not set yet with its HTTP client.
    pub fn with_credentials(mut self, credentials: &Credentials) -> Result<Self> {
        if self.chat_model.is_none() {
            let llm = LlmService::new(self.settings.llm.clone(), credentials.gemini_api_key.clone())?;
            self.chat_model = Some(Arc::new(llm));
        }

        if self.settings.rag.enabled && self.embedder.is_none() {
            let embedder: Arc<dyn EmbeddingProvider> = match self.settings.embedding.backend {
                EmbeddingBackend::LlamaServer => Arc::new(EmbeddingService::new(&self.settings.embedding)?),
                EmbeddingBackend::Gemini => Arc::new(GeminiEmbedder::new(
                    &self.settings.embedding,
                    credentials.gemini_api_key.clone(),
                )?),
            };
            self.embedder = Some(embedder);
        }

        if self.settings.web_search.enabled && self.web_retriever.is_none() {
            let api_key = credentials.tavily_api_key.clone().ok_or_else(|| {
                AssistantError::ConfigurationMissing(format!(
                    "environment variable {} is not set",
                    self.settings.web_search.api_key_env
                ))
            })?;
            self.web_retriever = Some(Arc::new(WebSearchService::new(&self.settings.web_search, api_key)?));
        }

        Ok(self)
    }

    /// Indexes the document (when enabled) and assembles the session.
    pub async fn build(self) -> Result<ChatSession> {
        let settings = self.settings;
        settings.validate()?;

        let model = self
            .chat_model
            .ok_or_else(|| AssistantError::ConfigurationMissing("chat model".to_string()))?;

        let mut retrievers: Vec<Arc<dyn Retriever>> = Vec::new();

        if settings.rag.enabled {
            let embedder = self
                .embedder
                .ok_or_else(|| AssistantError::ConfigurationMissing("embedding backend".to_string()))?;

            let documents = DocumentService::new(&settings.rag, embedder.clone())?;
            let store = documents.index(Path::new(&settings.rag.document_path)).await?;
            info!("Document index ready with {} chunks", store.len());

            retrievers.push(Arc::new(RagService::new(Arc::new(store), embedder, &settings.rag)));
        }

        if settings.web_search.enabled {
            let web = self
                .web_retriever
                .ok_or_else(|| AssistantError::ConfigurationMissing("web search backend".to_string()))?;
            retrievers.push(web);
        }

        let router = select_router(&settings, model.clone(), retrievers)?;
        let augmentor = RetrievalAugmentor::new(
            router,
            settings.prompts.context_header.clone(),
            settings.rag.max_context_chars,
        );

        let mut session = ChatSession::new(model, augmentor, &settings.chat);
        session.set_system_role(&settings.chat.default_role);
        info!("Chat session {} ready", session.id());

        Ok(session)
    }
}

fn select_router(
    settings: &Settings,
    model: Arc<dyn ChatModel>,
    retrievers: Vec<Arc<dyn Retriever>>,
) -> Result<Arc<dyn QueryRouter>> {
    let mode = settings.router.mode;

    if mode != RouterMode::None && retrievers.is_empty() {
        return Err(AssistantError::Configuration(format!(
            "router mode {:?} needs at least one enabled retriever",
            mode
        )));
    }

    let router: Arc<dyn QueryRouter> = match mode {
        RouterMode::None => {
            if !retrievers.is_empty() {
                warn!("Router mode is none, {} retrievers will never be used", retrievers.len());
            }
            Arc::new(NoRetrievalRouter)
        }
        RouterMode::AlwaysAll => Arc::new(AlwaysAllRouter::new(retrievers)),
        RouterMode::Conditional => {
            // the classifier gates the document index; other sources run on every query
            let (local, others): (Vec<_>, Vec<_>) =
                retrievers.into_iter().partition(|r| r.name() == LOCAL_RETRIEVER);
            let (gated, ungated) = if local.is_empty() {
                (others, Vec::new())
            } else {
                (local, others)
            };
            Arc::new(
                LlmQueryRouter::new(model, gated, settings.prompts.routing_prompt.clone())
                    .with_ungated(ungated),
            )
        }
        RouterMode::Keyword => Arc::new(KeywordRouter::new(&settings.router.keywords, retrievers)),
    };

    info!("Query router: {:?}", mode);
    Ok(router)
}

impl ChatSession {
    /// Reads credentials from the environment and builds a session with the HTTP backends.
    pub async fn from_settings(settings: Settings) -> Result<Self> {
        let credentials = Credentials::from_env(&settings)?;
        SessionBuilder::new(settings)
            .with_credentials(&credentials)?
            .build()
            .await
    }
}
