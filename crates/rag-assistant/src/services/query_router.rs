//! Query routing
//! Decides, per query, which retrievers (if any) feed the prompt.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::models::chat::ChatMessage;
use crate::services::llm_service::ChatModel;
use crate::services::retriever::Retriever;
use crate::utils::error::Result;

/// Classification outcome derived from the model's text label
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouterDecision {
    Retrieve,
    Skip,
    /// Unparseable or hedged answer; treated as `Retrieve`.
    Uncertain,
}

impl RouterDecision {
    pub fn from_label(label: &str) -> Self {
        let normalized = label.trim().to_lowercase();

        if normalized.starts_with("non") {
            RouterDecision::Skip
        } else if normalized.starts_with("oui") {
            RouterDecision::Retrieve
        } else {
            RouterDecision::Uncertain
        }
    }

    pub fn should_retrieve(self) -> bool {
        !matches!(self, RouterDecision::Skip)
    }
}

#[async_trait]
pub trait QueryRouter: Send + Sync {
    /// Retrievers to invoke for `query`, in invocation order. May be empty.
    async fn route(&self, query: &str) -> Result<Vec<Arc<dyn Retriever>>>;
}

/// Plain chat, never retrieves.
pub struct NoRetrievalRouter;

#[async_trait]
impl QueryRouter for NoRetrievalRouter {
    async fn route(&self, _query: &str) -> Result<Vec<Arc<dyn Retriever>>> {
        Ok(Vec::new())
    }
}

/// Fans out to every configured retriever.
pub struct AlwaysAllRouter {
    retrievers: Vec<Arc<dyn Retriever>>,
}

impl AlwaysAllRouter {
    pub fn new(retrievers: Vec<Arc<dyn Retriever>>) -> Self {
        Self { retrievers }
    }
}

#[async_trait]
impl QueryRouter for AlwaysAllRouter {
    async fn route(&self, _query: &str) -> Result<Vec<Arc<dyn Retriever>>> {
        Ok(self.retrievers.clone())
    }
}

/// Asks the chat model whether the query needs the indexed context.
///
/// The classification is a one-shot call with its own message list, so it never
/// shows up in the conversation memory. Anything other than a "non" answer,
/// including a failed call, routes to retrieval. Ungated retrievers run on every
/// query, after the gated ones.
pub struct LlmQueryRouter {
    model: Arc<dyn ChatModel>,
    retrievers: Vec<Arc<dyn Retriever>>,
    ungated: Vec<Arc<dyn Retriever>>,
    prompt_template: String,
}

impl LlmQueryRouter {
    pub fn new(
        model: Arc<dyn ChatModel>,
        retrievers: Vec<Arc<dyn Retriever>>,
        prompt_template: String,
    ) -> Self {
        Self {
            model,
            retrievers,
            ungated: Vec::new(),
            prompt_template,
        }
    }

    pub fn with_ungated(mut self, retrievers: Vec<Arc<dyn Retriever>>) -> Self {
        self.ungated = retrievers;
        self
    }

    pub fn classification_prompt(&self, query: &str) -> String {
        self.prompt_template.replace("{{query}}", query)
    }

    pub async fn classify(&self, query: &str) -> RouterDecision {
        let messages = [ChatMessage::user(self.classification_prompt(query))];

        match self.model.generate(&messages).await {
            Ok(answer) => {
                let decision = RouterDecision::from_label(&answer);
                debug!("Router answer {:?} -> {:?}", answer.trim(), decision);
                decision
            }
            Err(e) => {
                warn!("Routing classification failed, retrieving anyway: {}", e);
                RouterDecision::Uncertain
            }
        }
    }
}

#[async_trait]
impl QueryRouter for LlmQueryRouter {
    async fn route(&self, query: &str) -> Result<Vec<Arc<dyn Retriever>>> {
        let decision = self.classify(query).await;
        info!("Routing decision: {:?}", decision);

        let mut selected = if decision.should_retrieve() {
            self.retrievers.clone()
        } else {
            Vec::new()
        };
        selected.extend(self.ungated.iter().cloned());

        Ok(selected)
    }
}

/// Retrieves when the query mentions any configured keyword.
pub struct KeywordRouter {
    keywords: Vec<String>,
    retrievers: Vec<Arc<dyn Retriever>>,
}

impl KeywordRouter {
    pub fn new(keywords: &[String], retrievers: Vec<Arc<dyn Retriever>>) -> Self {
        Self {
            keywords: keywords
                .iter()
                .map(|k| k.trim().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect(),
            retrievers,
        }
    }

    pub fn decide(&self, query: &str) -> RouterDecision {
        let query_lower = query.to_lowercase();

        for keyword in &self.keywords {
            if query_lower.contains(keyword.as_str()) {
                debug!("Keyword '{}' matched, retrieving", keyword);
                return RouterDecision::Retrieve;
            }
        }

        RouterDecision::Skip
    }
}

#[async_trait]
impl QueryRouter for KeywordRouter {
    async fn route(&self, query: &str) -> Result<Vec<Arc<dyn Retriever>>> {
        if self.decide(query).should_retrieve() {
            Ok(self.retrievers.clone())
        } else {
            Ok(Vec::new())
        }
    }
}
