//! In-process fakes for the model, embedder and retriever seams.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::models::{ChatMessage, Snippet};
use crate::services::embedding_service::EmbeddingProvider;
use crate::services::llm_service::ChatModel;
use crate::services::retriever::Retriever;
use crate::utils::error::{AssistantError, Result};

/// Character-bucket embedding: texts sharing characters land close together.
pub struct HashEmbedder {
    dimension: usize,
    calls: AtomicUsize,
}

impl HashEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EmbeddingProvider for HashEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut vector = vec![0.0; self.dimension];
        for c in text.chars() {
            vector[c as usize % self.dimension] += 1.0;
        }
        Ok(vector)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

/// Replies with the scripted answers in order, then keeps repeating the last one.
pub struct ScriptedChatModel {
    answers: Vec<String>,
    fail: bool,
    calls: AtomicUsize,
    requests: Mutex<Vec<Vec<ChatMessage>>>,
}

impl ScriptedChatModel {
    pub fn new(answers: &[&str]) -> Self {
        Self {
            answers: answers.iter().map(|a| a.to_string()).collect(),
            fail: false,
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new(&[])
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_messages(&self) -> Vec<ChatMessage> {
        self.requests.lock().unwrap().last().cloned().unwrap_or_default()
    }

    pub fn requests(&self) -> Vec<Vec<ChatMessage>> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatModel for ScriptedChatModel {
    async fn generate(&self, messages: &[ChatMessage]) -> Result<String> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(messages.to_vec());

        if self.fail {
            return Err(AssistantError::UpstreamUnavailable("model offline".to_string()));
        }

        Ok(self
            .answers
            .get(call)
            .or_else(|| self.answers.last())
            .cloned()
            .unwrap_or_default())
    }
}

/// Returns fixed snippets with descending scores.
pub struct StaticRetriever {
    name: String,
    contents: Vec<String>,
    calls: AtomicUsize,
}

impl StaticRetriever {
    pub fn new(name: &str, contents: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            contents: contents.iter().map(|c| c.to_string()).collect(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Retriever for StaticRetriever {
    fn name(&self) -> &str {
        &self.name
    }

    async fn retrieve(&self, _query: &str) -> Result<Vec<Snippet>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .contents
            .iter()
            .enumerate()
            .map(|(i, c)| Snippet::new(self.name.as_str(), c.clone(), 1.0 - i as f32 * 0.1))
            .collect())
    }
}

pub struct FailingRetriever;

#[async_trait]
impl Retriever for FailingRetriever {
    fn name(&self) -> &str {
        "web"
    }

    async fn retrieve(&self, _query: &str) -> Result<Vec<Snippet>> {
        Err(AssistantError::UpstreamUnavailable("search backend down".to_string()))
    }
}
