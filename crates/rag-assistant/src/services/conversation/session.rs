use std::sync::Arc;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::config::ChatConfig;
use crate::models::chat::ChatMessage;
use crate::services::augmentor::RetrievalAugmentor;
use crate::services::conversation::memory::ChatMemory;
use crate::services::llm_service::ChatModel;
use crate::utils::error::Result;

/// One conversation with the assistant.
///
/// Each turn goes through the augmentor, then the model, and only a completed
/// exchange is written back to memory: a failed turn leaves the history as it was.
pub struct ChatSession {
    id: Uuid,
    model: Arc<dyn ChatModel>,
    augmentor: RetrievalAugmentor,
    memory: ChatMemory,
    system_role: Option<String>,
    default_role: String,
}

impl ChatSession {
    pub fn new(model: Arc<dyn ChatModel>, augmentor: RetrievalAugmentor, config: &ChatConfig) -> Self {
        Self {
            id: Uuid::new_v4(),
            model,
            augmentor,
            memory: ChatMemory::new(config.memory_window),
            system_role: None,
            default_role: config.default_role.clone(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Starts the conversation over with `role` as the only message.
    /// A blank role falls back to the default role.
    pub fn set_system_role(&mut self, role: &str) {
        let role = if role.trim().is_empty() {
            self.default_role.clone()
        } else {
            role.to_string()
        };

        debug!("Session {} system role set to {:?}", self.id, role);
        self.memory.clear();
        self.memory.add(ChatMessage::system(role.clone()));
        self.system_role = Some(role);
    }

    pub fn system_role(&self) -> Option<&str> {
        self.system_role.as_deref()
    }

    pub fn memory(&self) -> &ChatMemory {
        &self.memory
    }

    /// Sends one user turn and returns the assistant's reply.
    ///
    /// A blank prompt returns an empty reply without contacting any backend.
    #[instrument(skip(self, prompt), fields(session_id = %self.id))]
    pub async fn chat(&mut self, prompt: &str) -> Result<String> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Ok(String::new());
        }

        let augmented = self.augmentor.augment(prompt).await?;
        if augmented.is_augmented() {
            debug!("Prompt augmented with {} snippets", augmented.snippets.len());
        }

        let mut pending = self.memory.clone();
        pending.add(ChatMessage::user(augmented.text));

        let reply = self.model.generate(pending.messages()).await?;

        pending.add(ChatMessage::assistant(reply.clone()));
        self.memory = pending;

        info!("Turn completed, memory holds {} messages", self.memory.len());

        Ok(reply)
    }

    /// Sets the system role, which forgets prior turns, then chats.
    pub async fn chat_with_role(&mut self, role: &str, prompt: &str) -> Result<String> {
        self.set_system_role(role);
        self.chat(prompt).await
    }
}
