use crate::models::chat::ChatMessage;

/// Rolling window of the most recent messages.
///
/// Capacity counts every message, system message included. The system message is
/// pinned to slot 0 and never evicted; adding a new one replaces it.
#[derive(Debug, Clone)]
pub struct ChatMemory {
    max_messages: usize,
    messages: Vec<ChatMessage>,
}

impl ChatMemory {
    pub fn new(max_messages: usize) -> Self {
        Self {
            max_messages,
            messages: Vec::with_capacity(max_messages + 1),
        }
    }

    pub fn add(&mut self, message: ChatMessage) {
        if message.is_system() {
            self.messages.retain(|m| !m.is_system());
            self.messages.insert(0, message);
        } else {
            self.messages.push(message);
        }
        self.enforce_window();
    }

    fn enforce_window(&mut self) {
        while self.messages.len() > self.max_messages {
            match self.messages.iter().position(|m| !m.is_system()) {
                Some(oldest) => {
                    self.messages.remove(oldest);
                }
                None => break,
            }
        }
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn system_message(&self) -> Option<&ChatMessage> {
        self.messages.first().filter(|m| m.is_system())
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.max_messages
    }
}
