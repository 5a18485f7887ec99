pub mod chat;
pub mod snippet;

pub use chat::{ChatMessage, Role};
pub use snippet::Snippet;
