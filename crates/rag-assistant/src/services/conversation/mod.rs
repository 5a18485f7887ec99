//! Conversation state: the rolling message window and the session driving each turn.

mod builder;
pub mod memory;
pub mod session;

pub use builder::SessionBuilder;
pub use memory::ChatMemory;
pub use session::ChatSession;
