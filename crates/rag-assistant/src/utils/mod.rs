pub mod error;
pub mod similarity;

pub use error::{AssistantError, Result};
pub use similarity::cosine_similarity;
