//! Console chat assistant over Gemini, with retrieval from a local document
//! index and live web search.

pub mod config;
pub mod document;
pub mod logging;
pub mod models;
pub mod services;
pub mod utils;

pub use config::{Credentials, Settings};
pub use services::{ChatSession, SessionBuilder};
pub use utils::error::{AssistantError, Result};
