use std::fmt;

use super::settings::Settings;
use crate::utils::error::{AssistantError, Result};

/// API keys read from the environment. Never deserialized from the settings file.
#[derive(Clone)]
pub struct Credentials {
    pub gemini_api_key: String,
    /// Present only when web search is enabled.
    pub tavily_api_key: Option<String>,
}

impl Credentials {
    pub fn from_env(settings: &Settings) -> Result<Self> {
        Self::from_lookup(settings, |name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(settings: &Settings, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let gemini_api_key = require(&lookup, &settings.llm.api_key_env)?;

        let tavily_api_key = if settings.web_search.enabled {
            Some(require(&lookup, &settings.web_search.api_key_env)?)
        } else {
            None
        };

        Ok(Self {
            gemini_api_key,
            tavily_api_key,
        })
    }
}

fn require<F>(lookup: &F, name: &str) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(AssistantError::ConfigurationMissing(format!(
            "environment variable {} is not set",
            name
        ))),
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("gemini_api_key", &"***")
            .field("tavily_api_key", &self.tavily_api_key.as_ref().map(|_| "***"))
            .finish()
    }
}
