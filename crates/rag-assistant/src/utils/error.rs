use thiserror::Error;

#[derive(Error, Debug)]
pub enum AssistantError {
    #[error("Missing configuration: {0}")]
    ConfigurationMissing(String),

    #[error("Invalid configuration: {0}")]
    Configuration(String),

    #[error("Resource not found: {0}")]
    ResourceNotFound(String),

    #[error("Document error: {0}")]
    Document(String),

    #[error("Index error: {0}")]
    Index(String),

    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),
}

impl AssistantError {
    /// Whether the error can only happen while the session is being built.
    pub fn is_startup_error(&self) -> bool {
        matches!(
            self,
            AssistantError::ConfigurationMissing(_)
                | AssistantError::Configuration(_)
                | AssistantError::ResourceNotFound(_)
                | AssistantError::Document(_)
        )
    }
}

impl From<config::ConfigError> for AssistantError {
    fn from(err: config::ConfigError) -> Self {
        AssistantError::Configuration(err.to_string())
    }
}

impl From<reqwest::Error> for AssistantError {
    fn from(err: reqwest::Error) -> Self {
        AssistantError::UpstreamUnavailable(err.to_string())
    }
}

pub type Result<T, E = AssistantError> = std::result::Result<T, E>;
