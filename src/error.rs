use crate::embedding::EmbeddingError;
use crate::generation::GenerationError;
use crate::search::SearchError;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Pipeline stage that talks to an external provider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Embedding,
    Search,
    Generation,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Embedding => "embedding",
            Stage::Search => "search",
            Stage::Generation => "generation",
        };
        f.write_str(name)
    }
}

/// Main error type for ragscope
#[derive(Error, Debug)]
pub enum RagError {
    /// Configuration related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Configuration validation errors
    #[error("Configuration validation failed: {errors:?}")]
    ConfigValidation { errors: Vec<ValidationError> },

    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// Invalid configuration value
    #[error("Invalid configuration value at {path}: {message}")]
    InvalidConfigValue { path: String, message: String },

    /// Query embedding failed
    #[error("Embedding stage failed: {0}")]
    Embedding(#[from] EmbeddingError),

    /// Document search failed
    #[error("Search stage failed: {0}")]
    Search(#[from] SearchError),

    /// Answer generation failed
    #[error("Generation stage failed: {0}")]
    Generation(#[from] GenerationError),

    /// Caller cancelled the query while a provider call was in flight
    #[error("Query cancelled during {stage} stage")]
    Cancelled { stage: Stage },

    /// Provider call exceeded the configured timeout
    #[error("{stage} stage timed out after {timeout_ms}ms")]
    TimedOut { stage: Stage, timeout_ms: u64 },

    /// IO errors
    #[error("IO error: {context}: {source}")]
    Io {
        source: std::io::Error,
        context: String,
    },

    /// TOML deserialization errors
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// TOML serialization errors
    #[error("TOML serialization error: {0}")]
    TomlSerialization(#[from] toml::ser::Error),

    /// JSON errors
    #[error("JSON error: {context}: {source}")]
    Json {
        source: serde_json::Error,
        context: String,
    },

    /// Generic errors
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl RagError {
    /// The provider stage this error originated from, if any
    pub fn stage(&self) -> Option<Stage> {
        match self {
            RagError::Embedding(_) => Some(Stage::Embedding),
            RagError::Search(_) => Some(Stage::Search),
            RagError::Generation(_) => Some(Stage::Generation),
            RagError::Cancelled { stage } | RagError::TimedOut { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    /// Whether the error is scoped to a single query (the caller may retry)
    pub fn is_recoverable(&self) -> bool {
        self.stage().is_some()
    }
}

/// Configuration validation error
#[derive(Debug, Clone)]
pub struct ValidationError {
    /// Path to the configuration key that failed validation
    pub path: String,
    /// Error message describing the validation failure
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Result type for ragscope operations
pub type Result<T> = std::result::Result<T, RagError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_is_reported_for_provider_errors() {
        let err = RagError::from(SearchError::Backend("index offline".to_string()));
        assert_eq!(err.stage(), Some(Stage::Search));
        assert!(err.is_recoverable());
        assert!(err.to_string().contains("index offline"));
    }

    #[test]
    fn test_config_errors_are_fatal() {
        let err = RagError::Config("missing endpoint".to_string());
        assert_eq!(err.stage(), None);
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_timeout_message_names_stage() {
        let err = RagError::TimedOut {
            stage: Stage::Generation,
            timeout_ms: 1500,
        };
        assert_eq!(err.to_string(), "generation stage timed out after 1500ms");
    }
}
