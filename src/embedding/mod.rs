mod batch;
/// Embedding generation
///
/// Architecture:
/// - EmbeddingProvider trait for abstraction over backends
/// - HttpEmbeddingProvider for OpenAI-compatible embedding services
/// - FastEmbedProvider for local embedding (all-MiniLM-L6-v2, 384-dim)
/// - BatchEmbedder for bounded-concurrency ingestion
mod provider;

pub use batch::{BatchEmbedder, BatchResult, IngestProgress};
pub use provider::{EmbeddingError, EmbeddingProvider, FastEmbedProvider, HttpEmbeddingProvider};

use crate::config::EmbeddingConfig;
use crate::error::{RagError, Result};
use std::sync::Arc;

/// Build the embedding provider selected by configuration
pub fn create_provider(config: &EmbeddingConfig) -> Result<Arc<dyn EmbeddingProvider>> {
    match config.provider.as_str() {
        "http" => {
            let api_key = std::env::var(&config.api_key_env).map_err(|_| {
                RagError::Config(format!(
                    "Environment variable {} is not set",
                    config.api_key_env
                ))
            })?;
            let provider = HttpEmbeddingProvider::new(
                &config.endpoint,
                api_key,
                &config.model,
                config.dimension,
            )?;
            Ok(Arc::new(provider))
        }
        "local" => Ok(Arc::new(FastEmbedProvider::new(&config.model)?)),
        other => Err(RagError::InvalidConfigValue {
            path: "embedding.provider".to_string(),
            message: format!("Unknown embedding provider '{}'", other),
        }),
    }
}
