mod chat;
/// Answer generation
///
/// - GenerationProvider trait: question + context + system prompt in, text out
/// - ChatCompletionsProvider for OpenAI-compatible chat endpoints
pub use chat::ChatCompletionsProvider;

use crate::config::GenerationConfig;
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Prompt body used in place of the context block when nothing passed the threshold
pub const NO_CONTEXT_PLACEHOLDER: &str = "No relevant context found.";

/// Text returned when the model produced no choices
pub const EMPTY_RESPONSE_FALLBACK: &str = "Sorry, I couldn't generate a response.";

#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("Generation client initialization failed: {0}")]
    InitializationError(String),

    #[error("Generation request failed: {0}")]
    RequestError(String),

    #[error("Generation API error: {status} - {body}")]
    ApiError { status: u16, body: String },

    #[error("Invalid generation response: {0}")]
    InvalidResponse(String),
}

/// Trait for text generation backends
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    /// Answer `question` using `context`; an empty context is allowed
    async fn generate(
        &self,
        question: &str,
        context: &str,
        system_prompt: &str,
    ) -> std::result::Result<String, GenerationError>;
}

/// System message sent ahead of the user question
pub fn build_system_message(system_prompt: &str, context: &str) -> String {
    let context = if context.trim().is_empty() {
        NO_CONTEXT_PLACEHOLDER
    } else {
        context
    };
    format!("{}\n\nContext:\n{}", system_prompt, context)
}

/// Build the chat-completions client described by configuration
///
/// A missing API key variable is not an error: requests are then sent without
/// an `Authorization` header, which is what local OpenAI-compatible servers expect.
pub fn create_provider(config: &GenerationConfig) -> Result<Arc<dyn GenerationProvider>> {
    let api_key = std::env::var(&config.api_key_env).unwrap_or_else(|_| {
        tracing::warn!(
            "{} is not set; sending generation requests without an API key",
            config.api_key_env
        );
        String::new()
    });

    let provider = ChatCompletionsProvider::new(&config.endpoint, api_key, &config.model)?
        .with_sampling(config.max_tokens, config.temperature);
    Ok(Arc::new(provider))
}
