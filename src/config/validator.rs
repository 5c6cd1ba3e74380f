use crate::config::Config;
use crate::error::{RagError, Result, ValidationError};
use crate::relevance::{RelevanceThresholds, ScoringWeights};

/// Configuration validator
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the configuration, reporting every problem at once
    pub fn validate(config: &Config) -> Result<()> {
        let mut errors = Vec::new();

        Self::validate_schema_version(config, &mut errors);
        Self::validate_data(config, &mut errors);
        Self::validate_embedding(config, &mut errors);
        Self::validate_search(config, &mut errors);
        Self::validate_generation(config, &mut errors);
        Self::validate_relevance(config, &mut errors);
        Self::validate_timeouts(config, &mut errors);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(RagError::ConfigValidation { errors })
        }
    }

    fn validate_schema_version(config: &Config, errors: &mut Vec<ValidationError>) {
        let version = &config.meta.schema_version;
        if version != "1.0.0" {
            errors.push(ValidationError::new(
                "_meta.schema_version",
                format!("Unsupported schema version: {}", version),
            ));
        }
    }

    fn validate_data(config: &Config, errors: &mut Vec<ValidationError>) {
        // Existence is checked when documents are loaded; paths may contain ~
        if config.data.documents_file.as_os_str().is_empty() {
            errors.push(ValidationError::new(
                "data.documents_file",
                "Documents file path cannot be empty",
            ));
        }
    }

    fn validate_embedding(config: &Config, errors: &mut Vec<ValidationError>) {
        let provider = &config.embedding.provider;
        if provider != "http" && provider != "local" {
            errors.push(ValidationError::new(
                "embedding.provider",
                format!("Provider must be 'http' or 'local', got '{}'", provider),
            ));
        }

        if provider == "http" && config.embedding.endpoint.is_empty() {
            errors.push(ValidationError::new(
                "embedding.endpoint",
                "Endpoint is required for the http provider",
            ));
        }

        if config.embedding.model.is_empty() {
            errors.push(ValidationError::new(
                "embedding.model",
                "Model name cannot be empty",
            ));
        }

        if config.embedding.dimension == 0 {
            errors.push(ValidationError::new(
                "embedding.dimension",
                "Dimension must be greater than 0",
            ));
        }

        if config.embedding.concurrency == 0 {
            errors.push(ValidationError::new(
                "embedding.concurrency",
                "Concurrency must be greater than 0",
            ));
        }
    }

    fn validate_search(config: &Config, errors: &mut Vec<ValidationError>) {
        if config.search.hnsw_ef_construction == 0 {
            errors.push(ValidationError::new(
                "search.hnsw_ef_construction",
                "HNSW ef_construction must be greater than 0",
            ));
        }

        if config.search.hnsw_m == 0 {
            errors.push(ValidationError::new(
                "search.hnsw_m",
                "HNSW M must be greater than 0",
            ));
        }

        if config.search.hnsw_ef_search == 0 {
            errors.push(ValidationError::new(
                "search.hnsw_ef_search",
                "HNSW ef_search must be greater than 0",
            ));
        }
    }

    fn validate_generation(config: &Config, errors: &mut Vec<ValidationError>) {
        if config.generation.endpoint.is_empty() {
            errors.push(ValidationError::new(
                "generation.endpoint",
                "Endpoint cannot be empty",
            ));
        }

        if config.generation.model.is_empty() {
            errors.push(ValidationError::new(
                "generation.model",
                "Model name cannot be empty",
            ));
        }

        if config.generation.max_tokens == 0 {
            errors.push(ValidationError::new(
                "generation.max_tokens",
                "Max tokens must be greater than 0",
            ));
        }

        let temp = config.generation.temperature;
        if !(0.0..=2.0).contains(&temp) {
            errors.push(ValidationError::new(
                "generation.temperature",
                format!("Temperature must be between 0.0 and 2.0, got {}", temp),
            ));
        }
    }

    fn validate_relevance(config: &Config, errors: &mut Vec<ValidationError>) {
        if config.relevance.document_count == 0 {
            errors.push(ValidationError::new(
                "relevance.document_count",
                "Document count must be at least 1",
            ));
        }

        if let Err(e) = RelevanceThresholds::new(
            config.relevance.min_threshold,
            config.relevance.high_threshold,
        ) {
            errors.push(ValidationError::new("relevance.min_threshold", e.to_string()));
        }

        if let Err(e) = ScoringWeights::try_from(config.relevance.weights) {
            errors.push(ValidationError::new("relevance.weights", e.to_string()));
        }
    }

    fn validate_timeouts(config: &Config, errors: &mut Vec<ValidationError>) {
        if config.timeouts.provider_call_ms == Some(0) {
            errors.push(ValidationError::new(
                "timeouts.provider_call_ms",
                "Timeout must be greater than 0 (omit it to disable)",
            ));
        }
    }
}
