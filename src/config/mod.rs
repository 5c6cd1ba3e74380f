//! Configuration management for ragscope
//!
//! Configuration is a TOML file, optionally adjusted by a named profile and
//! `RAGSCOPE_SECTION__KEY` environment variables, and validated as a whole
//! before any query runs.

use crate::error::{RagError, Result};
use crate::quality::IngestionQualityScorer;
use crate::relevance::{
    DomainVocabulary, RelevanceScorer, RelevanceThresholds, ScoringWeights, WeightsSpec,
};
use crate::search::{HnswParams, SearchMode};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

mod validator;

pub use validator::ConfigValidator;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(rename = "_meta")]
    pub meta: MetaConfig,
    pub data: DataConfig,
    pub embedding: EmbeddingConfig,
    pub search: SearchConfig,
    pub generation: GenerationConfig,
    pub relevance: RelevanceConfig,
    #[serde(default)]
    pub domain: DomainConfig,
    #[serde(default)]
    pub timeouts: TimeoutConfig,
    #[serde(default)]
    pub profiles: HashMap<String, ProfileOverrides>,
}

/// Metadata about the configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetaConfig {
    pub schema_version: String,
    #[serde(default = "current_timestamp")]
    pub created_at: String,
    #[serde(default = "current_timestamp")]
    pub last_modified: String,
}

fn current_timestamp() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// Document collection location
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    pub documents_file: PathBuf,
}

/// Embedding configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// "http" (OpenAI-compatible endpoint) or "local" (fastembed)
    pub provider: String,
    pub model: String,
    pub dimension: usize,
    pub endpoint: String,
    /// Name of the environment variable holding the API key
    pub api_key_env: String,
    /// Embedding requests in flight during ingestion
    pub concurrency: usize,
}

/// Search configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    pub mode: SearchMode,
    pub hnsw_m: usize,
    pub hnsw_ef_construction: usize,
    pub hnsw_ef_search: usize,
}

impl SearchConfig {
    pub fn hnsw_params(&self) -> HnswParams {
        HnswParams {
            m: self.hnsw_m,
            ef_construction: self.hnsw_ef_construction,
            ef_search: self.hnsw_ef_search,
        }
    }
}

/// Chat completion configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    pub endpoint: String,
    pub model: String,
    pub api_key_env: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

/// Relevance scoring configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelevanceConfig {
    /// Hits requested from search per query
    pub document_count: usize,
    pub min_threshold: f64,
    pub high_threshold: f64,
    pub weights: WeightsSpec,
}

/// Domain vocabularies used by the relevance and quality scorers
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DomainConfig {
    /// Terms counted by the business-context score and terminology density
    pub vocabulary: Vec<String>,
    /// Terms counted as actionable language during quality scoring
    pub actionable_terms: Vec<String>,
}

impl Default for DomainConfig {
    fn default() -> Self {
        Self {
            vocabulary: Vec::new(),
            actionable_terms: [
                "recommend",
                "should",
                "strategy",
                "action",
                "implement",
                "optimize",
                "improve",
                "increase",
                "reduce",
                "focus",
                "target",
                "opportunity",
                "advantage",
                "leverage",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

/// Provider call timeouts
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TimeoutConfig {
    /// Upper bound for each embedding/search/generation call; unbounded when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_call_ms: Option<u64>,
}

impl TimeoutConfig {
    pub fn provider_call(&self) -> Option<Duration> {
        self.provider_call_ms.map(Duration::from_millis)
    }
}

/// Profile-specific configuration overrides
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embedding_provider: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embedding_model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_mode: Option<SearchMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_threshold: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub high_threshold: Option<f64>,
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self> {
        let mut config = Self::read(path)?;

        // Apply environment variable overrides
        config.apply_env_overrides();

        ConfigValidator::validate(&config)?;

        Ok(config)
    }

    /// Load configuration with a specific profile applied
    ///
    /// Environment overrides win over the profile.
    pub fn load_with_profile(path: &Path, profile: &str) -> Result<Self> {
        let mut config = Self::read(path)?;
        config.apply_profile(profile)?;
        config.apply_env_overrides();

        ConfigValidator::validate(&config)?;

        Ok(config)
    }

    fn read(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(RagError::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| RagError::Io {
            source: e,
            context: format!("Failed to read config file: {:?}", path),
        })?;
        Ok(toml::from_str(&content)?)
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|e| RagError::Io {
            source: e,
            context: format!("Failed to write config file: {:?}", path),
        })?;
        Ok(())
    }

    /// Apply a profile's overrides to the configuration
    pub fn apply_profile(&mut self, profile: &str) -> Result<()> {
        let overrides = self
            .profiles
            .get(profile)
            .cloned()
            .ok_or_else(|| RagError::Config(format!("Unknown profile '{}'", profile)))?;

        if let Some(provider) = overrides.embedding_provider {
            self.embedding.provider = provider;
        }
        if let Some(model) = overrides.embedding_model {
            self.embedding.model = model;
        }
        if let Some(mode) = overrides.search_mode {
            self.search.mode = mode;
        }
        if let Some(model) = overrides.generation_model {
            self.generation.model = model;
        }
        if let Some(count) = overrides.document_count {
            self.relevance.document_count = count;
        }
        if let Some(min) = overrides.min_threshold {
            self.relevance.min_threshold = min;
        }
        if let Some(high) = overrides.high_threshold {
            self.relevance.high_threshold = high;
        }

        tracing::debug!("Applied profile '{}'", profile);
        Ok(())
    }

    /// Apply environment variable overrides
    /// Environment variables in format: RAGSCOPE_SECTION__KEY=value
    pub fn apply_env_overrides(&mut self) {
        for (key, value) in std::env::vars() {
            if let Some(config_key) = key.strip_prefix("RAGSCOPE_") {
                if let Err(e) = self.set_value_from_env(config_key, &value) {
                    tracing::warn!("Failed to apply env override {}: {}", key, e);
                }
            }
        }
    }

    fn set_value_from_env(&mut self, path: &str, value: &str) -> Result<()> {
        match path {
            "DATA__DOCUMENTS_FILE" => {
                self.data.documents_file = PathBuf::from(value);
            }
            "EMBEDDING__PROVIDER" => {
                self.embedding.provider = value.to_string();
            }
            "EMBEDDING__MODEL" => {
                self.embedding.model = value.to_string();
            }
            "EMBEDDING__ENDPOINT" => {
                self.embedding.endpoint = value.to_string();
            }
            "SEARCH__MODE" => {
                self.search.mode = value
                    .parse()
                    .map_err(|message| RagError::InvalidConfigValue {
                        path: path.to_string(),
                        message,
                    })?;
            }
            "GENERATION__ENDPOINT" => {
                self.generation.endpoint = value.to_string();
            }
            "GENERATION__MODEL" => {
                self.generation.model = value.to_string();
            }
            "RELEVANCE__DOCUMENT_COUNT" => {
                self.relevance.document_count = parse_env(path, value)?;
            }
            "RELEVANCE__MIN_THRESHOLD" => {
                self.relevance.min_threshold = parse_env(path, value)?;
            }
            "RELEVANCE__HIGH_THRESHOLD" => {
                self.relevance.high_threshold = parse_env(path, value)?;
            }
            "TIMEOUTS__PROVIDER_CALL_MS" => {
                self.timeouts.provider_call_ms = Some(parse_env(path, value)?);
            }
            _ => {
                tracing::debug!("Unknown env config key: {}", path);
            }
        }
        Ok(())
    }

    /// Validated fusion weights
    pub fn scoring_weights(&self) -> Result<ScoringWeights> {
        ScoringWeights::try_from(self.relevance.weights).map_err(|e| {
            RagError::InvalidConfigValue {
                path: "relevance.weights".to_string(),
                message: e.to_string(),
            }
        })
    }

    /// Validated relevance thresholds
    pub fn thresholds(&self) -> Result<RelevanceThresholds> {
        RelevanceThresholds::new(self.relevance.min_threshold, self.relevance.high_threshold)
            .map_err(|e| RagError::InvalidConfigValue {
                path: "relevance".to_string(),
                message: e.to_string(),
            })
    }

    /// Relevance scorer built from the relevance and domain sections
    pub fn relevance_scorer(&self) -> Result<RelevanceScorer> {
        Ok(RelevanceScorer::new(
            self.scoring_weights()?,
            self.thresholds()?,
            DomainVocabulary::new(&self.domain.vocabulary),
        ))
    }

    /// Quality scorer built from the domain section
    pub fn quality_scorer(&self) -> Result<IngestionQualityScorer> {
        IngestionQualityScorer::new(
            DomainVocabulary::new(&self.domain.vocabulary),
            DomainVocabulary::new(&self.domain.actionable_terms),
        )
    }

    /// Get the default configuration file path
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| RagError::Config("Cannot determine config directory".to_string()))?;

        Ok(config_dir.join("ragscope").join("config.toml"))
    }
}

fn parse_env<T: std::str::FromStr>(path: &str, value: &str) -> Result<T> {
    value.parse().map_err(|_| RagError::InvalidConfigValue {
        path: path.to_string(),
        message: format!("Cannot parse '{}'", value),
    })
}

impl Default for Config {
    fn default() -> Self {
        Self {
            meta: MetaConfig {
                schema_version: "1.0.0".to_string(),
                created_at: current_timestamp(),
                last_modified: current_timestamp(),
            },
            data: DataConfig {
                documents_file: PathBuf::from("~/.ragscope/documents.json"),
            },
            embedding: EmbeddingConfig {
                provider: "local".to_string(),
                model: "all-MiniLM-L6-v2".to_string(),
                dimension: 384,
                endpoint: "https://api.openai.com/v1".to_string(),
                api_key_env: "OPENAI_API_KEY".to_string(),
                concurrency: 4,
            },
            search: SearchConfig {
                mode: SearchMode::Vector,
                hnsw_m: 16,
                hnsw_ef_construction: 200,
                hnsw_ef_search: 64,
            },
            generation: GenerationConfig {
                endpoint: "https://api.openai.com/v1".to_string(),
                model: "gpt-4o-mini".to_string(),
                api_key_env: "OPENAI_API_KEY".to_string(),
                max_tokens: 500,
                temperature: 0.7,
            },
            relevance: RelevanceConfig {
                document_count: 5,
                min_threshold: 0.60,
                high_threshold: 0.80,
                weights: ScoringWeights::default().into(),
            },
            domain: DomainConfig::default(),
            timeouts: TimeoutConfig::default(),
            profiles: HashMap::new(),
        }
    }
}
