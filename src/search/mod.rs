mod keyword_index;
mod local;
/// Document search
///
/// Architecture:
/// - SearchProvider trait: query vector + query text in, ranked hits out
/// - LocalSearchIndex: in-memory implementation over embedded documents
/// - HNSW (hnsw_rs) for cosine similarity search
/// - Tantivy for BM25 keyword search
mod vector_index;

pub use keyword_index::{KeywordIndex, KeywordIndexError, KeywordSearchResult};
pub use local::{HnswParams, LocalSearchIndex};
pub use vector_index::{SearchResult, VectorIndex, VectorIndexError};

use crate::documents::KnowledgeDocument;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Search backend failed: {0}")]
    Backend(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Invalid document {id}: {message}")]
    InvalidDocument { id: String, message: String },

    #[error(transparent)]
    Keyword(#[from] KeywordIndexError),

    #[error(transparent)]
    Vector(#[from] VectorIndexError),
}

/// One candidate returned for a query
///
/// `raw_score` is only comparable within the result set it came from.
#[derive(Debug, Clone)]
pub struct SearchHit {
    pub document: KnowledgeDocument,
    pub raw_score: f64,
}

impl SearchHit {
    pub fn new(document: KnowledgeDocument, raw_score: f64) -> Self {
        Self {
            document,
            raw_score,
        }
    }
}

/// How a search provider ranks candidates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    /// Cosine similarity over embeddings
    #[default]
    Vector,
    /// BM25 over title and content
    Lexical,
}

impl fmt::Display for SearchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchMode::Vector => f.write_str("vector"),
            SearchMode::Lexical => f.write_str("lexical"),
        }
    }
}

impl FromStr for SearchMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "vector" => Ok(SearchMode::Vector),
            "lexical" | "keyword" => Ok(SearchMode::Lexical),
            other => Err(format!(
                "Unknown search mode '{}' (expected vector or lexical)",
                other
            )),
        }
    }
}

/// Trait for search backends
///
/// Returns at most `top_k` hits in provider-defined order. Implementations
/// decide whether they use the vector, the text, or both.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    async fn search(
        &self,
        query_vector: &[f32],
        query_text: &str,
        top_k: usize,
    ) -> Result<Vec<SearchHit>, SearchError>;
}
