//! Document data shapes shared by ingestion, search and relevance scoring
//!
//! Loaders only need to produce a [`DocumentSet`]; the JSON form accepted here
//! is either `{ "metadata": {...}, "documents": [...] }` or a bare array.

use crate::error::{RagError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A document as produced by ingestion, before it is embedded
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceDocument {
    pub id: String,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub source: String,
}

impl SourceDocument {
    pub fn new(id: impl Into<String>, title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            content: content.into(),
            ..Default::default()
        }
    }
}

/// An indexed document
///
/// Immutable once indexed; re-ingestion replaces it wholesale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeDocument {
    pub id: String,
    pub title: String,
    pub content: String,
    pub embedding_vector: Vec<f32>,
}

impl KnowledgeDocument {
    pub fn from_source(source: SourceDocument, embedding_vector: Vec<f32>) -> Self {
        Self {
            id: source.id,
            title: source.title,
            content: source.content,
            embedding_vector,
        }
    }

    /// Title and content joined the way lexical scoring sees them
    pub fn full_text(&self) -> String {
        format!("{} {}", self.title, self.content)
    }
}

/// Presentation metadata shipped alongside a document collection
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AssistantProfile {
    pub title: String,
    pub welcome_message: String,
    pub capability_description: String,
    pub system_prompt: String,
    pub help_examples: Vec<String>,
    pub tips: Vec<String>,
    pub encouragements: Vec<String>,
    pub error_advice: Vec<String>,
}

impl Default for AssistantProfile {
    fn default() -> Self {
        Self {
            title: "RAG Assistant".to_string(),
            welcome_message: "Welcome to your AI-powered assistant!".to_string(),
            capability_description: "I can help you find information and answer questions"
                .to_string(),
            system_prompt: "You are a helpful assistant answering questions based on the provided \
                            context. Use the following context to answer the user's question. If \
                            the context doesn't contain relevant information, say so."
                .to_string(),
            help_examples: Vec::new(),
            tips: Vec::new(),
            encouragements: Vec::new(),
            error_advice: Vec::new(),
        }
    }
}

/// A document collection plus its assistant profile
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentSet {
    #[serde(default)]
    pub metadata: AssistantProfile,
    pub documents: Vec<SourceDocument>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DocumentSetForm {
    Wrapped(DocumentSet),
    Bare(Vec<SourceDocument>),
}

impl DocumentSet {
    /// Parse a document set from JSON text
    pub fn from_json(json: &str) -> Result<Self> {
        let form: DocumentSetForm = serde_json::from_str(json).map_err(|e| RagError::Json {
            source: e,
            context: "Failed to parse document set".to_string(),
        })?;

        Ok(match form {
            DocumentSetForm::Wrapped(set) => set,
            DocumentSetForm::Bare(documents) => DocumentSet {
                metadata: AssistantProfile::default(),
                documents,
            },
        })
    }

    /// Load a document set from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| RagError::Io {
            source: e,
            context: format!("Failed to read document file: {:?}", path),
        })?;
        let set = Self::from_json(&content)?;
        tracing::info!("Loaded {} documents from {:?}", set.documents.len(), path);
        Ok(set)
    }
}
