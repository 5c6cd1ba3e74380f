//! Ingestion-to-answer integration tests
//!
//! Loads a document set from disk, ingests it into the local index and runs
//! queries through the orchestrator. Only generation is stubbed.

use async_trait::async_trait;
use ragscope::config::Config;
use ragscope::documents::DocumentSet;
use ragscope::embedding::{EmbeddingError, EmbeddingProvider, FastEmbedProvider};
use ragscope::generation::{GenerationError, GenerationProvider};
use ragscope::rag::{IngestPipeline, RagOrchestrator};
use ragscope::search::{SearchMode, SearchProvider};
use std::sync::Arc;
use tempfile::TempDir;

const DOCUMENTS: &str = r#"{
    "metadata": {
        "title": "Grocery Assistant",
        "systemPrompt": "Answer using the grocery context.",
        "tips": ["Ask about a specific city"]
    },
    "documents": [
        {
            "id": "apples",
            "title": "Apple prices",
            "content": "Apples market price in Brussels dropped 12% in Q3 2025. We recommend buying in autumn."
        },
        {
            "id": "bread",
            "title": "Bakery hours",
            "content": "Most bakeries open at 7:00 and close at 18:00 on weekdays."
        },
        {
            "id": "pears",
            "title": "Pear harvest",
            "content": "Pear harvest volume rose 8% while the market price stayed flat."
        }
    ]
}"#;

/// Bag-of-topics embedding: one axis per topic word
struct TopicEmbedder;

const TOPICS: [&str; 3] = ["apple", "bread", "pear"];

#[async_trait]
impl EmbeddingProvider for TopicEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let lowered = text.to_lowercase();
        let mut vector: Vec<f32> = TOPICS
            .iter()
            .map(|t| if lowered.contains(t) { 1.0 } else { 0.0 })
            .collect();
        // keep every vector non-zero for cosine distance
        vector.push(0.1);
        Ok(vector)
    }

    fn dimension(&self) -> usize {
        TOPICS.len() + 1
    }

    fn model_name(&self) -> &str {
        "topics"
    }
}

struct EchoGenerator;

#[async_trait]
impl GenerationProvider for EchoGenerator {
    async fn generate(
        &self,
        _question: &str,
        context: &str,
        _system_prompt: &str,
    ) -> Result<String, GenerationError> {
        Ok(context.to_string())
    }
}

fn write_documents(dir: &TempDir) -> std::path::PathBuf {
    let path = dir.path().join("documents.json");
    std::fs::write(&path, DOCUMENTS).unwrap();
    path
}

async fn ingest(mode: SearchMode) -> (RagOrchestrator, DocumentSet) {
    let dir = TempDir::new().unwrap();
    let set = DocumentSet::load(&write_documents(&dir)).unwrap();

    let mut config = Config::default();
    config.search.mode = mode;
    config.domain.vocabulary = vec!["price".to_string(), "market".to_string()];

    let embedder: Arc<dyn EmbeddingProvider> = Arc::new(TopicEmbedder);
    let pipeline = IngestPipeline::new(
        Arc::clone(&embedder),
        config.embedding.concurrency,
        config.quality_scorer().unwrap(),
        config.search.mode,
        config.search.hnsw_params(),
    );
    let outcome = pipeline.run(set.documents.clone(), |_| {}).await.unwrap();
    assert_eq!(outcome.index.len(), 3);
    assert_eq!(outcome.quality.len(), 3);

    let orchestrator = RagOrchestrator::new(
        embedder,
        Arc::new(outcome.index),
        Arc::new(EchoGenerator),
        config.relevance_scorer().unwrap(),
    );
    (orchestrator, set)
}

#[tokio::test]
async fn test_vector_mode_answers_from_matching_document() {
    let (orchestrator, set) = ingest(SearchMode::Vector).await;
    assert_eq!(set.metadata.title, "Grocery Assistant");

    let context = orchestrator
        .answer_query(
            "What is the apple market price?",
            &set.metadata.system_prompt,
            2,
        )
        .await
        .unwrap();

    assert!(context.starts_with("Document 1: Apple prices"));
    assert!(!context.contains("Bakery hours"));
}

#[tokio::test]
async fn test_lexical_mode_ranks_by_bm25() {
    let (orchestrator, _) = ingest(SearchMode::Lexical).await;

    let validation = orchestrator
        .analyze_relevance("bakeries open weekdays", 3)
        .await
        .unwrap();

    assert!(validation.total_documents >= 1);
    let best = validation.ranked()[0];
    assert_eq!(best.document_id, "bread");
    assert_eq!(best.search_rank, 0);
}

#[tokio::test]
async fn test_reports_render_for_ingested_collection() {
    let (orchestrator, _) = ingest(SearchMode::Vector).await;

    let validation = orchestrator
        .analyze_relevance("apple market price", 3)
        .await
        .unwrap();

    let report = validation.detailed_report();
    assert!(report.contains("Apple prices"));
    assert!(validation.summary().starts_with("Validation: "));
    assert_eq!(validation.total_documents, 3);
}

#[tokio::test]
#[ignore] // Requires model download (~90MB) - run with: cargo test -- --ignored
async fn test_local_model_end_to_end() {
    let dir = TempDir::new().unwrap();
    let set = DocumentSet::load(&write_documents(&dir)).unwrap();
    let config = Config::default();

    let embedder: Arc<dyn EmbeddingProvider> = Arc::new(
        FastEmbedProvider::new(&config.embedding.model)
            .expect("Failed to initialize embedding provider"),
    );
    let pipeline = IngestPipeline::new(
        Arc::clone(&embedder),
        config.embedding.concurrency,
        config.quality_scorer().unwrap(),
        SearchMode::Vector,
        config.search.hnsw_params(),
    );
    let outcome = pipeline.run(set.documents, |_| {}).await.unwrap();

    let query = embedder.embed("When do bakeries open?").await.unwrap();
    let hits = outcome
        .index
        .search(&query, "When do bakeries open?", 1)
        .await
        .unwrap();
    assert_eq!(hits[0].document.id, "bread");
}
