//! Query pipeline: embed, search, score, assemble, generate
//!
//! The orchestrator is stateless between calls; it only holds the injected
//! providers and scoring configuration, so concurrent queries are independent.

mod ingest;

pub use ingest::{IngestOutcome, IngestPipeline};

use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result, Stage};
use crate::generation::GenerationProvider;
use crate::relevance::{
    ContextAssembler, ContextStats, RelevanceScorer, RelevanceValidationResult,
};
use crate::search::{SearchHit, SearchProvider};
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Full outcome of one answered query
#[derive(Debug, Clone)]
pub struct RagAnswer {
    pub answer: String,
    pub validation: RelevanceValidationResult,
    pub context_stats: ContextStats,
    pub elapsed: Duration,
}

pub struct RagOrchestrator {
    embedder: Arc<dyn EmbeddingProvider>,
    searcher: Arc<dyn SearchProvider>,
    generator: Arc<dyn GenerationProvider>,
    scorer: RelevanceScorer,
    assembler: ContextAssembler,
    call_timeout: Option<Duration>,
}

impl RagOrchestrator {
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        searcher: Arc<dyn SearchProvider>,
        generator: Arc<dyn GenerationProvider>,
        scorer: RelevanceScorer,
    ) -> Self {
        Self {
            embedder,
            searcher,
            generator,
            scorer,
            assembler: ContextAssembler::new(),
            call_timeout: None,
        }
    }

    /// Bound every provider call by `timeout`
    pub fn with_call_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.call_timeout = timeout;
        self
    }

    pub fn scorer(&self) -> &RelevanceScorer {
        &self.scorer
    }

    /// Answer `question` using up to `document_count` retrieved documents
    pub async fn answer_query(
        &self,
        question: &str,
        system_prompt: &str,
        document_count: usize,
    ) -> Result<String> {
        self.answer_query_with(question, system_prompt, document_count, &CancellationToken::new())
            .await
            .map(|outcome| outcome.answer)
    }

    /// Answer `question`, aborting the in-flight provider call when `cancel` fires
    pub async fn answer_query_with(
        &self,
        question: &str,
        system_prompt: &str,
        document_count: usize,
        cancel: &CancellationToken,
    ) -> Result<RagAnswer> {
        let start = Instant::now();

        let (hits, validation) = self.retrieve(question, document_count, cancel).await?;

        let assembled = self.assembler.assemble_with_stats(&validation, &hits);
        if assembled.is_empty() {
            info!("No documents passed the relevance threshold; generating without context");
        }

        let answer = self
            .run_stage(
                Stage::Generation,
                cancel,
                self.generator
                    .generate(question, &assembled.text, system_prompt),
            )
            .await?;

        let elapsed = start.elapsed();
        info!(
            "Answered query in {}ms ({})",
            elapsed.as_millis(),
            validation.summary()
        );

        Ok(RagAnswer {
            answer,
            validation,
            context_stats: assembled.stats,
            elapsed,
        })
    }

    /// Score the hits for `question` without generating an answer
    pub async fn analyze_relevance(
        &self,
        question: &str,
        document_count: usize,
    ) -> Result<RelevanceValidationResult> {
        self.analyze_relevance_with(question, document_count, &CancellationToken::new())
            .await
    }

    pub async fn analyze_relevance_with(
        &self,
        question: &str,
        document_count: usize,
        cancel: &CancellationToken,
    ) -> Result<RelevanceValidationResult> {
        let (_, validation) = self.retrieve(question, document_count, cancel).await?;
        Ok(validation)
    }

    async fn retrieve(
        &self,
        question: &str,
        document_count: usize,
        cancel: &CancellationToken,
    ) -> Result<(Vec<SearchHit>, RelevanceValidationResult)> {
        if document_count == 0 {
            return Err(RagError::InvalidConfigValue {
                path: "relevance.document_count".to_string(),
                message: "Document count must be at least 1".to_string(),
            });
        }

        let query_vector = self
            .run_stage(Stage::Embedding, cancel, self.embedder.embed(question))
            .await?;
        debug!("Embedded query ({} dimensions)", query_vector.len());

        let hits = self
            .run_stage(
                Stage::Search,
                cancel,
                self.searcher.search(&query_vector, question, document_count),
            )
            .await?;
        debug!("Search returned {} hits", hits.len());

        let validation = self.scorer.validate(question, &hits);
        info!("{}", validation.summary());

        Ok((hits, validation))
    }

    /// Run one provider call under the cancellation token and the call timeout
    async fn run_stage<T, E, F>(&self, stage: Stage, cancel: &CancellationToken, call: F) -> Result<T>
    where
        F: Future<Output = std::result::Result<T, E>>,
        E: Into<RagError>,
    {
        let bounded = async {
            let outcome: Result<T> = match self.call_timeout {
                Some(limit) => match tokio::time::timeout(limit, call).await {
                    Ok(result) => result.map_err(Into::into),
                    Err(_) => Err(RagError::TimedOut {
                        stage,
                        timeout_ms: limit.as_millis() as u64,
                    }),
                },
                None => call.await.map_err(Into::into),
            };
            outcome
        };

        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!("Cancelled during {} stage", stage);
                Err(RagError::Cancelled { stage })
            }
            result = bounded => result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::documents::KnowledgeDocument;
    use crate::embedding::EmbeddingError;
    use crate::generation::GenerationError;
    use crate::search::SearchError;
    use async_trait::async_trait;

    struct UnitEmbedder;

    #[async_trait]
    impl EmbeddingProvider for UnitEmbedder {
        async fn embed(&self, _text: &str) -> std::result::Result<Vec<f32>, EmbeddingError> {
            Ok(vec![1.0, 0.0])
        }

        fn dimension(&self) -> usize {
            2
        }

        fn model_name(&self) -> &str {
            "unit"
        }
    }

    struct OneHit;

    #[async_trait]
    impl SearchProvider for OneHit {
        async fn search(
            &self,
            _query_vector: &[f32],
            _query_text: &str,
            _top_k: usize,
        ) -> std::result::Result<Vec<SearchHit>, SearchError> {
            Ok(vec![SearchHit::new(
                KnowledgeDocument {
                    id: "1".to_string(),
                    title: "Apples".to_string(),
                    content: "Apples are cheapest in autumn".to_string(),
                    embedding_vector: vec![1.0, 0.0],
                },
                0.9,
            )])
        }
    }

    /// Never answers
    struct Hanging;

    #[async_trait]
    impl GenerationProvider for Hanging {
        async fn generate(
            &self,
            _question: &str,
            _context: &str,
            _system_prompt: &str,
        ) -> std::result::Result<String, GenerationError> {
            std::future::pending().await
        }
    }

    fn orchestrator() -> RagOrchestrator {
        RagOrchestrator::new(
            Arc::new(UnitEmbedder),
            Arc::new(OneHit),
            Arc::new(Hanging),
            RelevanceScorer::default(),
        )
    }

    #[tokio::test]
    async fn test_timeout_names_generation_stage() {
        let orchestrator = orchestrator().with_call_timeout(Some(Duration::from_millis(20)));
        let err = orchestrator
            .answer_query("apples", "prompt", 3)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            RagError::TimedOut {
                stage: Stage::Generation,
                timeout_ms: 20
            }
        ));
    }

    #[tokio::test]
    async fn test_cancellation_aborts_pending_call() {
        let orchestrator = orchestrator();
        let cancel = CancellationToken::new();

        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            trigger.cancel();
        });

        let err = orchestrator
            .answer_query_with("apples", "prompt", 3, &cancel)
            .await
            .unwrap_err();
        assert_eq!(err.stage(), Some(Stage::Generation));
        assert!(matches!(err, RagError::Cancelled { .. }));
    }

    #[tokio::test]
    async fn test_pre_cancelled_token_stops_at_embedding() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let err = orchestrator()
            .analyze_relevance_with("apples", 3, &cancel)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            RagError::Cancelled {
                stage: Stage::Embedding
            }
        ));
    }

    #[tokio::test]
    async fn test_zero_document_count_rejected() {
        let err = orchestrator().analyze_relevance("apples", 0).await.unwrap_err();
        assert!(matches!(err, RagError::InvalidConfigValue { .. }));
    }
}
