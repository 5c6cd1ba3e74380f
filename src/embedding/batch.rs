/// Bounded-concurrency embedding of source documents during ingestion
use super::EmbeddingProvider;
use crate::documents::{KnowledgeDocument, SourceDocument};
use anyhow::Result;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

/// Progress snapshot, reported once per completed document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestProgress {
    pub completed: usize,
    pub total: usize,
}

impl IngestProgress {
    pub fn percentage(&self) -> usize {
        if self.total == 0 {
            return 100;
        }
        self.completed * 100 / self.total
    }
}

/// Result of a batch embedding run
#[derive(Debug)]
pub struct BatchResult {
    /// Embedded documents, in submission order
    pub documents: Vec<KnowledgeDocument>,
    /// IDs of documents whose embedding failed
    pub failed: Vec<String>,
    pub duration_ms: u64,
}

/// Embeds documents concurrently, at most `max_concurrent` requests in flight
///
/// Completions arrive in any order; progress counts completions and the
/// returned documents are put back into submission order.
pub struct BatchEmbedder {
    provider: Arc<dyn EmbeddingProvider>,
    max_concurrent: usize,
}

impl BatchEmbedder {
    pub fn new(provider: Arc<dyn EmbeddingProvider>, max_concurrent: usize) -> Self {
        Self {
            provider,
            max_concurrent: max_concurrent.max(1),
        }
    }

    /// Embed all documents, invoking `on_progress` after each completion
    pub async fn process<F>(
        &self,
        documents: Vec<SourceDocument>,
        mut on_progress: F,
    ) -> Result<BatchResult>
    where
        F: FnMut(IngestProgress),
    {
        let start = std::time::Instant::now();
        let total = documents.len();

        info!(
            "Embedding {} documents ({} concurrent)",
            total, self.max_concurrent
        );

        let semaphore = Arc::new(Semaphore::new(self.max_concurrent));
        let mut tasks = JoinSet::new();

        for (position, document) in documents.into_iter().enumerate() {
            let permit = semaphore.clone().acquire_owned().await?;
            let provider = Arc::clone(&self.provider);

            tasks.spawn(async move {
                let result = provider.embed(&document.content).await;
                drop(permit);
                (position, document, result)
            });
        }

        let mut slots: Vec<Option<KnowledgeDocument>> = vec![None; total];
        let mut failed = Vec::new();
        let mut completed = 0;

        while let Some(joined) = tasks.join_next().await {
            let (position, document, result) = joined?;
            completed += 1;

            match result {
                Ok(vector) => {
                    debug!("Embedded document {} ({})", document.id, document.title);
                    slots[position] = Some(KnowledgeDocument::from_source(document, vector));
                }
                Err(e) => {
                    warn!("Failed to embed document {}: {}", document.id, e);
                    failed.push(document.id);
                }
            }

            on_progress(IngestProgress { completed, total });
        }

        let documents: Vec<KnowledgeDocument> = slots.into_iter().flatten().collect();
        let duration_ms = start.elapsed().as_millis() as u64;

        info!(
            "Embedding complete: {} embedded, {} failed, {}ms",
            documents.len(),
            failed.len(),
            duration_ms
        );

        Ok(BatchResult {
            documents,
            failed,
            duration_ms,
        })
    }
}
