// Ingestion pipeline: quality assessment, batch embedding, index build

use crate::documents::SourceDocument;
use crate::embedding::{BatchEmbedder, EmbeddingProvider, IngestProgress};
use crate::error::Result;
use crate::quality::{DocumentQualityReport, IngestionQualityScorer, HIGH_QUALITY_SCORE};
use crate::search::{HnswParams, LocalSearchIndex, SearchMode};
use std::sync::Arc;
use tracing::{info, warn};

/// Everything produced by one ingestion run
pub struct IngestOutcome {
    pub index: LocalSearchIndex,
    /// Advisory quality reports, one per source document, in input order
    pub quality: Vec<DocumentQualityReport>,
    /// IDs of documents that could not be embedded and were left out
    pub failed: Vec<String>,
    pub duration_ms: u64,
}

/// Turns source documents into a searchable index
pub struct IngestPipeline {
    embedder: BatchEmbedder,
    quality: IngestionQualityScorer,
    mode: SearchMode,
    params: HnswParams,
}

impl IngestPipeline {
    pub fn new(
        provider: Arc<dyn EmbeddingProvider>,
        concurrency: usize,
        quality: IngestionQualityScorer,
        mode: SearchMode,
        params: HnswParams,
    ) -> Self {
        Self {
            embedder: BatchEmbedder::new(provider, concurrency),
            quality,
            mode,
            params,
        }
    }

    /// Assess, embed and index `documents`
    ///
    /// Quality scores never keep a document out of the index; embedding
    /// failures do, and are reported in [`IngestOutcome::failed`].
    pub async fn run<F>(&self, documents: Vec<SourceDocument>, on_progress: F) -> Result<IngestOutcome>
    where
        F: FnMut(IngestProgress),
    {
        let quality = self.quality.assess_all(&documents);
        let weak = quality
            .iter()
            .filter(|r| r.overall_quality_score < HIGH_QUALITY_SCORE)
            .count();
        if weak > 0 {
            warn!(
                "{} of {} documents scored below {:.1} quality; run `ragscope quality` for details",
                weak,
                quality.len(),
                HIGH_QUALITY_SCORE
            );
        }

        let batch = self.embedder.process(documents, on_progress).await?;
        let index = LocalSearchIndex::build(batch.documents, self.mode, self.params)?;

        info!(
            "Ingestion complete: {} indexed, {} failed, {}ms",
            index.len(),
            batch.failed.len(),
            batch.duration_ms
        );

        Ok(IngestOutcome {
            index,
            quality,
            failed: batch.failed,
            duration_ms: batch.duration_ms,
        })
    }
}
