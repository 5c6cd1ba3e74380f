/// Renders validated documents into the generation context block
use super::types::{DocumentRelevance, RelevanceValidationResult};
use crate::search::SearchHit;
use ahash::AHashMap;
use std::fmt::Write as _;
use tracing::{debug, info};

/// Diagnostic counters for one assembled context
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContextStats {
    /// Documents at or above the relevance threshold
    pub included: usize,
    /// Mean final score of the included documents (0 when none)
    pub mean_score: f64,
    /// Characters in the rendered context
    pub characters: usize,
}

/// Context text plus its diagnostics
#[derive(Debug, Clone)]
pub struct AssembledContext {
    pub text: String,
    pub stats: ContextStats,
}

impl AssembledContext {
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Builds the context string handed to the generation step
///
/// Only relevant documents are included, best score first; equal scores keep
/// search order. Zero relevant documents produce an empty string.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContextAssembler;

impl ContextAssembler {
    pub fn new() -> Self {
        Self
    }

    pub fn assemble(&self, validation: &RelevanceValidationResult, hits: &[SearchHit]) -> String {
        self.assemble_with_stats(validation, hits).text
    }

    pub fn assemble_with_stats(
        &self,
        validation: &RelevanceValidationResult,
        hits: &[SearchHit],
    ) -> AssembledContext {
        let mut selected: Vec<&DocumentRelevance> = validation
            .document_relevances
            .iter()
            .filter(|d| d.is_relevant)
            .collect();
        selected.sort_by(|a, b| {
            b.final_relevance_score
                .total_cmp(&a.final_relevance_score)
                .then(a.search_rank.cmp(&b.search_rank))
        });

        // first occurrence wins when a provider returns duplicate ids
        let mut contents: AHashMap<&str, &str> = AHashMap::with_capacity(hits.len());
        for hit in hits {
            contents
                .entry(hit.document.id.as_str())
                .or_insert(hit.document.content.as_str());
        }

        let mut text = String::new();
        let mut included = 0;
        let mut score_sum = 0.0;

        for relevance in &selected {
            let Some(content) = contents.get(relevance.document_id.as_str()) else {
                debug!(
                    "Skipping {}: not present in the hit set",
                    relevance.document_id
                );
                continue;
            };

            included += 1;
            score_sum += relevance.final_relevance_score;

            let _ = writeln!(
                text,
                "Document {}: {} (Relevance: {:.3}, Confidence: {})",
                included,
                relevance.document_title,
                relevance.final_relevance_score,
                relevance.confidence_level
            );
            let _ = writeln!(text, "{}", content);
            let _ = writeln!(text);
        }

        let text = text.trim_end().to_string();
        let mean_score = if included == 0 {
            0.0
        } else {
            score_sum / included as f64
        };
        let stats = ContextStats {
            included,
            mean_score,
            characters: text.chars().count(),
        };

        info!(
            included = stats.included,
            candidates = validation.total_documents,
            mean_score = stats.mean_score,
            characters = stats.characters,
            "Assembled context"
        );

        AssembledContext { text, stats }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::documents::KnowledgeDocument;
    use crate::relevance::{ConfidenceLevel, RelevanceCategory};

    fn hit(id: &str, content: &str) -> SearchHit {
        SearchHit::new(
            KnowledgeDocument {
                id: id.to_string(),
                title: format!("Title {}", id),
                content: content.to_string(),
                embedding_vector: Vec::new(),
            },
            1.0,
        )
    }

    fn relevance(id: &str, rank: usize, score: f64) -> DocumentRelevance {
        DocumentRelevance {
            document_id: id.to_string(),
            document_title: format!("Title {}", id),
            search_rank: rank,
            vector_score: score,
            keyword_relevance: score,
            business_context_score: score,
            semantic_validation: score,
            final_relevance_score: score,
            relevance_category: if score >= 0.8 {
                RelevanceCategory::High
            } else if score >= 0.6 {
                RelevanceCategory::Medium
            } else {
                RelevanceCategory::Low
            },
            confidence_level: ConfidenceLevel::High,
            is_relevant: score >= 0.6,
            content_length: 10,
        }
    }

    fn validation(docs: Vec<DocumentRelevance>) -> RelevanceValidationResult {
        RelevanceValidationResult {
            query: "q".to_string(),
            total_documents: docs.len(),
            relevant_documents: docs.iter().filter(|d| d.is_relevant).count(),
            high_quality_documents: 0,
            overall_relevance_score: 0.0,
            document_relevances: docs,
            validated_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn test_orders_by_score_descending() {
        let hits = vec![hit("a", "alpha"), hit("b", "beta"), hit("c", "gamma")];
        let v = validation(vec![
            relevance("a", 0, 0.9),
            relevance("b", 1, 0.95),
            relevance("c", 2, 0.7),
        ]);

        let context = ContextAssembler::new().assemble(&v, &hits);
        assert_eq!(
            context,
            "Document 1: Title b (Relevance: 0.950, Confidence: High)\nbeta\n\n\
             Document 2: Title a (Relevance: 0.900, Confidence: High)\nalpha\n\n\
             Document 3: Title c (Relevance: 0.700, Confidence: High)\ngamma"
        );
    }

    #[test]
    fn test_ties_keep_search_rank() {
        let hits = vec![hit("x", "first"), hit("y", "second")];
        let v = validation(vec![relevance("y", 1, 0.7), relevance("x", 0, 0.7)]);

        let context = ContextAssembler::new().assemble(&v, &hits);
        assert!(context.find("first").unwrap() < context.find("second").unwrap());
    }

    #[test]
    fn test_nothing_relevant_yields_empty_context() {
        let hits = vec![hit("a", "alpha")];
        let v = validation(vec![relevance("a", 0, 0.3)]);

        let assembled = ContextAssembler::new().assemble_with_stats(&v, &hits);
        assert!(assembled.is_empty());
        assert_eq!(assembled.stats.included, 0);
        assert_eq!(assembled.stats.mean_score, 0.0);
    }

    #[test]
    fn test_stats_and_missing_documents() {
        let hits = vec![hit("a", "alpha")];
        let v = validation(vec![relevance("a", 0, 0.9), relevance("ghost", 1, 0.7)]);

        let assembled = ContextAssembler::new().assemble_with_stats(&v, &hits);
        assert_eq!(assembled.stats.included, 1);
        assert!((assembled.stats.mean_score - 0.9).abs() < 1e-12);
        assert!(!assembled.text.contains("ghost"));
    }

    #[test]
    fn test_deterministic_output() {
        let hits = vec![hit("a", "alpha"), hit("b", "beta")];
        let v = validation(vec![relevance("a", 0, 0.8), relevance("b", 1, 0.9)]);
        let assembler = ContextAssembler::new();
        assert_eq!(assembler.assemble(&v, &hits), assembler.assemble(&v, &hits));
    }
}
