/// Multi-signal relevance scoring of search hits
use super::text::{keywords, overlap_ratio, DomainVocabulary};
use super::types::{ConfidenceLevel, DocumentRelevance, RelevanceCategory, RelevanceValidationResult};
use super::weights::{RelevanceThresholds, ScoringWeights};
use crate::search::SearchHit;
use ahash::AHashSet;
use std::thread;
use tracing::debug;

/// Below this many hits scoring stays on the calling thread
const PARALLEL_MIN_HITS: usize = 32;

/// Content length (chars) at which the confidence content term saturates
const CONFIDENT_CONTENT_CHARS: f64 = 200.0;

/// Content length (chars) per unit of semantic length bonus
const LENGTH_BONUS_SCALE: f64 = 10_000.0;
const MAX_LENGTH_BONUS: f64 = 0.2;

/// Query-side data computed once per validation
struct QueryProfile {
    keywords: AHashSet<String>,
    domain_terms: usize,
}

/// Scores search hits against a query
///
/// Every score is a pure function of the query, the hit and the batch's
/// maximum raw score. Degenerate input (empty query, empty content, empty
/// result set) yields zero scores, never an error.
#[derive(Debug, Clone, Default)]
pub struct RelevanceScorer {
    weights: ScoringWeights,
    thresholds: RelevanceThresholds,
    vocabulary: DomainVocabulary,
}

impl RelevanceScorer {
    pub fn new(
        weights: ScoringWeights,
        thresholds: RelevanceThresholds,
        vocabulary: DomainVocabulary,
    ) -> Self {
        Self {
            weights,
            thresholds,
            vocabulary,
        }
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    pub fn thresholds(&self) -> &RelevanceThresholds {
        &self.thresholds
    }

    pub fn vocabulary(&self) -> &DomainVocabulary {
        &self.vocabulary
    }

    /// Score a single hit given the maximum raw score of its result set
    pub fn score(&self, query: &str, hit: &SearchHit, max_raw_score: f64) -> DocumentRelevance {
        let profile = self.profile(query);
        self.score_hit(&profile, hit, 0, max_raw_score)
    }

    /// Score every hit of one result set
    ///
    /// The returned records keep the order of `hits`.
    pub fn validate(&self, query: &str, hits: &[SearchHit]) -> RelevanceValidationResult {
        let profile = self.profile(query);
        let max_raw = max_raw_score(hits);

        let document_relevances = self.score_all(&profile, hits, max_raw);

        let total_documents = document_relevances.len();
        let relevant_documents = document_relevances.iter().filter(|d| d.is_relevant).count();
        let high_quality_documents = document_relevances
            .iter()
            .filter(|d| d.is_relevant && d.final_relevance_score >= self.thresholds.high())
            .count();
        let overall_relevance_score = if total_documents == 0 {
            0.0
        } else {
            document_relevances
                .iter()
                .map(|d| d.final_relevance_score)
                .sum::<f64>()
                / total_documents as f64
        };

        RelevanceValidationResult {
            query: query.to_string(),
            total_documents,
            relevant_documents,
            high_quality_documents,
            overall_relevance_score,
            document_relevances,
            validated_at: chrono::Utc::now(),
        }
    }

    /// Category for a fused score under the configured thresholds
    pub fn categorize(&self, score: f64) -> RelevanceCategory {
        if score >= self.thresholds.high() {
            RelevanceCategory::High
        } else if score >= self.thresholds.min() {
            RelevanceCategory::Medium
        } else {
            RelevanceCategory::Low
        }
    }

    fn profile(&self, query: &str) -> QueryProfile {
        QueryProfile {
            keywords: keywords(query),
            domain_terms: self.vocabulary.count_in(&query.to_lowercase()),
        }
    }

    fn score_all(
        &self,
        profile: &QueryProfile,
        hits: &[SearchHit],
        max_raw: f64,
    ) -> Vec<DocumentRelevance> {
        let workers = thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
            .min(hits.len());

        if hits.len() < PARALLEL_MIN_HITS || workers <= 1 {
            return hits
                .iter()
                .enumerate()
                .map(|(rank, hit)| self.score_hit(profile, hit, rank, max_raw))
                .collect();
        }

        let chunk_size = hits.len().div_ceil(workers);
        debug!(
            "Scoring {} hits on {} workers ({} per chunk)",
            hits.len(),
            workers,
            chunk_size
        );

        thread::scope(|scope| {
            let handles: Vec<_> = hits
                .chunks(chunk_size)
                .enumerate()
                .map(|(chunk_index, chunk)| {
                    scope.spawn(move || {
                        chunk
                            .iter()
                            .enumerate()
                            .map(|(offset, hit)| {
                                let rank = chunk_index * chunk_size + offset;
                                self.score_hit(profile, hit, rank, max_raw)
                            })
                            .collect::<Vec<_>>()
                    })
                })
                .collect();

            handles
                .into_iter()
                .flat_map(|handle| {
                    handle
                        .join()
                        .unwrap_or_else(|panic| std::panic::resume_unwind(panic))
                })
                .collect()
        })
    }

    fn score_hit(
        &self,
        profile: &QueryProfile,
        hit: &SearchHit,
        rank: usize,
        max_raw: f64,
    ) -> DocumentRelevance {
        let document = &hit.document;
        let full_text = document.full_text();
        let lowered = full_text.to_lowercase();
        let content_length = document.content.chars().count();

        let vector_score = normalize_vector_score(hit.raw_score, max_raw);
        let keyword_relevance = overlap_ratio(&profile.keywords, &keywords(&full_text));
        let business_context_score =
            business_context_score(profile.domain_terms, self.vocabulary.count_in(&lowered));
        let semantic_validation = semantic_validation(
            &profile.keywords,
            &lowered,
            &document.title,
            &document.content,
        );

        let final_relevance_score = self
            .weights
            .fuse(
                vector_score,
                keyword_relevance,
                business_context_score,
                semantic_validation,
            )
            .clamp(0.0, 1.0);

        let is_relevant = final_relevance_score >= self.thresholds.min();
        let confidence_level = confidence_level(
            final_relevance_score,
            [
                vector_score,
                keyword_relevance,
                business_context_score,
                semantic_validation,
            ],
            content_length,
        );

        debug!(
            title = %document.title,
            raw = hit.raw_score,
            vector = vector_score,
            keywords = keyword_relevance,
            business = business_context_score,
            semantic = semantic_validation,
            score = final_relevance_score,
            relevant = is_relevant,
            "Scored document"
        );

        DocumentRelevance {
            document_id: document.id.clone(),
            document_title: document.title.clone(),
            search_rank: rank,
            vector_score,
            keyword_relevance,
            business_context_score,
            semantic_validation,
            final_relevance_score,
            relevance_category: self.categorize(final_relevance_score),
            confidence_level,
            is_relevant,
            content_length,
        }
    }
}

/// Largest finite raw score of a result set (0 when empty)
pub fn max_raw_score(hits: &[SearchHit]) -> f64 {
    hits.iter()
        .map(|h| h.raw_score)
        .filter(|s| s.is_finite())
        .fold(0.0, f64::max)
}

/// Raw score relative to the batch maximum, in [0, 1]
pub fn normalize_vector_score(raw_score: f64, max_raw_score: f64) -> f64 {
    if max_raw_score > 0.0 && raw_score.is_finite() {
        (raw_score / max_raw_score).clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Overlap of domain terms between query and document
pub fn business_context_score(query_terms: usize, document_terms: usize) -> f64 {
    query_terms.min(document_terms) as f64 / query_terms.max(1) as f64
}

/// Deterministic lexical stand-in for semantic similarity
///
/// `lowered_text` is the lower-cased `title + " " + content`.
pub fn semantic_validation(
    query_keywords: &AHashSet<String>,
    lowered_text: &str,
    title: &str,
    content: &str,
) -> f64 {
    if query_keywords.is_empty() || lowered_text.trim().is_empty() {
        return 0.0;
    }

    let contained = query_keywords
        .iter()
        .filter(|word| lowered_text.contains(word.as_str()))
        .count();
    let density = contained as f64 / query_keywords.len() as f64;

    let title_relevance = overlap_ratio(query_keywords, &keywords(title));

    let length_bonus = (content.chars().count() as f64 / LENGTH_BONUS_SCALE).min(MAX_LENGTH_BONUS);
    let content_relevance =
        (overlap_ratio(query_keywords, &keywords(content)) + length_bonus).min(1.0);

    (density * 0.4 + title_relevance * 0.3 + content_relevance * 0.3).clamp(0.0, 1.0)
}

/// Confidence from the fused score, component agreement and content length
///
/// `components` is `[vector, keyword, business, semantic]`.
pub fn confidence_level(
    final_score: f64,
    components: [f64; 4],
    content_length: usize,
) -> ConfidenceLevel {
    let [vector, keyword, business, semantic] = components;
    let spread = (vector - keyword).abs() + (business - semantic).abs();
    let consistency = 1.0 - spread / 4.0;
    let content_quality = (content_length as f64 / CONFIDENT_CONTENT_CHARS).min(1.0);

    let confidence = final_score * 0.6 + consistency * 0.3 + content_quality * 0.1;

    if confidence >= 0.8 {
        ConfidenceLevel::High
    } else if confidence >= 0.6 {
        ConfidenceLevel::Medium
    } else {
        ConfidenceLevel::Low
    }
}
