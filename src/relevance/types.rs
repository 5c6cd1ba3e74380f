/// Relevance records and their textual reports
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::fmt::Write as _;

/// Coarse bucket of the fused relevance score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RelevanceCategory {
    High,
    Medium,
    Low,
}

impl fmt::Display for RelevanceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RelevanceCategory::High => f.write_str("High"),
            RelevanceCategory::Medium => f.write_str("Medium"),
            RelevanceCategory::Low => f.write_str("Low"),
        }
    }
}

/// How far the component scores agree with each other
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ConfidenceLevel {
    High,
    Medium,
    Low,
}

impl fmt::Display for ConfidenceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfidenceLevel::High => f.write_str("High"),
            ConfidenceLevel::Medium => f.write_str("Medium"),
            ConfidenceLevel::Low => f.write_str("Low"),
        }
    }
}

/// Relevance of one document to one query
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentRelevance {
    pub document_id: String,
    pub document_title: String,
    /// Position of the hit in the search provider's result list
    pub search_rank: usize,
    pub vector_score: f64,
    pub keyword_relevance: f64,
    pub business_context_score: f64,
    pub semantic_validation: f64,
    pub final_relevance_score: f64,
    pub relevance_category: RelevanceCategory,
    pub confidence_level: ConfidenceLevel,
    pub is_relevant: bool,
    /// Content length in characters
    pub content_length: usize,
}

impl DocumentRelevance {
    pub fn summary(&self) -> String {
        format!(
            "Document: {} | Score: {:.3} | Category: {} | Confidence: {}",
            self.document_title,
            self.final_relevance_score,
            self.relevance_category,
            self.confidence_level
        )
    }

    pub fn breakdown(&self) -> String {
        format!(
            "Vector: {:.3} | Keywords: {:.3} | Business: {:.3} | Semantic: {:.3}",
            self.vector_score,
            self.keyword_relevance,
            self.business_context_score,
            self.semantic_validation
        )
    }
}

/// Scored candidate set for one query
#[derive(Debug, Clone, Serialize)]
pub struct RelevanceValidationResult {
    pub query: String,
    pub total_documents: usize,
    pub relevant_documents: usize,
    pub high_quality_documents: usize,
    /// Mean of the final scores (0 for an empty set)
    pub overall_relevance_score: f64,
    /// One entry per hit, in search order
    pub document_relevances: Vec<DocumentRelevance>,
    pub validated_at: DateTime<Utc>,
}

impl RelevanceValidationResult {
    /// Share of documents above the relevance threshold, in percent
    pub fn relevant_percentage(&self) -> f64 {
        if self.total_documents == 0 {
            return 0.0;
        }
        self.relevant_documents as f64 / self.total_documents as f64 * 100.0
    }

    pub fn count_by_category(&self, category: RelevanceCategory) -> usize {
        self.document_relevances
            .iter()
            .filter(|d| d.relevance_category == category)
            .count()
    }

    /// Entries ordered by final score, best first; ties keep search order
    pub fn ranked(&self) -> Vec<&DocumentRelevance> {
        let mut ranked: Vec<&DocumentRelevance> = self.document_relevances.iter().collect();
        ranked.sort_by(|a, b| {
            b.final_relevance_score
                .total_cmp(&a.final_relevance_score)
                .then(a.search_rank.cmp(&b.search_rank))
        });
        ranked
    }

    /// One-line summary
    pub fn summary(&self) -> String {
        format!(
            "Validation: {}/{} relevant ({:.1}%), Overall Score: {:.3}, High Quality: {}",
            self.relevant_documents,
            self.total_documents,
            self.relevant_percentage(),
            self.overall_relevance_score,
            self.high_quality_documents
        )
    }

    pub fn relevance_summary(&self) -> String {
        format!(
            "Relevance Summary: {} High | {} Medium | {} Low | Overall: {:.3}",
            self.count_by_category(RelevanceCategory::High),
            self.count_by_category(RelevanceCategory::Medium),
            self.count_by_category(RelevanceCategory::Low),
            self.overall_relevance_score
        )
    }

    /// Multi-line per-document breakdown, ranked by final score
    pub fn detailed_report(&self) -> String {
        let mut report = String::new();

        let _ = writeln!(report, "DOCUMENT RELEVANCE ANALYSIS");
        let _ = writeln!(report, "===========================");
        let _ = writeln!(report, "Query: \"{}\"", self.query);
        let _ = writeln!(
            report,
            "Analysis Time: {}",
            self.validated_at.format("%Y-%m-%d %H:%M:%S")
        );
        let _ = writeln!(
            report,
            "Overall Relevance Score: {:.3}",
            self.overall_relevance_score
        );
        let _ = writeln!(
            report,
            "Relevant Documents: {}/{}",
            self.relevant_documents, self.total_documents
        );
        let _ = writeln!(
            report,
            "High Quality Documents: {}",
            self.high_quality_documents
        );

        let ranked = self.ranked();
        if ranked.is_empty() {
            return report;
        }

        let _ = writeln!(report);
        let _ = writeln!(report, "INDIVIDUAL DOCUMENT ANALYSIS:");
        let _ = writeln!(report, "-----------------------------");

        for (i, doc) in ranked.iter().enumerate() {
            let marker = match doc.relevance_category {
                RelevanceCategory::High => "★",
                RelevanceCategory::Medium => "✓",
                RelevanceCategory::Low => "!",
            };
            if i > 0 {
                let _ = writeln!(report);
            }
            let _ = writeln!(report, "{}. {} {}", i + 1, marker, doc.document_title);
            let _ = writeln!(
                report,
                "   Final Score: {:.3} ({})",
                doc.final_relevance_score, doc.relevance_category
            );
            let _ = writeln!(report, "   Confidence: {}", doc.confidence_level);
            let _ = writeln!(report, "   Content Length: {} characters", doc.content_length);
            let _ = writeln!(report, "   Score Breakdown: {}", doc.breakdown());
        }

        report
    }
}
