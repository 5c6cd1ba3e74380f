//! Heuristic quality scoring of source documents before indexing
//!
//! Six independent dimensions (length, quantified data, domain terminology,
//! actionable language, structure, freshness) are blended with fixed weights
//! into an overall score and letter grade. Advisory only: nothing here stops
//! a document from being indexed.

mod report;

pub use report::{render_collection_report, DocumentQualityReport, QualityGrade, HIGH_QUALITY_SCORE};

use crate::documents::SourceDocument;
use crate::error::{RagError, Result};
use crate::relevance::DomainVocabulary;
use chrono::Datelike;
use regex::Regex;
use tracing::debug;

/// Patterns counted as quantified data: percentages, euro amounts, decimals,
/// thousands, millions, multipliers, signed percentages
const QUANTIFIER_PATTERNS: [&str; 8] = [
    r"\d+%",
    r"€\d+",
    r"\d+\.\d+",
    r"\d+K",
    r"\d+M",
    r"\d+x",
    r"\+\d+%",
    r"-\d+%",
];

const NUMBERED_LIST_PATTERN: &str = r"\d+\)|\d+\.";

const FRESH_MARKERS: [&str; 9] = [
    "2024", "2025", "July", "June", "August", "Q1", "Q2", "Q3", "Q4",
];

const ACTIONABLE_SATURATION: f64 = 5.0;

pub struct IngestionQualityScorer {
    quantifiers: Vec<Regex>,
    numbered_list: Regex,
    vocabulary: DomainVocabulary,
    actionable: DomainVocabulary,
    reference_year: i32,
}

impl IngestionQualityScorer {
    pub fn new(vocabulary: DomainVocabulary, actionable: DomainVocabulary) -> Result<Self> {
        let quantifiers = QUANTIFIER_PATTERNS
            .iter()
            .map(|p| Regex::new(p))
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| RagError::Config(format!("Invalid quantifier pattern: {}", e)))?;

        let numbered_list = Regex::new(NUMBERED_LIST_PATTERN)
            .map_err(|e| RagError::Config(format!("Invalid list pattern: {}", e)))?;

        Ok(Self {
            quantifiers,
            numbered_list,
            vocabulary,
            actionable,
            reference_year: chrono::Utc::now().year(),
        })
    }

    /// Treat `year` as the current year for freshness checks
    pub fn with_reference_year(mut self, year: i32) -> Self {
        self.reference_year = year;
        self
    }

    pub fn assess(&self, document: &SourceDocument) -> DocumentQualityReport {
        let content = &document.content;
        let lowered = content.to_lowercase();

        let content_length = self.content_length(content);
        let quantified_data = self.quantified_data(content);
        let domain_terminology = self.domain_terminology(&lowered);
        let actionable_language = self.actionable_language(&lowered);
        let structure = self.structure(content);
        let freshness = self.freshness(content);

        let overall_quality_score = content_length * 0.15
            + quantified_data * 0.25
            + domain_terminology * 0.20
            + actionable_language * 0.20
            + structure * 0.10
            + freshness * 0.10;
        let grade = QualityGrade::from_score(overall_quality_score);

        let mut report = DocumentQualityReport {
            document_id: document.id.clone(),
            document_title: document.title.clone(),
            assessed_at: chrono::Utc::now(),
            content_length,
            quantified_data,
            domain_terminology,
            actionable_language,
            structure,
            freshness,
            overall_quality_score,
            grade,
            recommendations: Vec::new(),
        };
        report.recommendations = recommendations(&report);

        debug!(
            document = %document.id,
            score = overall_quality_score,
            grade = %grade,
            "Assessed document quality"
        );

        report
    }

    pub fn assess_all(&self, documents: &[SourceDocument]) -> Vec<DocumentQualityReport> {
        documents.iter().map(|d| self.assess(d)).collect()
    }

    /// Assess `documents` and render the collection report
    pub fn collection_report(&self, documents: &[SourceDocument]) -> String {
        render_collection_report(&self.assess_all(documents))
    }

    fn content_length(&self, content: &str) -> f64 {
        match content.split_whitespace().count() {
            0..=49 => 0.3,
            50..=100 => 0.6,
            101..=500 => 1.0,
            501..=1000 => 0.8,
            _ => 0.6,
        }
    }

    fn quantified_data(&self, content: &str) -> f64 {
        let count: usize = self
            .quantifiers
            .iter()
            .map(|re| re.find_iter(content).count())
            .sum();

        match count {
            n if n >= 10 => 1.0,
            n if n >= 5 => 0.8,
            n if n >= 2 => 0.6,
            _ => 0.3,
        }
    }

    fn domain_terminology(&self, lowered: &str) -> f64 {
        if self.vocabulary.is_empty() {
            return 0.0;
        }
        let density = self.vocabulary.count_in(lowered) as f64 / self.vocabulary.len() as f64;
        (density * 3.0).min(1.0)
    }

    fn actionable_language(&self, lowered: &str) -> f64 {
        (self.actionable.count_in(lowered) as f64 / ACTIONABLE_SATURATION).min(1.0)
    }

    fn structure(&self, content: &str) -> f64 {
        let mut score: f64 = 0.0;
        if content.contains(':') {
            score += 0.3;
        }
        if content.contains('(') && content.contains(')') {
            score += 0.2;
        }
        if content.chars().count() > 200 && content.split('.').count() > 3 {
            score += 0.3;
        }
        if self.numbered_list.is_match(content) {
            score += 0.2;
        }
        score.min(1.0)
    }

    fn freshness(&self, content: &str) -> f64 {
        let current = self.reference_year.to_string();
        let previous = (self.reference_year - 1).to_string();

        let fresh = content.contains(&current)
            || content.contains(&previous)
            || FRESH_MARKERS.iter().any(|m| content.contains(m));

        if fresh {
            1.0
        } else {
            0.5
        }
    }
}

fn recommendations(report: &DocumentQualityReport) -> Vec<String> {
    let checks = [
        (
            report.content_length < 0.7,
            "Add more detailed content (aim for 100-500 words)",
        ),
        (
            report.quantified_data < 0.7,
            "Include more specific metrics, percentages, and quantified data",
        ),
        (
            report.domain_terminology < 0.6,
            "Add more domain-specific terminology and context",
        ),
        (
            report.actionable_language < 0.6,
            "Include more actionable recommendations and strategic insights",
        ),
        (
            report.structure < 0.6,
            "Improve document structure with clear sections and organization",
        ),
        (
            report.freshness < 0.8,
            "Update with current dates and recent data",
        ),
        (
            report.overall_quality_score >= 0.8,
            "Excellent quality! This document will generate high-quality AI responses.",
        ),
    ];

    checks
        .iter()
        .filter(|(applies, _)| *applies)
        .map(|(_, text)| text.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scorer() -> IngestionQualityScorer {
        IngestionQualityScorer::new(
            DomainVocabulary::new(["pricing", "margin", "customer", "store", "market", "belgium"]),
            DomainVocabulary::new(["recommend", "should", "improve", "increase", "reduce", "focus"]),
        )
        .unwrap()
        .with_reference_year(2026)
    }

    fn words(n: usize) -> String {
        vec!["word"; n].join(" ")
    }

    #[test]
    fn test_length_bands() {
        let s = scorer();
        assert_eq!(s.content_length(&words(30)), 0.3);
        assert_eq!(s.content_length(&words(50)), 0.6);
        assert_eq!(s.content_length(&words(100)), 0.6);
        assert_eq!(s.content_length(&words(101)), 1.0);
        assert_eq!(s.content_length(&words(800)), 0.8);
        assert_eq!(s.content_length(&words(1500)), 0.6);
    }

    #[test]
    fn test_quantified_data_counts_patterns() {
        let s = scorer();
        assert_eq!(s.quantified_data("no numbers here"), 0.3);
        assert_eq!(s.quantified_data("margins rose 12% to €40"), 0.6);
        // 5%, 3.5, 2x, 10K, 4M, +5% (also counted as 5%) => 7 matches
        assert_eq!(s.quantified_data("5% 3.5 2x 10K 4M +5%"), 0.8);
    }

    #[test]
    fn test_structure_markers() {
        let s = scorer();
        assert_eq!(s.structure("plain words only"), 0.0);
        assert!((s.structure("Summary: prices (avg) 1) apples") - 0.7).abs() < 1e-12);
    }

    #[test]
    fn test_freshness_uses_reference_year() {
        let s = scorer();
        assert_eq!(s.freshness("Figures from 2026"), 1.0);
        assert_eq!(s.freshness("Figures from 2025"), 1.0);
        assert_eq!(s.freshness("Results for Q3"), 1.0);
        assert_eq!(s.freshness("Figures from 1999"), 0.5);
    }

    #[test]
    fn test_short_plain_document_grades_low() {
        let doc = SourceDocument::new(
            "short",
            "Short note",
            "This note talks about apples and pears in a very general way without any \
             figures or dates so it gives the reader little to work with at all today",
        );
        let report = scorer().assess(&doc);

        assert!(report.content_length <= 0.3);
        assert!(report.grade.at_most(QualityGrade::C));
        assert!(report
            .recommendations
            .iter()
            .any(|r| r.starts_with("Add more detailed content")));
    }

    #[test]
    fn test_rich_document_scores_well() {
        let mut content = String::from(
            "Pricing review 2026: store margin grew 12% and customer visits 8%. \
             We recommend you should improve shelf focus, increase promotions and reduce waste. \
             Belgium market share (Q2) reached 23.5% with €40 baskets. 1) Expand 2) Train staff. ",
        );
        content.push_str(&words(120));
        let doc = SourceDocument::new("rich", "Quarterly review", content);

        let report = scorer().assess(&doc);
        assert_eq!(report.content_length, 1.0);
        assert_eq!(report.domain_terminology, 1.0);
        assert_eq!(report.actionable_language, 1.0);
        assert_eq!(report.freshness, 1.0);
        assert!(report.overall_quality_score >= 0.8);
        assert!(report
            .recommendations
            .iter()
            .any(|r| r.starts_with("Excellent quality")));
    }

    #[test]
    fn test_empty_vocabulary_scores_zero_terms() {
        let s = IngestionQualityScorer::new(DomainVocabulary::default(), DomainVocabulary::default())
            .unwrap();
        assert_eq!(s.domain_terminology("pricing everywhere"), 0.0);
        assert_eq!(s.actionable_language("recommend"), 0.0);
    }

    #[test]
    fn test_collection_report_orders_documents() {
        let s = scorer();
        let docs = vec![
            SourceDocument::new("a", "Weak", "tiny"),
            SourceDocument::new(
                "b",
                "Strong",
                format!(
                    "Pricing 2026: margin 12% customer 8% store 3.5 market €40 belgium 5x. \
                     We recommend you should improve focus and increase sales. {}",
                    words(120)
                ),
            ),
        ];

        let report = s.collection_report(&docs);
        assert!(report.contains("Total Documents: 2"));
        let strong = report.find("Strong").unwrap();
        let weak = report.find("Weak").unwrap();
        assert!(strong < weak);
    }
}
