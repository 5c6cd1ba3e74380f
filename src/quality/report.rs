use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::fmt::Write as _;

/// Letter grade for an overall quality score
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum QualityGrade {
    APlus,
    A,
    BPlus,
    B,
    C,
    D,
}

impl QualityGrade {
    pub fn from_score(score: f64) -> Self {
        if score >= 0.9 {
            QualityGrade::APlus
        } else if score >= 0.8 {
            QualityGrade::A
        } else if score >= 0.7 {
            QualityGrade::BPlus
        } else if score >= 0.6 {
            QualityGrade::B
        } else if score >= 0.5 {
            QualityGrade::C
        } else {
            QualityGrade::D
        }
    }

    /// Whether this grade is `other` or worse
    pub fn at_most(self, other: QualityGrade) -> bool {
        self >= other
    }
}

impl fmt::Display for QualityGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            QualityGrade::APlus => "A+ (Excellent)",
            QualityGrade::A => "A (Very Good)",
            QualityGrade::BPlus => "B+ (Good)",
            QualityGrade::B => "B (Acceptable)",
            QualityGrade::C => "C (Needs Improvement)",
            QualityGrade::D => "D (Poor - Requires Revision)",
        };
        f.write_str(label)
    }
}

/// Quality assessment of one source document
#[derive(Debug, Clone, Serialize)]
pub struct DocumentQualityReport {
    pub document_id: String,
    pub document_title: String,
    pub assessed_at: DateTime<Utc>,
    pub content_length: f64,
    pub quantified_data: f64,
    pub domain_terminology: f64,
    pub actionable_language: f64,
    pub structure: f64,
    pub freshness: f64,
    pub overall_quality_score: f64,
    pub grade: QualityGrade,
    pub recommendations: Vec<String>,
}

/// Minimum overall score counted as high quality in collection reports
pub const HIGH_QUALITY_SCORE: f64 = 0.7;

/// Render the collection-wide quality report
pub fn render_collection_report(reports: &[DocumentQualityReport]) -> String {
    let total = reports.len();
    let high_quality = reports
        .iter()
        .filter(|r| r.overall_quality_score >= HIGH_QUALITY_SCORE)
        .count();
    let (average, share) = if total == 0 {
        (0.0, 0.0)
    } else {
        (
            reports.iter().map(|r| r.overall_quality_score).sum::<f64>() / total as f64,
            high_quality as f64 / total as f64 * 100.0,
        )
    };

    let mut out = String::new();
    let _ = writeln!(out, "DOCUMENT QUALITY ASSESSMENT REPORT");
    let _ = writeln!(out, "==================================");
    let _ = writeln!(
        out,
        "Assessment Date: {}",
        Utc::now().format("%Y-%m-%d %H:%M")
    );
    let _ = writeln!(out, "Total Documents: {}", total);
    let _ = writeln!(
        out,
        "High Quality Documents: {} ({:.1}%)",
        high_quality, share
    );
    let _ = writeln!(
        out,
        "Average Quality Score: {:.3} ({})",
        average,
        QualityGrade::from_score(average)
    );

    if total == 0 {
        return out;
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "INDIVIDUAL DOCUMENT SCORES:");

    let mut ranked: Vec<&DocumentQualityReport> = reports.iter().collect();
    ranked.sort_by(|a, b| b.overall_quality_score.total_cmp(&a.overall_quality_score));

    for report in ranked {
        let _ = writeln!(out);
        let _ = writeln!(out, "{}", report.document_title);
        let _ = writeln!(
            out,
            "   Overall Score: {:.3} ({})",
            report.overall_quality_score, report.grade
        );
        let _ = writeln!(
            out,
            "   Content: {:.2} | Data: {:.2} | Terms: {:.2}",
            report.content_length, report.quantified_data, report.domain_terminology
        );
        let _ = writeln!(
            out,
            "   Actions: {:.2} | Structure: {:.2} | Fresh: {:.2}",
            report.actionable_language, report.structure, report.freshness
        );
        if !report.recommendations.is_empty() {
            let _ = writeln!(
                out,
                "   Recommendations: {}",
                report.recommendations.join(", ")
            );
        }
    }

    out
}
