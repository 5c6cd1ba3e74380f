//! Lexical helpers shared by the relevance and quality scorers

use ahash::AHashSet;

/// Minimum token length (exclusive) for a word to count as a keyword
const MIN_KEYWORD_LEN: usize = 3;

/// Lower-cased, de-duplicated keywords of `text`
///
/// Splits on whitespace, trims surrounding punctuation and keeps words longer
/// than three characters.
pub fn keywords(text: &str) -> AHashSet<String> {
    text.split_whitespace()
        .map(|word| word.trim_matches(|c: char| !c.is_alphanumeric()))
        .filter(|word| word.chars().count() > MIN_KEYWORD_LEN)
        .map(str::to_lowercase)
        .collect()
}

/// Share of `query` keywords that also appear in `other` (0 for an empty query)
pub fn overlap_ratio(query: &AHashSet<String>, other: &AHashSet<String>) -> f64 {
    if query.is_empty() {
        return 0.0;
    }
    let matching = query.intersection(other).count();
    matching as f64 / query.len() as f64
}

/// Domain terms counted by substring match against lower-cased text
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DomainVocabulary {
    terms: Vec<String>,
}

impl DomainVocabulary {
    pub fn new<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = AHashSet::new();
        let terms = terms
            .into_iter()
            .map(|t| t.as_ref().trim().to_lowercase())
            .filter(|t| !t.is_empty() && seen.insert(t.clone()))
            .collect();
        Self { terms }
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// Number of distinct vocabulary terms contained in `lowered`
    ///
    /// `lowered` must already be lower-case.
    pub fn count_in(&self, lowered: &str) -> usize {
        self.terms
            .iter()
            .filter(|term| lowered.contains(term.as_str()))
            .count()
    }
}
