/// Fusion weights and classification thresholds
use serde::{Deserialize, Serialize};
use thiserror::Error;

const SUM_TOLERANCE: f64 = 1e-9;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum WeightsError {
    #[error("Weight '{name}' must be non-negative, got {value}")]
    Negative { name: &'static str, value: f64 },

    #[error("Weights must sum to 1.0, got {sum}")]
    BadSum { sum: f64 },

    #[error("Thresholds must satisfy 0 <= min ({min}) <= high ({high}) <= 1")]
    InvalidThresholds { min: f64, high: f64 },
}

/// Raw weight tuple as it appears in configuration
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct WeightsSpec {
    pub vector: f64,
    pub keyword: f64,
    pub business: f64,
    pub semantic: f64,
}

/// Fusion weights for the four component scores
///
/// Non-negative and summing to 1.0; only constructible through [`ScoringWeights::new`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "WeightsSpec", into = "WeightsSpec")]
pub struct ScoringWeights {
    vector: f64,
    keyword: f64,
    business: f64,
    semantic: f64,
}

impl ScoringWeights {
    pub fn new(vector: f64, keyword: f64, business: f64, semantic: f64) -> Result<Self, WeightsError> {
        for (name, value) in [
            ("vector", vector),
            ("keyword", keyword),
            ("business", business),
            ("semantic", semantic),
        ] {
            if value.is_nan() || value < 0.0 {
                return Err(WeightsError::Negative { name, value });
            }
        }

        let sum = vector + keyword + business + semantic;
        if (sum - 1.0).abs() >= SUM_TOLERANCE {
            return Err(WeightsError::BadSum { sum });
        }

        Ok(Self {
            vector,
            keyword,
            business,
            semantic,
        })
    }

    pub fn vector(&self) -> f64 {
        self.vector
    }

    pub fn keyword(&self) -> f64 {
        self.keyword
    }

    pub fn business(&self) -> f64 {
        self.business
    }

    pub fn semantic(&self) -> f64 {
        self.semantic
    }

    /// Weighted sum of the component scores
    pub fn fuse(&self, vector: f64, keyword: f64, business: f64, semantic: f64) -> f64 {
        self.vector * vector
            + self.keyword * keyword
            + self.business * business
            + self.semantic * semantic
    }
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            vector: 0.5,
            keyword: 0.2,
            business: 0.2,
            semantic: 0.1,
        }
    }
}

impl TryFrom<WeightsSpec> for ScoringWeights {
    type Error = WeightsError;

    fn try_from(spec: WeightsSpec) -> Result<Self, Self::Error> {
        Self::new(spec.vector, spec.keyword, spec.business, spec.semantic)
    }
}

impl From<ScoringWeights> for WeightsSpec {
    fn from(w: ScoringWeights) -> Self {
        Self {
            vector: w.vector,
            keyword: w.keyword,
            business: w.business,
            semantic: w.semantic,
        }
    }
}

/// Score cut-offs for relevance and the High category (both inclusive)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RelevanceThresholds {
    min: f64,
    high: f64,
}

impl RelevanceThresholds {
    pub fn new(min: f64, high: f64) -> Result<Self, WeightsError> {
        if !(0.0..=1.0).contains(&min) || !(0.0..=1.0).contains(&high) || min > high {
            return Err(WeightsError::InvalidThresholds { min, high });
        }
        Ok(Self { min, high })
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn high(&self) -> f64 {
        self.high
    }
}

impl Default for RelevanceThresholds {
    fn default() -> Self {
        Self {
            min: 0.60,
            high: 0.80,
        }
    }
}
