mod context;
/// Retrieval relevance engine
///
/// Turns raw search hits into scored, explainable relevance records and
/// renders the relevant ones into the context passed to generation.
/// - ScoringWeights / RelevanceThresholds: validated fusion configuration
/// - RelevanceScorer: vector, keyword, domain and semantic signals per hit
/// - ContextAssembler: ordered, attributed context block
mod scorer;
pub mod text;
mod types;
mod weights;

pub use context::{AssembledContext, ContextAssembler, ContextStats};
pub use scorer::{
    business_context_score, confidence_level, max_raw_score, normalize_vector_score,
    semantic_validation, RelevanceScorer,
};
pub use text::DomainVocabulary;
pub use types::{ConfidenceLevel, DocumentRelevance, RelevanceCategory, RelevanceValidationResult};
pub use weights::{RelevanceThresholds, ScoringWeights, WeightsError, WeightsSpec};
