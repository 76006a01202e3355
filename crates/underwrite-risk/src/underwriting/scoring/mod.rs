mod learned;
mod rules;

pub use learned::LearnedScorer;
pub use rules::{RuleBasedScorer, RULES_CONFIDENCE, RULES_MODEL_VERSION};

use super::assessment::RiskResult;
use super::deal::DealTerms;

/// A strategy that turns resolved deal terms into an assessment.
pub trait RiskScorer {
    fn score(&self, terms: &DealTerms) -> Result<RiskResult, ScoringError>;

    fn model_version(&self) -> &str;
}

/// Failure inside the learned path. The engine recovers from every variant
/// by falling back to the rule-based scorer.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScoringError {
    #[error("expected {expected} features, found {found}")]
    FeatureCount { expected: usize, found: usize },
    #[error("feature `{feature}` is not finite")]
    NonFiniteFeature { feature: &'static str },
    #[error("classifier produced a non-finite margin")]
    NonFiniteMargin,
    #[error("tree traversal did not reach a leaf")]
    MalformedTree,
    #[error("probability {0} outside [0, 1]")]
    InvalidProbability(f64),
}
