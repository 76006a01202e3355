//! Loan default-risk assessment.
//!
//! A [`DealRecord`] is resolved into [`DealTerms`], expanded into
//! [`DealFeatures`], and scored by the [`RiskEngine`], which prefers a loaded
//! classifier artifact and falls back to deterministic rules.

pub mod amortization;
pub mod assessment;
pub mod dataset;
pub mod deal;
pub mod engine;
pub mod explain;
pub mod features;
pub mod model;
pub mod router;
pub mod scoring;
pub mod stress;

#[cfg(test)]
mod tests;

pub use amortization::annual_debt_service;
pub use assessment::{Impact, RiskFactor, RiskLevel, RiskResult, MAX_RISK_FACTORS};
pub use dataset::{load_training_set, read_training_set, DatasetError, DatasetSummary, TrainingSet};
pub use deal::{DealInputError, DealRecord, DealTerms, PropertyType};
pub use engine::{ModelStatus, RiskEngine};
pub use explain::explain;
pub use features::{CoreFeatures, DealFeatures, FeatureLayout, SuppliedMetrics};
pub use model::{
    Classifier, LoadedModel, ModelArtifact, ModelLoad, ModelStoreError, RegressionTree,
    StandardScaler, TreeNode,
};
pub use router::risk_router;
pub use scoring::{LearnedScorer, RiskScorer, RuleBasedScorer, ScoringError, RULES_MODEL_VERSION};
pub use stress::{
    run_stress_request, run_stress_test, StressError, StressOutcome, StressReport, StressRequest,
    StressScenario,
};
