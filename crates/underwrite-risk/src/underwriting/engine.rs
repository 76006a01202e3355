use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, warn};

use super::assessment::RiskResult;
use super::deal::{DealInputError, DealRecord, DealTerms};
use super::features::FeatureLayout;
use super::model::{store, LoadedModel, ModelLoad};
use super::scoring::{LearnedScorer, RiskScorer, RuleBasedScorer, RULES_MODEL_VERSION};

/// Entry point for risk assessment.
///
/// Owns the artifact location and loads it at most once, on first use. The
/// learned path is taken only when that load succeeded; every other outcome,
/// and any failure while scoring, lands on the rule-based scorer.
#[derive(Debug)]
pub struct RiskEngine {
    model_path: Option<PathBuf>,
    model: OnceLock<ModelLoad>,
    rules: RuleBasedScorer,
}

impl RiskEngine {
    pub fn rules_only() -> Self {
        Self {
            model_path: None,
            model: OnceLock::new(),
            rules: RuleBasedScorer::new(),
        }
    }

    /// Engine that reads the artifact at `path` lazily.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self {
            model_path: Some(path.into()),
            ..Self::rules_only()
        }
    }

    /// Engine around an artifact that is already in memory.
    pub fn with_model(model: LoadedModel) -> Self {
        let engine = Self::rules_only();
        let _ = engine.model.set(ModelLoad::Loaded(model));
        engine
    }

    pub fn model_path(&self) -> Option<&Path> {
        self.model_path.as_deref()
    }

    pub fn model(&self) -> &ModelLoad {
        self.model.get_or_init(|| match &self.model_path {
            None => ModelLoad::NotConfigured,
            Some(path) => {
                let outcome = store::load(path);
                if let ModelLoad::Corrupt { path, error } = &outcome {
                    warn!(
                        path = %path.display(),
                        error = %error,
                        "risk model artifact unusable; using rule-based scoring"
                    );
                }
                outcome
            }
        })
    }

    /// Version tag the next assessment will carry when scoring succeeds.
    pub fn active_version(&self) -> &str {
        match self.model().model() {
            Some(model) => model.version(),
            None => RULES_MODEL_VERSION,
        }
    }

    /// Score resolved terms. Never fails.
    pub fn score(&self, terms: &DealTerms) -> RiskResult {
        if let Some(model) = self.model().model() {
            match LearnedScorer::new(model).score(terms) {
                Ok(result) => return result,
                Err(error) => warn!(
                    version = model.version(),
                    error = %error,
                    "learned scoring failed; falling back to rules"
                ),
            }
        }

        debug!("scoring deal with rule-based fallback");
        self.rules.assess(terms)
    }

    /// Resolve a loosely-typed deal record and score it. Only input errors
    /// surface; scoring itself cannot fail.
    pub fn assess(&self, record: &DealRecord) -> Result<RiskResult, DealInputError> {
        let terms = DealTerms::resolve(record)?;
        Ok(self.score(&terms))
    }

    pub fn status(&self) -> ModelStatus {
        let outcome = self.model();
        let mut status = ModelStatus {
            status: outcome.label(),
            active_version: self.active_version().to_string(),
            path: self.model_path.clone(),
            layout: None,
            trained_at: None,
            training_metrics: BTreeMap::new(),
            error: None,
        };

        match outcome {
            ModelLoad::Loaded(model) => {
                status.layout = Some(model.layout());
                status.trained_at = Some(model.artifact().trained_at);
                status.training_metrics = model.artifact().training_metrics.clone();
            }
            ModelLoad::Corrupt { error, .. } => status.error = Some(error.to_string()),
            ModelLoad::NotConfigured | ModelLoad::Absent { .. } => {}
        }
        status
    }
}

impl Default for RiskEngine {
    fn default() -> Self {
        Self::rules_only()
    }
}

/// Read-only view of the engine's model for operators.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelStatus {
    pub status: &'static str,
    pub active_version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layout: Option<FeatureLayout>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trained_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub training_metrics: BTreeMap<String, f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
