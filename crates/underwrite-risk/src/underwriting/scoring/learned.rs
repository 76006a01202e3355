use super::{RiskScorer, ScoringError};
use crate::underwriting::assessment::RiskResult;
use crate::underwriting::deal::DealTerms;
use crate::underwriting::explain::explain;
use crate::underwriting::features::DealFeatures;
use crate::underwriting::model::LoadedModel;

/// Scores deals with a validated classifier artifact.
#[derive(Debug, Clone, Copy)]
pub struct LearnedScorer<'a> {
    model: &'a LoadedModel,
}

impl<'a> LearnedScorer<'a> {
    pub fn new(model: &'a LoadedModel) -> Self {
        Self { model }
    }

    /// Probability of default for the deal, before any bucketing.
    pub fn probability(&self, features: &DealFeatures) -> Result<f64, ScoringError> {
        let layout = self.model.layout();
        let vector = features.vector(layout);

        if let Some(index) = vector.iter().position(|value| !value.is_finite()) {
            return Err(ScoringError::NonFiniteFeature {
                feature: layout.names()[index],
            });
        }

        let scaled = match self.model.scaler() {
            Some(scaler) => scaler.transform(&vector)?,
            None => vector,
        };

        let probability = self.model.classifier().predict_proba(&scaled)?;
        if !(0.0..=1.0).contains(&probability) {
            return Err(ScoringError::InvalidProbability(probability));
        }
        Ok(probability)
    }
}

impl RiskScorer for LearnedScorer<'_> {
    fn score(&self, terms: &DealTerms) -> Result<RiskResult, ScoringError> {
        let features = DealFeatures::derive(terms);
        let probability = self.probability(&features)?;

        let risk_score = (probability * 100.0).floor().min(100.0) as u8;
        let confidence = round_to_hundredths(probability.max(1.0 - probability) * 100.0);
        let factors = explain(&features.core());

        Ok(RiskResult::new(
            risk_score,
            confidence,
            factors,
            self.model.version(),
        ))
    }

    fn model_version(&self) -> &str {
        self.model.version()
    }
}

fn round_to_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
