use super::{RiskScorer, ScoringError};
use crate::underwriting::assessment::{group_thousands, Impact, RiskFactor, RiskResult};
use crate::underwriting::deal::DealTerms;

pub const RULES_MODEL_VERSION: &str = "1.0.0-rules";
pub const RULES_CONFIDENCE: f64 = 75.0;

const BASELINE_SCORE: i16 = 50;
const HIGH_LTV: f64 = 0.80;
const ELEVATED_LTV: f64 = 0.75;
const LOW_LTV: f64 = 0.65;
const HIGH_RATE_PCT: f64 = 10.0;
const LARGE_LOAN: f64 = 10_000_000.0;

/// Deterministic scorer used when no trained model is available. It never
/// fails, so the engine can always return an assessment.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleBasedScorer;

impl RuleBasedScorer {
    pub fn new() -> Self {
        Self
    }

    pub fn assess(&self, terms: &DealTerms) -> RiskResult {
        let (total_score, factors) = score_terms(terms);
        let clamped = total_score.clamp(0, 100) as u8;
        RiskResult::new(clamped, RULES_CONFIDENCE, factors, RULES_MODEL_VERSION)
    }
}

impl RiskScorer for RuleBasedScorer {
    fn score(&self, terms: &DealTerms) -> Result<RiskResult, ScoringError> {
        Ok(self.assess(terms))
    }

    fn model_version(&self) -> &str {
        RULES_MODEL_VERSION
    }
}

fn score_terms(terms: &DealTerms) -> (i16, Vec<RiskFactor>) {
    let mut factors = Vec::new();
    let mut total_score = BASELINE_SCORE;

    let ltv = terms.ltv;
    if ltv > HIGH_LTV {
        factors.push(RiskFactor::new("High LTV", percent(ltv), Impact::High));
        total_score += 15;
    } else if ltv > ELEVATED_LTV {
        factors.push(RiskFactor::new("Elevated LTV", percent(ltv), Impact::Medium));
        total_score += 8;
    } else if ltv < LOW_LTV {
        total_score -= 10;
    }

    if terms.rate > HIGH_RATE_PCT {
        factors.push(RiskFactor::new(
            "High Interest Rate",
            format!("{}%", terms.rate),
            Impact::Medium,
        ));
        total_score += 10;
    }

    if terms.loan_amount > LARGE_LOAN {
        factors.push(RiskFactor::new(
            "Large Loan Amount",
            format!("${}", group_thousands(terms.loan_amount)),
            Impact::Low,
        ));
        total_score += 5;
    }

    if terms.property_type.is_higher_risk() {
        factors.push(RiskFactor::new(
            "Higher Risk Property Type",
            terms.property_type.label().to_string(),
            Impact::High,
        ));
        total_score += 12;
    }

    (total_score, factors)
}

/// Fraction back to the percentage a caller would have sent, e.g. `85%`.
fn percent(fraction: f64) -> String {
    let pct = (fraction * 10_000.0).round() / 100.0;
    format!("{pct}%")
}
