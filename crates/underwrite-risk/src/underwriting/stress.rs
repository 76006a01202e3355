use serde::{Deserialize, Serialize};
use tracing::debug;

use super::assessment::RiskLevel;
use super::deal::{DealInputError, DealRecord, DealTerms};
use super::engine::RiskEngine;

/// Adverse shift applied to a deal before re-scoring.
///
/// `rate_increase` and `occupancy_decrease` are percentage points;
/// `value_decrease` is a percentage of collateral value, which raises the
/// effective LTV while the loan amount stays fixed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StressScenario {
    pub name: String,
    #[serde(default)]
    pub rate_increase: f64,
    #[serde(default)]
    pub occupancy_decrease: f64,
    #[serde(default)]
    pub value_decrease: f64,
}

impl StressScenario {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rate_increase: 0.0,
            occupancy_decrease: 0.0,
            value_decrease: 0.0,
        }
    }

    pub fn rate_increase(mut self, points: f64) -> Self {
        self.rate_increase = points;
        self
    }

    pub fn occupancy_decrease(mut self, points: f64) -> Self {
        self.occupancy_decrease = points;
        self
    }

    pub fn value_decrease(mut self, pct: f64) -> Self {
        self.value_decrease = pct;
        self
    }

    pub fn defaults() -> Vec<Self> {
        vec![
            Self::new("Interest Rate +2%").rate_increase(2.0),
            Self::new("Occupancy -10%").occupancy_decrease(10.0),
            Self::new("Property Value -15%").value_decrease(15.0),
            Self::new("Combined Stress")
                .rate_increase(1.5)
                .occupancy_decrease(5.0)
                .value_decrease(10.0),
        ]
    }

    pub fn validate(&self) -> Result<(), StressError> {
        let invalid = |reason: &str| StressError::InvalidScenario {
            name: self.name.clone(),
            reason: reason.to_string(),
        };

        if !(self.rate_increase.is_finite()
            && self.occupancy_decrease.is_finite()
            && self.value_decrease.is_finite())
        {
            return Err(invalid("shocks must be finite numbers"));
        }
        if !(0.0..100.0).contains(&self.value_decrease) {
            return Err(invalid("value_decrease must be at least 0 and below 100"));
        }
        Ok(())
    }

    /// Shocked copy of `terms`. Occupancy is floored at zero.
    pub fn apply(&self, terms: &DealTerms) -> DealTerms {
        let value_factor = 1.0 - self.value_decrease / 100.0;
        DealTerms {
            rate: terms.rate + self.rate_increase,
            occupancy: (terms.occupancy - self.occupancy_decrease / 100.0).max(0.0),
            ltv: terms.ltv / value_factor,
            ..terms.clone()
        }
    }
}

/// Request body accepted by the stress-test boundary.
#[derive(Debug, Clone, Deserialize)]
pub struct StressRequest {
    pub deal: DealRecord,
    #[serde(default)]
    pub scenarios: Option<Vec<StressScenario>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StressOutcome {
    pub scenario: String,
    pub parameters: StressScenario,
    pub risk_score: u8,
    pub risk_level: RiskLevel,
    /// Score change against the unstressed baseline.
    pub delta: i16,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StressReport {
    pub baseline_risk_score: u8,
    pub baseline_risk_level: RiskLevel,
    pub model_version: String,
    pub stress_test_results: Vec<StressOutcome>,
}

#[derive(Debug, thiserror::Error)]
pub enum StressError {
    #[error(transparent)]
    Input(#[from] DealInputError),
    #[error("scenario `{name}`: {reason}")]
    InvalidScenario { name: String, reason: String },
}

/// Score `terms` as-is, then once per scenario. Scenarios are validated up
/// front so a bad one does not produce a partial report.
pub fn run_stress_test(
    engine: &RiskEngine,
    terms: &DealTerms,
    scenarios: &[StressScenario],
) -> Result<StressReport, StressError> {
    for scenario in scenarios {
        scenario.validate()?;
    }

    let baseline = engine.score(terms);
    let results = scenarios
        .iter()
        .map(|scenario| {
            let stressed = engine.score(&scenario.apply(terms));
            debug!(
                scenario = %scenario.name,
                baseline = baseline.risk_score,
                stressed = stressed.risk_score,
                "stress scenario scored"
            );
            StressOutcome {
                scenario: scenario.name.clone(),
                parameters: scenario.clone(),
                risk_score: stressed.risk_score,
                risk_level: stressed.risk_level,
                delta: i16::from(stressed.risk_score) - i16::from(baseline.risk_score),
            }
        })
        .collect();

    Ok(StressReport {
        baseline_risk_score: baseline.risk_score,
        baseline_risk_level: baseline.risk_level,
        model_version: baseline.model_version,
        stress_test_results: results,
    })
}

/// Resolve a request and run its scenarios, or the default set when none
/// are supplied.
pub fn run_stress_request(
    engine: &RiskEngine,
    request: &StressRequest,
) -> Result<StressReport, StressError> {
    let terms = DealTerms::resolve(&request.deal)?;
    match &request.scenarios {
        Some(scenarios) => run_stress_test(engine, &terms, scenarios),
        None => run_stress_test(engine, &terms, &StressScenario::defaults()),
    }
}
