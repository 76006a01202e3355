use serde::{Deserialize, Serialize};

use super::amortization::annual_debt_service;
use super::deal::DealTerms;

/// Flat yield used to estimate NOI when none is supplied.
pub const NOI_YIELD_ESTIMATE: f64 = 0.06;
/// Property value multiplier applied when LTV is missing or zero.
pub const MISSING_LTV_VALUE_MULTIPLIER: f64 = 1.5;
pub const DEFAULT_DSCR: f64 = 1.0;
pub const DEFAULT_CAP_RATE_PCT: f64 = 6.0;

pub const CORE_FEATURE_NAMES: [&str; 6] = [
    "loan_amount",
    "ltv",
    "dscr",
    "borrower_credit_score",
    "occupancy_rate",
    "property_age",
];

pub const EXTENDED_FEATURE_NAMES: [&str; 12] = [
    "ltv_ratio",
    "dscr",
    "loan_amount",
    "property_value",
    "interest_rate",
    "term_months",
    "property_type_encoded",
    "location_score",
    "borrower_credit_score",
    "occupancy_rate",
    "noi",
    "cap_rate",
];

/// Interpret a ratio that may arrive as a percentage or a fraction.
///
/// Anything above 1.0 is a percentage. A percentage at or below 1.0 (an LTV
/// of 0.5%) is indistinguishable from a fraction and is read as one.
pub fn normalize_fraction(value: f64) -> f64 {
    if value > 1.0 {
        value / 100.0
    } else {
        value
    }
}

/// Column order a classifier was trained on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureLayout {
    /// Six fields served at inference time.
    Core,
    /// Twelve fields produced by the training dataset reader.
    Extended,
}

impl FeatureLayout {
    pub fn names(self) -> &'static [&'static str] {
        match self {
            Self::Core => &CORE_FEATURE_NAMES,
            Self::Extended => &EXTENDED_FEATURE_NAMES,
        }
    }

    pub fn len(self) -> usize {
        self.names().len()
    }

    /// Match a persisted feature-name list against the known layouts. Order
    /// matters; a permutation is not accepted.
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> Option<Self> {
        [Self::Core, Self::Extended].into_iter().find(|layout| {
            let expected = layout.names();
            expected.len() == names.len()
                && expected
                    .iter()
                    .zip(names)
                    .all(|(expected, actual)| *expected == actual.as_ref())
        })
    }
}

/// Metrics supplied directly by historical data rather than estimated.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SuppliedMetrics {
    pub noi: Option<f64>,
    pub dscr: Option<f64>,
    pub cap_rate: Option<f64>,
}

/// Every value the deriver computes for a deal, in canonical units: LTV and
/// occupancy as fractions, rates as percentages.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DealFeatures {
    pub loan_amount: f64,
    pub ltv: f64,
    pub dscr: f64,
    pub borrower_credit_score: f64,
    pub occupancy_rate: f64,
    pub property_age: f64,
    pub property_value: f64,
    pub interest_rate: f64,
    pub term_months: u32,
    pub property_type_code: u8,
    pub location_score: f64,
    pub noi: f64,
    pub cap_rate: f64,
    pub annual_debt_service: f64,
}

impl DealFeatures {
    /// Inference-path derivation: NOI is always estimated.
    pub fn derive(terms: &DealTerms) -> Self {
        Self::derive_with(terms, SuppliedMetrics::default())
    }

    pub fn derive_with(terms: &DealTerms, supplied: SuppliedMetrics) -> Self {
        let ltv = terms.ltv;
        let property_value = if ltv > 0.0 {
            terms.loan_amount / ltv
        } else {
            terms.loan_amount * MISSING_LTV_VALUE_MULTIPLIER
        };

        let noi = supplied
            .noi
            .unwrap_or(property_value * NOI_YIELD_ESTIMATE);
        let debt_service =
            annual_debt_service(terms.loan_amount, terms.rate, terms.term_months);

        let dscr = supplied.dscr.unwrap_or(if debt_service > 0.0 {
            noi / debt_service
        } else {
            DEFAULT_DSCR
        });
        let cap_rate = supplied.cap_rate.unwrap_or(if property_value > 0.0 {
            noi / property_value * 100.0
        } else {
            DEFAULT_CAP_RATE_PCT
        });

        Self {
            loan_amount: terms.loan_amount,
            ltv,
            dscr,
            borrower_credit_score: terms.borrower_credit_score,
            occupancy_rate: terms.occupancy,
            property_age: terms.property_age,
            property_value,
            interest_rate: terms.rate,
            term_months: terms.term_months,
            property_type_code: terms.property_type.code(),
            location_score: terms.location_score,
            noi,
            cap_rate,
            annual_debt_service: debt_service,
        }
    }

    pub fn core(&self) -> CoreFeatures {
        CoreFeatures {
            loan_amount: self.loan_amount,
            ltv: self.ltv,
            dscr: self.dscr,
            credit_score: self.borrower_credit_score,
            occupancy: self.occupancy_rate,
            property_age: self.property_age,
        }
    }

    /// Ordered vector for the given layout.
    pub fn vector(&self, layout: FeatureLayout) -> Vec<f64> {
        match layout {
            FeatureLayout::Core => self.core().to_array().to_vec(),
            FeatureLayout::Extended => vec![
                self.ltv,
                self.dscr,
                self.loan_amount,
                self.property_value,
                self.interest_rate,
                f64::from(self.term_months),
                f64::from(self.property_type_code),
                self.location_score,
                self.borrower_credit_score,
                self.occupancy_rate,
                self.noi,
                self.cap_rate,
            ],
        }
    }
}

/// The six-field view consumed by the core classifier and the explainer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoreFeatures {
    pub loan_amount: f64,
    pub ltv: f64,
    pub dscr: f64,
    pub credit_score: f64,
    pub occupancy: f64,
    pub property_age: f64,
}

impl CoreFeatures {
    pub fn to_array(self) -> [f64; 6] {
        [
            self.loan_amount,
            self.ltv,
            self.dscr,
            self.credit_score,
            self.occupancy,
            self.property_age,
        ]
    }

    pub fn from_array(values: [f64; 6]) -> Self {
        let [loan_amount, ltv, dscr, credit_score, occupancy, property_age] = values;
        Self {
            loan_amount,
            ltv,
            dscr,
            credit_score,
            occupancy,
            property_age,
        }
    }
}
