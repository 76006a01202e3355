use std::fmt;

use serde::{Deserialize, Serialize};

/// Most risk factors reported on a single assessment.
pub const MAX_RISK_FACTORS: usize = 5;

/// Categorical bucket derived from the numeric score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Moderate,
    Elevated,
    High,
}

impl RiskLevel {
    pub fn from_score(score: u8) -> Self {
        match score {
            0..=29 => Self::Low,
            30..=49 => Self::Moderate,
            50..=69 => Self::Elevated,
            _ => Self::High,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Moderate => "moderate",
            Self::Elevated => "elevated",
            Self::High => "high",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Impact {
    Low,
    Medium,
    High,
}

/// Human-readable driver behind a score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskFactor {
    #[serde(rename = "factor")]
    pub name: String,
    pub value: String,
    pub impact: Impact,
}

impl RiskFactor {
    pub fn new(name: &str, value: String, impact: Impact) -> Self {
        Self {
            name: name.to_string(),
            value,
            impact,
        }
    }
}

/// Assessment returned by every scoring path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskResult {
    pub risk_score: u8,
    pub confidence: f64,
    pub risk_level: RiskLevel,
    pub risk_factors: Vec<RiskFactor>,
    pub model_version: String,
}

impl RiskResult {
    /// Build a result, deriving the level from the score and enforcing the
    /// factor cap.
    pub fn new(
        risk_score: u8,
        confidence: f64,
        mut risk_factors: Vec<RiskFactor>,
        model_version: impl Into<String>,
    ) -> Self {
        let risk_score = risk_score.min(100);
        risk_factors.truncate(MAX_RISK_FACTORS);
        Self {
            risk_score,
            confidence,
            risk_level: RiskLevel::from_score(risk_score),
            risk_factors,
            model_version: model_version.into(),
        }
    }
}

/// Format a count or amount with thousands separators, dropping decimals.
pub(crate) fn group_thousands(value: f64) -> String {
    let rounded = value.round();
    let digits = format!("{:.0}", rounded.abs());
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if rounded < 0.0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_thresholds() {
        assert_eq!(RiskLevel::from_score(0), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score(29), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score(30), RiskLevel::Moderate);
        assert_eq!(RiskLevel::from_score(49), RiskLevel::Moderate);
        assert_eq!(RiskLevel::from_score(50), RiskLevel::Elevated);
        assert_eq!(RiskLevel::from_score(69), RiskLevel::Elevated);
        assert_eq!(RiskLevel::from_score(70), RiskLevel::High);
        assert_eq!(RiskLevel::from_score(100), RiskLevel::High);
    }

    #[test]
    fn result_caps_factors_and_score() {
        let factors = (0..8)
            .map(|index| RiskFactor::new("Factor", index.to_string(), Impact::Low))
            .collect();
        let result = RiskResult::new(140, 60.0, factors, "test");

        assert_eq!(result.risk_score, 100);
        assert_eq!(result.risk_level, RiskLevel::High);
        assert_eq!(result.risk_factors.len(), MAX_RISK_FACTORS);
        assert_eq!(result.risk_factors[4].value, "4");
    }

    #[test]
    fn serializes_with_wire_field_names() {
        let result = RiskResult::new(
            42,
            75.0,
            vec![RiskFactor::new("High LTV", "85%".to_string(), Impact::High)],
            "1.0.0-rules",
        );
        let json = serde_json::to_value(&result).expect("serializes");

        assert_eq!(json["risk_level"], "moderate");
        assert_eq!(json["risk_factors"][0]["factor"], "High LTV");
        assert_eq!(json["risk_factors"][0]["impact"], "high");
        assert_eq!(json["confidence"], 75.0);
    }

    #[test]
    fn groups_thousands() {
        assert_eq!(group_thousands(12_000_000.0), "12,000,000");
        assert_eq!(group_thousands(999.4), "999");
        assert_eq!(group_thousands(1_000.0), "1,000");
        assert_eq!(group_thousands(-25_500.0), "-25,500");
        assert_eq!(group_thousands(0.0), "0");
    }
}
