use super::assessment::{Impact, RiskFactor, MAX_RISK_FACTORS};
use super::features::CoreFeatures;

pub const HIGH_LTV_PCT: f64 = 80.0;
pub const MIN_DSCR: f64 = 1.25;
pub const MIN_CREDIT_SCORE: f64 = 680.0;
pub const MIN_OCCUPANCY_PCT: f64 = 85.0;
pub const OLD_PROPERTY_YEARS: f64 = 30.0;

/// Emit the factors whose thresholds the features cross.
///
/// LTV and occupancy arrive as fractions and are shown as percentages.
///
/// Rules run in a fixed order and the list is cut at the first
/// [`MAX_RISK_FACTORS`] matches; it is never re-sorted by severity.
pub fn explain(features: &CoreFeatures) -> Vec<RiskFactor> {
    let ltv_pct = features.ltv * 100.0;
    let occupancy_pct = features.occupancy * 100.0;
    let mut factors = Vec::new();

    if ltv_pct > HIGH_LTV_PCT {
        factors.push(RiskFactor::new(
            "High Loan-to-Value Ratio",
            format!("{ltv_pct:.1}%"),
            Impact::High,
        ));
    }

    if features.dscr < MIN_DSCR {
        factors.push(RiskFactor::new(
            "Low Debt Service Coverage",
            format!("{:.2}x", features.dscr),
            Impact::High,
        ));
    }

    if features.credit_score < MIN_CREDIT_SCORE {
        factors.push(RiskFactor::new(
            "Below Average Credit Score",
            format!("{}", features.credit_score.trunc() as i64),
            Impact::Medium,
        ));
    }

    if occupancy_pct < MIN_OCCUPANCY_PCT {
        factors.push(RiskFactor::new(
            "Low Occupancy Rate",
            format!("{occupancy_pct:.1}%"),
            Impact::Medium,
        ));
    }

    if features.property_age > OLD_PROPERTY_YEARS {
        factors.push(RiskFactor::new(
            "Older Property",
            format!("{} years", features.property_age.trunc() as i64),
            Impact::Low,
        ));
    }

    factors.truncate(MAX_RISK_FACTORS);
    factors
}

#[cfg(test)]
mod tests {
    use super::*;

    fn healthy() -> CoreFeatures {
        CoreFeatures {
            loan_amount: 4_000_000.0,
            ltv: 0.70,
            dscr: 1.45,
            credit_score: 740.0,
            occupancy: 0.95,
            property_age: 12.0,
        }
    }

    #[test]
    fn healthy_deal_has_no_factors() {
        assert!(explain(&healthy()).is_empty());
    }

    #[test]
    fn every_rule_fires_in_evaluation_order() {
        let features = CoreFeatures {
            loan_amount: 9_000_000.0,
            ltv: 0.85,
            dscr: 1.1,
            credit_score: 640.0,
            occupancy: 0.80,
            property_age: 42.0,
        };

        let factors = explain(&features);
        let names: Vec<&str> = factors.iter().map(|factor| factor.name.as_str()).collect();

        assert_eq!(factors.len(), MAX_RISK_FACTORS);
        assert_eq!(
            names,
            vec![
                "High Loan-to-Value Ratio",
                "Low Debt Service Coverage",
                "Below Average Credit Score",
                "Low Occupancy Rate",
                "Older Property",
            ]
        );
        assert_eq!(factors[0].value, "85.0%");
        assert_eq!(factors[0].impact, Impact::High);
        assert_eq!(factors[1].value, "1.10x");
        assert_eq!(factors[2].value, "640");
        assert_eq!(factors[2].impact, Impact::Medium);
        assert_eq!(factors[3].value, "80.0%");
        assert_eq!(factors[4].value, "42 years");
        assert_eq!(factors[4].impact, Impact::Low);
    }

    #[test]
    fn thresholds_are_strict() {
        let features = CoreFeatures {
            ltv: 0.80,
            dscr: 1.25,
            credit_score: 680.0,
            occupancy: 0.85,
            property_age: 30.0,
            ..healthy()
        };
        assert!(explain(&features).is_empty());
    }

    #[test]
    fn leverage_above_full_value_is_high_ltv() {
        let features = CoreFeatures {
            ltv: 1.05,
            occupancy: 0.70,
            ..healthy()
        };
        let factors = explain(&features);

        assert_eq!(factors.len(), 2);
        assert_eq!(factors[0].name, "High Loan-to-Value Ratio");
        assert_eq!(factors[0].value, "105.0%");
        assert_eq!(factors[0].impact, Impact::High);
        assert_eq!(factors[1].name, "Low Occupancy Rate");
        assert_eq!(factors[1].value, "70.0%");
    }

    #[test]
    fn fractional_occupancy_of_one_is_fully_leased() {
        let features = CoreFeatures {
            occupancy: 1.0,
            ..healthy()
        };
        assert!(explain(&features).is_empty());
    }
}
