//! A trainer hands the engine a persisted artifact; these scenarios follow one
//! from a prepared CSV dataset through save, lazy load, and scoring.

use std::collections::BTreeMap;

use underwrite_risk::underwriting::model::store;
use underwrite_risk::underwriting::{
    read_training_set, Classifier, DealRecord, FeatureLayout, ModelArtifact, ModelLoad,
    RiskEngine, StressScenario, RULES_MODEL_VERSION,
};

const LOANS: &str = "\
loan_amount,ltv,rate,term_months,property_type,borrower_credit_score,occupancy_rate,noi,outcome
4200000,68,6.9,60,multifamily,745,0.95,310000,performing
9800000,84,9.8,36,office,655,0.74,,default
2500000,72,7.4,120,industrial,705,0.91,190000,performing
6100000,79,8.6,84,retail,690,0.83,,default
";

fn fitted_artifact(version: &str) -> ModelArtifact {
    let set = read_training_set(LOANS.as_bytes()).expect("dataset parses");
    let scaler = set.fit_scaler().expect("scaler fits");

    let mut metrics = BTreeMap::new();
    metrics.insert("samples".to_string(), set.len() as f64);
    metrics.insert("default_rate".to_string(), set.default_rate());

    // Leans on LTV (column 0) and occupancy (column 9).
    let mut coefficients = vec![0.0; FeatureLayout::Extended.len()];
    coefficients[0] = 1.2;
    coefficients[9] = -0.8;

    ModelArtifact::new(
        FeatureLayout::Extended,
        Classifier::Logistic {
            coefficients,
            intercept: 0.0,
        },
        Some(scaler),
        version,
    )
    .with_metrics(metrics)
}

#[test]
fn dataset_to_served_model() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("models").join("risk_model.json");

    let metrics_path = store::save(&path, &fitted_artifact("1.1.0")).expect("saves");
    assert!(metrics_path.ends_with("risk_model_metrics.json"));

    let engine = RiskEngine::from_path(&path);
    let safe = engine
        .assess(
            &DealRecord::new()
                .with("loan_amount", 3_000_000)
                .with("requested_ltv", 60)
                .with("occupancy_rate", 97),
        )
        .expect("valid deal");
    let risky = engine
        .assess(
            &DealRecord::new()
                .with("loan_amount", 3_000_000)
                .with("requested_ltv", 90)
                .with("occupancy_rate", 70),
        )
        .expect("valid deal");

    assert_eq!(safe.model_version, "1.1.0");
    assert!(risky.risk_score > safe.risk_score);
    assert_eq!(risky.risk_factors[0].name, "High Loan-to-Value Ratio");

    let status = engine.status();
    assert_eq!(status.status, "loaded");
    assert_eq!(status.training_metrics.get("samples"), Some(&4.0));
    assert_eq!(status.training_metrics.get("default_rate"), Some(&0.5));
}

#[test]
fn artifact_with_foreign_feature_names_is_never_served() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("risk_model.json");

    let mut document = serde_json::to_value(fitted_artifact("1.0.0")).expect("serializes");
    document["feature_names"][3] = serde_json::json!("appraised_value");
    std::fs::write(&path, document.to_string()).expect("writes");

    assert!(matches!(store::load(&path), ModelLoad::Corrupt { .. }));

    let engine = RiskEngine::from_path(&path);
    let result = engine
        .assess(&DealRecord::new().with("loan_amount", 3_000_000))
        .expect("valid deal");
    assert_eq!(result.model_version, RULES_MODEL_VERSION);
}

#[test]
fn stress_scenarios_rescore_with_the_loaded_model() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("risk_model.json");
    store::save(&path, &fitted_artifact("1.1.0")).expect("saves");
    let engine = RiskEngine::from_path(&path);

    let terms = underwrite_risk::underwriting::DealTerms::resolve(
        &DealRecord::new()
            .with("loan_amount", 5_000_000)
            .with("requested_ltv", 70),
    )
    .expect("valid deal");

    let report = underwrite_risk::underwriting::run_stress_test(
        &engine,
        &terms,
        &StressScenario::defaults(),
    )
    .expect("valid scenarios");

    assert_eq!(report.model_version, "1.1.0");
    // Occupancy and value shocks both push a positive-LTV, negative-occupancy model up.
    assert!(report.stress_test_results[1].delta >= 0);
    assert!(report.stress_test_results[2].delta >= 0);
}
