use std::path::Path;
use std::sync::Arc;

use axum::response::Response;
use serde_json::Value;

use crate::underwriting::deal::DealRecord;
use crate::underwriting::engine::RiskEngine;
use crate::underwriting::features::FeatureLayout;
use crate::underwriting::model::{store, Classifier, ModelArtifact, RegressionTree, TreeNode};
use crate::underwriting::risk_router;

pub(super) fn baseline_deal() -> DealRecord {
    DealRecord::new()
        .with("loan_amount", 5_000_000)
        .with("requested_ltv", 75)
        .with("requested_rate", 7.5)
        .with("requested_term_months", 36)
        .with("asset_type", "multifamily")
}

pub(super) fn stretched_deal() -> DealRecord {
    baseline_deal()
        .with("requested_ltv", 85)
        .with("requested_rate", 11)
}

pub(super) fn land_deal() -> DealRecord {
    baseline_deal()
        .with("loan_amount", 12_000_000)
        .with("asset_type", "land")
}

/// Logistic model whose probability depends on LTV alone.
pub(super) fn ltv_artifact(version: &str) -> ModelArtifact {
    ModelArtifact::new(
        FeatureLayout::Core,
        Classifier::Logistic {
            coefficients: vec![0.0, 8.0, 0.0, 0.0, 0.0, 0.0],
            intercept: -6.0,
        },
        None,
        version,
    )
}

/// Single-stump booster over the extended layout, splitting on the rate.
pub(super) fn rate_booster(version: &str) -> ModelArtifact {
    ModelArtifact::new(
        FeatureLayout::Extended,
        Classifier::GradientBoosted {
            base_score: 0.3,
            trees: vec![RegressionTree {
                nodes: vec![
                    TreeNode::Split {
                        feature: 4,
                        threshold: 10.0,
                        left: 1,
                        right: 2,
                    },
                    TreeNode::Leaf { value: -0.5 },
                    TreeNode::Leaf { value: 1.5 },
                ],
            }],
        },
        None,
        version,
    )
}

pub(super) fn engine_with_saved(dir: &Path, artifact: &ModelArtifact) -> RiskEngine {
    let path = dir.join("risk_model.json");
    store::save(&path, artifact).expect("artifact saves");
    RiskEngine::from_path(path)
}

pub(super) fn router_for(engine: RiskEngine) -> axum::Router {
    risk_router(Arc::new(engine))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
