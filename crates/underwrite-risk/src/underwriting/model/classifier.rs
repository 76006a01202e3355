use serde::{Deserialize, Serialize};

use crate::underwriting::scoring::ScoringError;

/// Persisted probability-of-default model. Only inference lives here; the
/// parameters come from an external training job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Classifier {
    Logistic {
        coefficients: Vec<f64>,
        intercept: f64,
    },
    /// Additive tree ensemble on the logit scale, evaluated the way
    /// `binary:logistic` boosters are: `sigmoid(logit(base_score) + Σ leaf)`.
    GradientBoosted {
        base_score: f64,
        trees: Vec<RegressionTree>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionTree {
    pub nodes: Vec<TreeNode>,
}

/// Node `0` is the root. Splits send `value < threshold` to `left`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "node", rename_all = "snake_case")]
pub enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: f64,
    },
}

impl Classifier {
    /// Structural checks run when an artifact is loaded or saved.
    pub fn validate(&self, feature_count: usize) -> Result<(), String> {
        match self {
            Classifier::Logistic {
                coefficients,
                intercept,
            } => {
                if coefficients.len() != feature_count {
                    return Err(format!(
                        "logistic model has {} coefficients for {} features",
                        coefficients.len(),
                        feature_count
                    ));
                }
                if !intercept.is_finite() || coefficients.iter().any(|c| !c.is_finite()) {
                    return Err("logistic model has non-finite parameters".to_string());
                }
                Ok(())
            }
            Classifier::GradientBoosted { base_score, trees } => {
                if !(*base_score > 0.0 && *base_score < 1.0) {
                    return Err(format!("base_score {base_score} must lie strictly in (0, 1)"));
                }
                for (index, tree) in trees.iter().enumerate() {
                    tree.validate(feature_count)
                        .map_err(|reason| format!("tree {index}: {reason}"))?;
                }
                Ok(())
            }
        }
    }

    /// Probability of default for an already-scaled feature vector.
    pub fn predict_proba(&self, features: &[f64]) -> Result<f64, ScoringError> {
        let margin = match self {
            Classifier::Logistic {
                coefficients,
                intercept,
            } => {
                if coefficients.len() != features.len() {
                    return Err(ScoringError::FeatureCount {
                        expected: coefficients.len(),
                        found: features.len(),
                    });
                }
                intercept
                    + coefficients
                        .iter()
                        .zip(features)
                        .map(|(weight, value)| weight * value)
                        .sum::<f64>()
            }
            Classifier::GradientBoosted { base_score, trees } => {
                let mut margin = logit(*base_score);
                for tree in trees {
                    margin += tree.evaluate(features)?;
                }
                margin
            }
        };

        if !margin.is_finite() {
            return Err(ScoringError::NonFiniteMargin);
        }
        Ok(sigmoid(margin))
    }
}

impl RegressionTree {
    fn validate(&self, feature_count: usize) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("tree has no nodes".to_string());
        }
        for (index, node) in self.nodes.iter().enumerate() {
            match node {
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    if *feature >= feature_count {
                        return Err(format!(
                            "node {index} splits on feature {feature} of {feature_count}"
                        ));
                    }
                    if threshold.is_nan() {
                        return Err(format!("node {index} has a NaN threshold"));
                    }
                    // Children must point forward, which also rules out cycles.
                    for child in [left, right] {
                        if *child <= index || *child >= self.nodes.len() {
                            return Err(format!("node {index} has invalid child {child}"));
                        }
                    }
                }
                TreeNode::Leaf { value } => {
                    if !value.is_finite() {
                        return Err(format!("leaf {index} is not finite"));
                    }
                }
            }
        }
        Ok(())
    }

    fn evaluate(&self, features: &[f64]) -> Result<f64, ScoringError> {
        let mut index = 0;
        // A valid path visits each node at most once.
        for _ in 0..=self.nodes.len() {
            match self.nodes.get(index) {
                Some(TreeNode::Leaf { value }) => return Ok(*value),
                Some(TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                }) => {
                    let value = features.get(*feature).ok_or(ScoringError::FeatureCount {
                        expected: feature + 1,
                        found: features.len(),
                    })?;
                    index = if *value < *threshold { *left } else { *right };
                }
                None => break,
            }
        }
        Err(ScoringError::MalformedTree)
    }
}

fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

fn logit(p: f64) -> f64 {
    (p / (1.0 - p)).ln()
}
