use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::classifier::Classifier;
use super::scaler::StandardScaler;
use super::store::ModelStoreError;
use crate::underwriting::features::FeatureLayout;

/// Everything a training run hands to the scoring engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub version: String,
    pub feature_names: Vec<String>,
    pub classifier: Classifier,
    #[serde(default)]
    pub scaler: Option<StandardScaler>,
    #[serde(default)]
    pub training_metrics: BTreeMap<String, f64>,
    pub trained_at: DateTime<Utc>,
}

impl ModelArtifact {
    pub fn new(
        layout: FeatureLayout,
        classifier: Classifier,
        scaler: Option<StandardScaler>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            version: version.into(),
            feature_names: layout.names().iter().map(|name| name.to_string()).collect(),
            classifier,
            scaler,
            training_metrics: BTreeMap::new(),
            trained_at: Utc::now(),
        }
    }

    pub fn with_metrics(mut self, metrics: BTreeMap<String, f64>) -> Self {
        self.training_metrics = metrics;
        self
    }

    /// Check the artifact is usable by the engine and pin its layout.
    pub fn validate(self) -> Result<LoadedModel, ModelStoreError> {
        if !is_semantic_version(&self.version) {
            return Err(ModelStoreError::InvalidVersion(self.version));
        }

        let layout = FeatureLayout::from_names(&self.feature_names).ok_or_else(|| {
            ModelStoreError::UnknownFeatureLayout {
                names: self.feature_names.clone(),
            }
        })?;

        if let Some(scaler) = &self.scaler {
            scaler.validate().map_err(ModelStoreError::InvalidScaler)?;
            if scaler.len() != layout.len() {
                return Err(ModelStoreError::InvalidScaler(format!(
                    "scaler covers {} features, layout has {}",
                    scaler.len(),
                    layout.len()
                )));
            }
        }

        self.classifier
            .validate(layout.len())
            .map_err(ModelStoreError::InvalidClassifier)?;

        Ok(LoadedModel {
            layout,
            artifact: self,
        })
    }
}

/// An artifact that passed validation, ready for inference.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedModel {
    layout: FeatureLayout,
    artifact: ModelArtifact,
}

impl LoadedModel {
    pub fn layout(&self) -> FeatureLayout {
        self.layout
    }

    pub fn version(&self) -> &str {
        &self.artifact.version
    }

    pub fn classifier(&self) -> &Classifier {
        &self.artifact.classifier
    }

    pub fn scaler(&self) -> Option<&StandardScaler> {
        self.artifact.scaler.as_ref()
    }

    pub fn artifact(&self) -> &ModelArtifact {
        &self.artifact
    }
}

fn is_semantic_version(raw: &str) -> bool {
    let core = raw.split(['-', '+']).next().unwrap_or_default();
    let parts: Vec<&str> = core.split('.').collect();
    parts.len() == 3
        && parts
            .iter()
            .all(|part| !part.is_empty() && part.chars().all(|ch| ch.is_ascii_digit()))
}
