use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::artifact::{LoadedModel, ModelArtifact};

/// Result of looking for a persisted artifact. Only `Loaded` enables the
/// learned scoring path.
#[derive(Debug)]
pub enum ModelLoad {
    Loaded(LoadedModel),
    /// The engine was built without an artifact location.
    NotConfigured,
    Absent {
        path: PathBuf,
    },
    Corrupt {
        path: PathBuf,
        error: ModelStoreError,
    },
}

impl ModelLoad {
    pub fn model(&self) -> Option<&LoadedModel> {
        match self {
            ModelLoad::Loaded(model) => Some(model),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ModelLoad::Loaded(_) => "loaded",
            ModelLoad::NotConfigured => "not_configured",
            ModelLoad::Absent { .. } => "absent",
            ModelLoad::Corrupt { .. } => "corrupt",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ModelStoreError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("artifact is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("feature names {names:?} match no known layout")]
    UnknownFeatureLayout { names: Vec<String> },
    #[error("invalid scaler: {0}")]
    InvalidScaler(String),
    #[error("invalid classifier: {0}")]
    InvalidClassifier(String),
    #[error("version `{0}` is not MAJOR.MINOR.PATCH")]
    InvalidVersion(String),
}

fn io_error(path: &Path, source: io::Error) -> ModelStoreError {
    ModelStoreError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Read and validate the artifact at `path`.
pub fn load(path: &Path) -> ModelLoad {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            info!(path = %path.display(), "no risk model artifact; using rule-based scoring");
            return ModelLoad::Absent {
                path: path.to_path_buf(),
            };
        }
        Err(err) => {
            return ModelLoad::Corrupt {
                path: path.to_path_buf(),
                error: io_error(path, err),
            }
        }
    };

    match parse(&raw) {
        Ok(model) => {
            info!(
                path = %path.display(),
                version = model.version(),
                layout = ?model.layout(),
                "loaded risk model artifact"
            );
            ModelLoad::Loaded(model)
        }
        Err(error) => ModelLoad::Corrupt {
            path: path.to_path_buf(),
            error,
        },
    }
}

pub fn parse(raw: &str) -> Result<LoadedModel, ModelStoreError> {
    let artifact: ModelArtifact = serde_json::from_str(raw)?;
    artifact.validate()
}

/// Persist `artifact` to `path` and its training metrics beside it.
///
/// The artifact is validated first so an unusable model never reaches disk.
/// Each file is written to a temporary sibling and renamed into place. The
/// metrics go first, so a failed save never leaves a new artifact live, but
/// the pair is not replaced atomically. Returns the path of the metrics file.
pub fn save(path: &Path, artifact: &ModelArtifact) -> Result<PathBuf, ModelStoreError> {
    artifact.clone().validate()?;

    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|err| io_error(parent, err))?;
    }

    let metrics_path = metrics_path(path);
    let metrics = serde_json::to_vec_pretty(&artifact.training_metrics)?;
    write_atomic(&metrics_path, &metrics)?;

    let document = serde_json::to_vec_pretty(artifact)?;
    write_atomic(path, &document)?;

    debug!(
        path = %path.display(),
        metrics = %metrics_path.display(),
        version = %artifact.version,
        "saved risk model artifact"
    );
    Ok(metrics_path)
}

/// `models/risk_model.json` -> `models/risk_model_metrics.json`.
pub fn metrics_path(path: &Path) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "model".to_string());
    path.with_file_name(format!("{stem}_metrics.json"))
}

fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), ModelStoreError> {
    let mut tmp_name = path.file_name().unwrap_or_default().to_os_string();
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(tmp_name);

    let written = fs::File::create(&tmp_path).and_then(|mut file| {
        file.write_all(contents)?;
        file.sync_all()
    });
    if let Err(err) = written {
        let _ = fs::remove_file(&tmp_path);
        return Err(io_error(&tmp_path, err));
    }

    fs::rename(&tmp_path, path).map_err(|err| {
        let _ = fs::remove_file(&tmp_path);
        io_error(path, err)
    })
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::underwriting::features::FeatureLayout;
    use crate::underwriting::model::{Classifier, StandardScaler};

    fn artifact() -> ModelArtifact {
        let mut metrics = BTreeMap::new();
        metrics.insert("auc".to_string(), 0.81);
        metrics.insert("samples".to_string(), 1200.0);
        ModelArtifact::new(
            FeatureLayout::Core,
            Classifier::Logistic {
                coefficients: vec![0.0, 1.5, -0.8, -0.4, -0.3, 0.1],
                intercept: -1.2,
            },
            Some(StandardScaler {
                mean: vec![5_000_000.0, 0.7, 1.3, 710.0, 0.9, 20.0],
                scale: vec![2_000_000.0, 0.1, 0.3, 40.0, 0.05, 10.0],
            }),
            "1.3.0",
        )
        .with_metrics(metrics)
    }

    #[test]
    fn save_then_load_restores_artifact() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested/models/risk_model.json");

        let metrics = save(&path, &artifact()).expect("saves");
        assert_eq!(metrics, dir.path().join("nested/models/risk_model_metrics.json"));

        let written: BTreeMap<String, f64> =
            serde_json::from_str(&fs::read_to_string(&metrics).expect("metrics file"))
                .expect("metrics json");
        assert_eq!(written.get("samples"), Some(&1200.0));
        assert!((written["auc"] - 0.81).abs() < 1e-12);

        match load(&path) {
            ModelLoad::Loaded(model) => {
                assert_eq!(model.version(), "1.3.0");
                assert_eq!(model.layout(), FeatureLayout::Core);
                assert!(model.scaler().is_some());
                assert_eq!(model.artifact().feature_names, artifact().feature_names);
            }
            other => panic!("expected loaded model, got {other:?}"),
        }

        let leftovers: Vec<_> = fs::read_dir(path.parent().expect("parent"))
            .expect("lists")
            .filter_map(Result::ok)
            .filter(|entry| entry.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn missing_file_is_absent() {
        let dir = tempfile::tempdir().expect("tempdir");
        let outcome = load(&dir.path().join("risk_model.json"));
        assert!(matches!(outcome, ModelLoad::Absent { .. }));
        assert!(outcome.model().is_none());
    }

    #[test]
    fn unparsable_file_is_corrupt() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("risk_model.json");
        fs::write(&path, "{ not json").expect("writes");

        match load(&path) {
            ModelLoad::Corrupt { error, .. } => {
                assert!(matches!(error, ModelStoreError::Parse(_)))
            }
            other => panic!("expected corrupt, got {other:?}"),
        }
    }

    #[test]
    fn unexpected_feature_list_is_corrupt() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("risk_model.json");
        let mut value = serde_json::to_value(artifact()).expect("serializes");
        value["feature_names"] = serde_json::json!(["ltv", "dscr"]);
        fs::write(&path, value.to_string()).expect("writes");

        let outcome = load(&path);
        assert_eq!(outcome.label(), "corrupt");
        assert!(matches!(
            outcome,
            ModelLoad::Corrupt {
                error: ModelStoreError::UnknownFeatureLayout { .. },
                ..
            }
        ));
    }

    #[test]
    fn save_refuses_invalid_artifact() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("risk_model.json");
        let mut invalid = artifact();
        invalid.version = "next".to_string();

        assert!(matches!(
            save(&path, &invalid),
            Err(ModelStoreError::InvalidVersion(_))
        ));
        assert!(!path.exists());
    }

    #[test]
    fn failed_metrics_write_keeps_previous_artifact_live() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("risk_model.json");
        save(&path, &artifact()).expect("first save");
        let previous = fs::read_to_string(&path).expect("reads");

        // A non-empty directory in the side-file's place makes its rename fail.
        let metrics = metrics_path(&path);
        fs::remove_file(&metrics).expect("removes metrics");
        fs::create_dir(&metrics).expect("creates blocker");
        fs::write(metrics.join("keep"), b"x").expect("fills blocker");

        let mut next = artifact();
        next.version = "2.0.0".to_string();
        assert!(matches!(save(&path, &next), Err(ModelStoreError::Io { .. })));

        assert_eq!(fs::read_to_string(&path).expect("reads"), previous);
        assert_eq!(parse(&previous).expect("valid").version(), "1.3.0");
    }

    #[test]
    fn metrics_path_uses_stem() {
        assert_eq!(
            metrics_path(Path::new("models/risk_model.json")),
            PathBuf::from("models/risk_model_metrics.json")
        );
        assert_eq!(
            metrics_path(Path::new("artifact")),
            PathBuf::from("artifact_metrics.json")
        );
    }
}
