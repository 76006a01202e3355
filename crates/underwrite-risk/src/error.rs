use crate::config::ConfigError;
use crate::telemetry::TelemetryError;
use crate::underwriting::dataset::DatasetError;
use crate::underwriting::deal::DealInputError;
use crate::underwriting::model::ModelStoreError;
use crate::underwriting::stress::StressError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Server(axum::Error),
    Input(DealInputError),
    Stress(StressError),
    Dataset(DatasetError),
    Model(ModelStoreError),
}

impl AppError {
    /// Short category reported under the `error` key at the boundary.
    pub fn label(&self) -> &'static str {
        match self {
            AppError::Input(err) => err.label(),
            AppError::Stress(StressError::Input(err)) => err.label(),
            AppError::Stress(StressError::InvalidScenario { .. }) => "Invalid stress scenario",
            AppError::Dataset(_) => "Invalid training dataset",
            AppError::Model(_) => "Invalid model artifact",
            AppError::Config(_) => "Configuration error",
            AppError::Telemetry(_) => "Telemetry error",
            AppError::Io(_) => "IO error",
            AppError::Server(_) => "Server error",
        }
    }

    pub fn is_client_error(&self) -> bool {
        matches!(self, AppError::Input(_) | AppError::Stress(_))
    }

    /// `{ "error": ..., "message": ... }` body shared by the CLI and HTTP.
    pub fn payload(&self) -> serde_json::Value {
        let message = match self {
            AppError::Input(err) => err.to_string(),
            AppError::Stress(err) => err.to_string(),
            other => other.to_string(),
        };
        json!({ "error": self.label(), "message": message })
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::Input(err) => write!(f, "input error: {}", err),
            AppError::Stress(err) => write!(f, "stress test error: {}", err),
            AppError::Dataset(err) => write!(f, "dataset error: {}", err),
            AppError::Model(err) => write!(f, "model error: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Server(err) => Some(err),
            AppError::Input(err) => Some(err),
            AppError::Stress(err) => Some(err),
            AppError::Dataset(err) => Some(err),
            AppError::Model(err) => Some(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = if self.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };

        (status, Json(self.payload())).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<axum::Error> for AppError {
    fn from(value: axum::Error) -> Self {
        Self::Server(value)
    }
}

impl From<DealInputError> for AppError {
    fn from(value: DealInputError) -> Self {
        Self::Input(value)
    }
}

impl From<StressError> for AppError {
    fn from(value: StressError) -> Self {
        Self::Stress(value)
    }
}

impl From<DatasetError> for AppError {
    fn from(value: DatasetError) -> Self {
        Self::Dataset(value)
    }
}

impl From<ModelStoreError> for AppError {
    fn from(value: ModelStoreError) -> Self {
        Self::Model(value)
    }
}
