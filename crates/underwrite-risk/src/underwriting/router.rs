use std::sync::Arc;

use axum::{
    extract::State,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};

use super::deal::{DealInputError, DealRecord};
use super::engine::RiskEngine;
use super::stress::{run_stress_request, StressRequest};
use crate::error::AppError;

/// Router builder exposing the scoring engine over HTTP.
pub fn risk_router(engine: Arc<RiskEngine>) -> Router {
    Router::new()
        .route("/api/v1/risk/score", post(score_handler))
        .route("/api/v1/risk/stress-test", post(stress_handler))
        .route("/api/v1/risk/model", get(model_handler))
        .with_state(engine)
}

// Bodies are taken as text so malformed JSON gets the same structured error
// as every other input failure.
pub(crate) async fn score_handler(State(engine): State<Arc<RiskEngine>>, body: String) -> Response {
    let assessed = DealRecord::from_json(&body).and_then(|record| engine.assess(&record));
    match assessed {
        Ok(result) => Json(result).into_response(),
        Err(error) => AppError::from(error).into_response(),
    }
}

pub(crate) async fn stress_handler(
    State(engine): State<Arc<RiskEngine>>,
    body: String,
) -> Response {
    let request: StressRequest = match serde_json::from_str(&body) {
        Ok(request) => request,
        Err(error) => return AppError::from(DealInputError::from(error)).into_response(),
    };

    match run_stress_request(&engine, &request) {
        Ok(report) => Json(report).into_response(),
        Err(error) => AppError::from(error).into_response(),
    }
}

pub(crate) async fn model_handler(State(engine): State<Arc<RiskEngine>>) -> Response {
    Json(engine.status()).into_response()
}
