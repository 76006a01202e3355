use crate::cli::ServeArgs;
use crate::infra::AppState;
use crate::routes::with_risk_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use underwrite_risk::config::AppConfig;
use underwrite_risk::error::AppError;
use underwrite_risk::telemetry;
use underwrite_risk::underwriting::RiskEngine;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }
    if let Some(path) = args.model_path.take() {
        config.model.artifact_path = path;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    // Resolved eagerly so artifact problems show up in the startup log.
    let engine = Arc::new(RiskEngine::from_path(config.model.artifact_path.clone()));
    let active_version = engine.active_version().to_string();

    let app = with_risk_routes(engine)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        model_path = %config.model.artifact_path.display(),
        %active_version,
        "risk scoring service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
