use metrics_exporter_prometheus::PrometheusHandle;
use serde::Serialize;
use std::io::Read;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use underwrite_risk::error::AppError;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Inline argument first, then `--file`, then stdin.
pub(crate) fn read_deal_input(inline: Option<String>, file: Option<&Path>) -> Result<String, AppError> {
    if let Some(raw) = inline {
        return Ok(raw);
    }
    if let Some(path) = file {
        return Ok(std::fs::read_to_string(path)?);
    }

    let mut raw = String::new();
    std::io::stdin().read_to_string(&mut raw)?;
    Ok(raw)
}

pub(crate) fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<(), AppError> {
    let rendered = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
    .map_err(std::io::Error::from)?;

    println!("{rendered}");
    Ok(())
}
