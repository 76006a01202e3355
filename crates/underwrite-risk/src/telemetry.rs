use crate::config::TelemetryConfig;
use std::fmt;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
pub enum TelemetryError {
    EnvFilter { value: String, source: ParseError },
    Subscriber(Box<dyn std::error::Error + Send + Sync>),
}

impl fmt::Display for TelemetryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TelemetryError::EnvFilter { value, .. } => {
                write!(
                    f,
                    "invalid log level/filter '{}': unable to build EnvFilter",
                    value
                )
            }
            TelemetryError::Subscriber(err) => write!(f, "telemetry error: {err}"),
        }
    }
}

impl std::error::Error for TelemetryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TelemetryError::EnvFilter { source, .. } => Some(source),
            TelemetryError::Subscriber(err) => Some(&**err),
        }
    }
}

/// Crates below the HTTP layer whose debug output drowns scoring logs.
const QUIET_DEPENDENCIES: &[&str] = &["hyper=warn", "tower=warn", "axum=info"];

/// Install the global subscriber. Logs go to stderr so the CLI commands can
/// keep stdout reserved for JSON output.
pub fn init(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => configured_filter(&config.log_level)?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .with_ansi(false)
        .try_init()
        .map_err(TelemetryError::Subscriber)
}

/// A bare level (`debug`) is widened with [`QUIET_DEPENDENCIES`]; anything
/// with explicit directives is taken verbatim.
fn configured_filter(log_level: &str) -> Result<EnvFilter, TelemetryError> {
    let log_level = log_level.trim();
    let directives = if log_level.contains('=') || log_level.contains(',') {
        log_level.to_string()
    } else {
        std::iter::once(log_level)
            .chain(QUIET_DEPENDENCIES.iter().copied())
            .collect::<Vec<_>>()
            .join(",")
    };

    EnvFilter::try_new(&directives).map_err(|source| TelemetryError::EnvFilter {
        value: log_level.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_level_quiets_http_stack() {
        let rendered = configured_filter("debug").expect("valid level").to_string();
        assert!(rendered.contains("hyper=warn"), "{rendered}");
        assert!(rendered.contains("debug"), "{rendered}");
    }

    #[test]
    fn explicit_directives_are_kept_verbatim() {
        let rendered = configured_filter("underwrite_risk=trace")
            .expect("valid directive")
            .to_string();
        assert!(!rendered.contains("hyper"), "{rendered}");
        assert!(rendered.contains("underwrite_risk=trace"), "{rendered}");
    }

    #[test]
    fn rejects_unparseable_log_filter() {
        match configured_filter("underwrite=verbose") {
            Err(TelemetryError::EnvFilter { value, .. }) => assert_eq!(value, "underwrite=verbose"),
            other => panic!("expected env filter error, got {other:?}"),
        }
    }
}
