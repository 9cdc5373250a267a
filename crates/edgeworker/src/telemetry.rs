use tracing_subscriber::EnvFilter;

use crate::config::{LogFormat, WorkerConfig};

/// Install the global tracing subscriber described by `config.logging`
/// and announce the worker by name.
///
/// `RUST_LOG` wins over the configured filter. Returns `false` when a
/// global subscriber was already installed, which leaves it untouched.
pub fn init(config: &WorkerConfig) -> bool {
    let logging = &config.logging;
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.filter));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    let installed = match logging.format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    if installed.is_err() {
        return false;
    }

    tracing::info!(
        worker = %config.worker.name,
        format = ?logging.format,
        "telemetry initialized"
    );
    true
}
