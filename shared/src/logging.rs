//! Structured logging setup shared by the API binary and any tooling that embeds the core.

use tracing_subscriber::EnvFilter;

/// Initialize the global `tracing` subscriber.
///
/// Honors `RUST_LOG` (defaulting to `info`) and emits JSON when `json` is set, which is how
/// the service runs in production so log lines can be ingested by a collector; plain
/// formatting is left for local/dev runs via `debug`.
pub fn init_logging(debug: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = tracing_subscriber::fmt().with_env_filter(filter);

    if debug {
        let _ = subscriber.with_target(true).try_init();
    } else {
        let _ = subscriber.json().try_init();
    }
}
