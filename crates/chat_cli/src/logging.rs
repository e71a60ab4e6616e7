use tracing_subscriber::{fmt, EnvFilter};

/// Filter used when `RUST_LOG` is unset or blank.
pub const DEFAULT_FILTER: &str = "warn";

/// Installs the global `tracing` subscriber, writing to stderr so diagnostics
/// never interleave with the transcript on stdout. Later calls are no-ops.
pub fn init() {
    let raw = std::env::var("RUST_LOG").ok();
    let filter = EnvFilter::try_new(filter_directives(raw.as_deref()))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .try_init();
}

pub fn filter_directives(raw: Option<&str>) -> &str {
    raw.map(str::trim)
        .filter(|value| !value.is_empty())
        .unwrap_or(DEFAULT_FILTER)
}
