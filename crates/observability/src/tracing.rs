//! Tracing/logging initialization.

use tracing_subscriber::EnvFilter;

/// Default filter: app events at info, sqlx statement logging quieted.
const DEFAULT_DIRECTIVES: &str = "info,sqlx=warn";

/// Initialize tracing/logging for the process.
///
/// JSON lines by default; set `LOG_FORMAT=text` for human-readable output
/// during development. `RUST_LOG` overrides the filter as usual. Safe to
/// call multiple times (subsequent calls are no-ops).
pub fn init() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVES));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .with_target(false);

    let text = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("text"));
    if text {
        let _ = builder.try_init();
    } else {
        let _ = builder.json().try_init();
    }
}
