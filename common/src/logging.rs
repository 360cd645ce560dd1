use tracing_subscriber::EnvFilter;

/// Installs the global subscriber. `RUST_LOG` wins over the default `info` level.
pub fn init_tracing(log_format: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    // try_init: a second call (e.g. from tests) leaves the first subscriber in place
    let _ = if log_format.eq_ignore_ascii_case("json") {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
}
