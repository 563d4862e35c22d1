use tracing_subscriber::EnvFilter;

/// Initialise logging to stderr.
///
/// The default level is `info`, or `debug` with `--verbose`. `RUST_LOG`
/// overrides either when set.
pub fn init(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
