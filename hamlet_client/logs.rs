use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Logs to stdout and to a daily rotating file under `logs/`.
///
/// `RUST_LOG` overrides the default filter, which is `info` for everything
/// and `debug` for the `hamlet` binary.
pub fn setup_logging() {
    let file_appender = tracing_appender::rolling::daily("logs", "hamlet.log");
    let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true);

    let file_layer = fmt::layer()
        .with_writer(non_blocking_file)
        .with_ansi(false)
        .with_thread_ids(true)
        .with_target(true);

    let default_filter = "info,hamlet=debug";
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(console_layer)
        .init();

    // The writer stops flushing once the guard drops; the process owns it until exit.
    std::mem::forget(guard);
}
