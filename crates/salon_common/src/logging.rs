//! Logging setup for the salon backend.
//!
//! One `tracing` subscriber for the whole process: a formatted stdout layer, an optional daily
//! rolling file layer and an `EnvFilter` seeded with `salon=<level>`. `RUST_LOG` still wins
//! for anything it names.

use salon_config::LoggingConfig;
use tracing::{error, info, Level};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{filter::Directive, fmt, prelude::*, EnvFilter};

/// Initializes logging at INFO without file output.
pub fn init() -> Option<WorkerGuard> {
    init_with_level(Level::INFO, None)
}

/// Initializes logging from the `[logging]` config section.
///
/// An unparsable level falls back to INFO.
pub fn init_from_config(config: &LoggingConfig) -> Option<WorkerGuard> {
    let level = config.level.parse::<Level>().unwrap_or(Level::INFO);
    init_with_level(level, config.directory.as_deref())
}

/// Initializes the subscriber. Keep the returned guard alive for the lifetime of the process,
/// otherwise buffered file output is lost.
pub fn init_with_level(level: Level, directory: Option<&str>) -> Option<WorkerGuard> {
    let mut filter = EnvFilter::from_default_env();
    if let Ok(directive) = format!("salon={}", level).parse::<Directive>() {
        filter = filter.add_directive(directive);
    }

    let stdout_layer = fmt::layer()
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_thread_ids(true)
        .with_thread_names(true);

    let (file_layer, guard) = match directory {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "salon.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_ansi(false).with_target(true).with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    // try_init: tests may have installed a subscriber already
    let result = tracing_subscriber::registry()
        .with(stdout_layer)
        .with(file_layer)
        .with(filter)
        .try_init();

    if result.is_ok() {
        info!(level = %level, file_output = directory.is_some(), "Logging initialized");
    }
    guard
}

/// Logs the outcome of `result` and hands it back unchanged.
pub fn log_result<T, E: std::fmt::Display>(
    result: Result<T, E>,
    success_message: &str,
    error_context: &str,
) -> Result<T, E> {
    match &result {
        Ok(_) => info!("{}", success_message),
        Err(e) => error!("{}: {}", error_context, e),
    }
    result
}
