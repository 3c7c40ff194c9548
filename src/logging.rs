use std::path::PathBuf;

use tracing::Level;
use tracing_appender::{
    non_blocking::WorkerGuard,
    rolling::{RollingFileAppender, Rotation},
};
use tracing_subscriber::{
    filter::{EnvFilter, LevelFilter},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    Layer,
};

// Define log targets as constants
pub const PDF_EXTRACT: &str = "pdf_extract";
pub const MODEL_LOAD: &str = "model_load";
pub const CATEGORIZE: &str = "categorize";

const LOG_FILE_NAME: &str = "pdf-categorizer.log";

fn stdout_filter(debug: bool) -> EnvFilter {
    let level = if debug { Level::DEBUG } else { Level::INFO };
    EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(level).into())
        .from_env_lossy()
}

/// Log to stdout only. Keep the returned guard alive until exit or buffered
/// lines are lost.
pub fn init_logging(debug: bool) -> WorkerGuard {
    let (writer, guard) = tracing_appender::non_blocking(std::io::stdout());

    let stdout_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_writer(writer)
        .with_filter(stdout_filter(debug));

    // A second initialization (tests, embedding) keeps the first subscriber.
    let _ = tracing_subscriber::registry().with(stdout_layer).try_init();

    guard
}

/// Log to stdout and to `pdf-categorizer.log` inside `log_dir`.
pub fn init_logging_with_dir(
    debug: bool,
    log_dir: PathBuf,
) -> std::io::Result<(WorkerGuard, WorkerGuard)> {
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = RollingFileAppender::new(Rotation::NEVER, log_dir, LOG_FILE_NAME);
    let (file_writer, file_guard) = tracing_appender::non_blocking(file_appender);
    let (stdout_writer, stdout_guard) = tracing_appender::non_blocking(std::io::stdout());

    let file_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false)
        .with_writer(file_writer)
        .with_filter(EnvFilter::new(format!(
            "{},{}={},{}={},{}=debug",
            if debug { "debug" } else { "info" },
            PDF_EXTRACT,
            if debug { "trace" } else { "debug" },
            MODEL_LOAD,
            if debug { "trace" } else { "debug" },
            CATEGORIZE,
        )));

    let stdout_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_writer(stdout_writer)
        .with_filter(stdout_filter(debug));

    let _ = tracing_subscriber::registry()
        .with(file_layer)
        .with(stdout_layer)
        .try_init();

    Ok((stdout_guard, file_guard))
}
