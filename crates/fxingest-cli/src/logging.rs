use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::CliError;

/// Install stdout and file logging at `level`.
///
/// The returned guard flushes the file writer on drop and must be held
/// until the command finishes.
pub fn init(level: &str, log_file: &Path) -> Result<WorkerGuard, CliError> {
    let filter = EnvFilter::try_new(level.trim().to_ascii_lowercase())
        .map_err(|error| CliError::Config(format!("invalid log level '{level}': {error}")))?;

    let directory = log_file
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file_name = log_file.file_name().ok_or_else(|| {
        CliError::Config(format!("LOG_FILE has no file name: {}", log_file.display()))
    })?;

    let file_appender = tracing_appender::rolling::never(directory, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let stdout_layer = fmt::layer().with_writer(std::io::stdout);
    let file_layer = fmt::layer().with_writer(non_blocking).with_ansi(false);

    tracing_subscriber::registry()
        .with(filter)
        .with(stdout_layer)
        .with(file_layer)
        .try_init()
        .map_err(|error| CliError::Config(format!("failed to install logger: {error}")))?;

    Ok(guard)
}
