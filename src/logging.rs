use std::env;
use std::path::Path;
use tracing::info;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

const DEFAULT_LOG_FILE: &str = "./logs/musescore2pdf.log";

/// Log to stdout and to a daily-rotated file. The returned guard flushes the
/// file writer and must live until the process ends.
pub fn init_logger() -> impl Drop {
    let filter = env::var("TRACING_LEVEL").unwrap_or_else(|_| "info".to_string());
    let filter_layer = EnvFilter::try_new(&filter).unwrap_or_else(|_| EnvFilter::new("info"));

    let log_file_path = env::var("LOG_FILE_PATH").unwrap_or_else(|_| DEFAULT_LOG_FILE.to_string());
    let log_file_path = Path::new(&log_file_path);
    let log_dir = log_file_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let log_file_name = log_file_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "musescore2pdf.log".to_string());

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stdout)
                .compact()
                .with_target(false)
                .with_ansi(true),
        )
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false),
        )
        .with(filter_layer)
        .init();

    info!(
        "Logging to stdout and {}/{}",
        log_dir.display(),
        log_file_path.file_name().unwrap_or_default().to_string_lossy()
    );

    guard
}
