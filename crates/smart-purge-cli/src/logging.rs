use std::env;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

const DEFAULT_LOG_FILE: &str = "./logs/smart-purge.log";

/// Directory and file name for the appender; a bare file name lands in the working directory.
fn split_log_path(path: &Path) -> (&Path, &OsStr) {
    let directory = path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let file_name = path
        .file_name()
        .unwrap_or(OsStr::new("smart-purge.log"));
    (directory, file_name)
}

/// Console and file logging. The guard flushes the file writer on drop, so hold it until exit.
///
/// `TRACING_LEVEL` takes any `EnvFilter` directive (`debug`, `smart_purge_core=trace`).
pub fn init_logger() -> WorkerGuard {
    let filter_layer =
        EnvFilter::try_from_env("TRACING_LEVEL").unwrap_or_else(|_| EnvFilter::new("info"));

    let log_file = PathBuf::from(
        env::var("LOG_FILE_PATH").unwrap_or_else(|_| DEFAULT_LOG_FILE.to_string()),
    );
    let (directory, file_name) = split_log_path(&log_file);
    let file_appender = tracing_appender::rolling::never(directory, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    // Console logs share stderr with the progress bars; stdout carries results only.
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .compact()
                .with_target(false)
                .without_time()
                .with_ansi(true),
        )
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .with(filter_layer)
        .init();

    info!("Logging to stderr and {}", log_file.display());

    guard
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_log_path() {
        let (dir, name) = split_log_path(Path::new("./logs/smart-purge.log"));
        assert_eq!(dir, Path::new("./logs"));
        assert_eq!(name, OsStr::new("smart-purge.log"));

        let (dir, name) = split_log_path(Path::new("purge.log"));
        assert_eq!(dir, Path::new("."));
        assert_eq!(name, OsStr::new("purge.log"));
    }
}
