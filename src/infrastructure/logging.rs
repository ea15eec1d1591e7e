use std::fs;
use std::io;
use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::domain::DomainError;

/// Environment variable enabling the JSON log file.
pub const LOG_DIR_ENV: &str = "JH_LOG_DIR";

/// Map the number of `-v` flags to a level.
pub fn level_from_verbosity(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Filter directives for the library and binary targets at `level`.
fn default_directives(level: &str) -> String {
    format!("jh_lib={level},jh={level}")
}

/// Initialize logging: console output on stderr and, when `logs_dir` is
/// given, a daily-rotated JSON file.
///
/// Returns a guard that must be kept alive for the duration of the command.
/// When the guard is dropped, any remaining logs are flushed.
pub fn init_logging(level: &str, logs_dir: Option<&Path>) -> Result<Option<WorkerGuard>, DomainError> {
    // RUST_LOG wins over the verbosity flags
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(level)));

    // stdout carries command output only
    let console_layer = tracing_subscriber::fmt::layer()
        .with_writer(io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_span_events(FmtSpan::NONE)
        .with_filter(env_filter);

    match logs_dir {
        Some(logs_dir) => {
            fs::create_dir_all(logs_dir)?;

            let file_appender = RollingFileAppender::new(Rotation::DAILY, logs_dir, "jh.log");
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

            let file_layer = tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .json()
                .with_span_events(FmtSpan::CLOSE)
                .with_filter(EnvFilter::new(default_directives(level)));

            // try_init: a second call is a no-op
            if tracing_subscriber::registry()
                .with(console_layer)
                .with(file_layer)
                .try_init()
                .is_ok()
            {
                tracing::info!(
                    logs_dir = ?logs_dir,
                    level = level,
                    "Logging initialized with file output"
                );
            }

            Ok(Some(guard))
        }
        None => {
            let _ = tracing_subscriber::registry().with(console_layer).try_init();

            tracing::debug!(level = level, "Logging initialized (console only)");

            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_levels() {
        assert_eq!(level_from_verbosity(0), "warn");
        assert_eq!(level_from_verbosity(1), "info");
        assert_eq!(level_from_verbosity(2), "debug");
        assert_eq!(level_from_verbosity(7), "trace");
    }

    #[test]
    fn test_default_directives_name_both_targets() {
        assert_eq!(default_directives("debug"), "jh_lib=debug,jh=debug");
        assert!(default_directives("info")
            .split(',')
            .any(|directive| directive == format!("{}=info", module_path!().split("::").next().unwrap())));
    }

    #[test]
    fn test_file_logging_creates_directory() {
        let dir = tempfile::TempDir::new().unwrap();
        let logs_dir = dir.path().join("logs");

        let guard = init_logging("debug", Some(logs_dir.as_path())).unwrap();

        assert!(guard.is_some());
        assert!(logs_dir.is_dir());
    }
}
