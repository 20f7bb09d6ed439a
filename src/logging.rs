// Logging setup: one timestamped log file per run plus console output.
//
// The returned [`WorkerGuard`] must be held until the run ends so buffered
// lines reach the file.

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// `pileus_cli_YYYY-MM-DD_HH-MM-SS.log` for the given start time.
pub fn log_file_name(started: DateTime<Local>) -> String {
    format!("pileus_cli_{}.log", started.format("%Y-%m-%d_%H-%M-%S"))
}

/// Load `dir/.env` into the process environment. Call this before [`init`]
/// so a `RUST_LOG` set there reaches the filter.
pub fn load_dotenv(dir: &Path) -> dotenvy::Result<PathBuf> {
    let path = dir.join(".env");
    dotenvy::from_path(&path)?;
    Ok(path)
}

/// `RUST_LOG` when set and valid, `info` otherwise.
pub fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global subscriber. `RUST_LOG` overrides the default `info`.
pub fn init(dir: &Path) -> Result<(WorkerGuard, PathBuf)> {
    let file_name = log_file_name(Local::now());
    let appender = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(&file_name)
        .build(dir)
        .context("Failed to create log file")?;
    let (file_writer, guard) = tracing_appender::non_blocking(appender);

    let filter = env_filter();

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(file_writer).with_ansi(false))
        .with(fmt::layer().with_writer(std::io::stderr))
        .try_init()
        .context("Failed to install log subscriber")?;

    Ok((guard, dir.join(file_name)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_log_file_name_format() {
        let started = Local.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap();
        assert_eq!(log_file_name(started), "pileus_cli_2024-03-09_07-05-01.log");
    }

    #[test]
    fn test_rust_log_from_dotenv_reaches_filter() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(".env"), "RUST_LOG=pileus_cli=trace\n").unwrap();

        temp_env::with_var_unset("RUST_LOG", || {
            assert_eq!(env_filter().to_string().to_lowercase(), "info");
            let path = load_dotenv(dir.path()).unwrap();
            assert_eq!(path, dir.path().join(".env"));
            assert_eq!(env_filter().to_string().to_lowercase(), "pileus_cli=trace");
        });
    }

    #[test]
    fn test_missing_dotenv_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_dotenv(dir.path()).unwrap_err();
        assert!(err.not_found());
    }
}
