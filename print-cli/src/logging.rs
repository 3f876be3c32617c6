//! Tracing setup for the estimator.
//!
//! Quotes are printed on stdout, so log records go to stderr, and to a log
//! file as well when one is configured. Everything is settled once at
//! start-up from the command line and the config file.

use std::fs::File;
use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result, anyhow};
use chrono::Local;
use tracing::{Subscriber, error};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Level used when neither the command line, `RUST_LOG` nor the config
/// names one.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Local wall-clock time with its UTC offset.
struct LocalTime;

impl FormatTime for LocalTime {
    fn format_time(
        &self,
        w: &mut Writer<'_>,
    ) -> std::fmt::Result {
        write!(w, "{}", Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z"))
    }
}

#[derive(Debug, Clone, Default)]
pub struct LogSettings {
    /// `--log-level`. Wins over `RUST_LOG`.
    pub override_level: Option<String>,
    /// `[logging] level`. `RUST_LOG` wins over it.
    pub configured_level: Option<String>,
    /// Append records to this file too.
    pub file: Option<PathBuf>,
    /// Nothing on stderr.
    pub quiet: bool,
}

impl LogSettings {
    fn filter(&self) -> Result<EnvFilter> {
        if let Some(level) = &self.override_level {
            return parse_filter(level);
        }
        if let Ok(filter) = EnvFilter::try_from_default_env() {
            return Ok(filter);
        }
        parse_filter(self.configured_level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL))
    }
}

fn parse_filter(directive: &str) -> Result<EnvFilter> {
    EnvFilter::try_new(directive).map_err(|e| anyhow!("invalid log level '{directive}': {e}"))
}

fn build_subscriber(settings: &LogSettings) -> Result<impl Subscriber + Send + Sync + 'static> {
    let filter = settings.filter()?;

    let file = settings
        .file
        .as_ref()
        .map(|path| {
            File::options()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("cannot open log file '{}'", path.display()))
        })
        .transpose()?;

    let console_layer = (!settings.quiet).then(|| {
        tracing_subscriber::fmt::layer()
            .with_timer(LocalTime)
            .with_target(false)
            .with_file(true)
            .with_line_number(true)
            .with_writer(io::stderr)
            .with_ansi(io::stderr().is_terminal())
    });

    let file_layer = file.map(|file| {
        tracing_subscriber::fmt::layer()
            .with_timer(LocalTime)
            .with_target(false)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
    });

    Ok(tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer))
}

/// Installs the global subscriber. Fails on a bad level directive, an
/// unopenable log file, or a second call.
pub fn init_logging(settings: &LogSettings) -> Result<()> {
    build_subscriber(settings)?
        .try_init()
        .context("Failed to install the log subscriber")
}

/// Logs the error of a background task that has nobody to report to.
pub fn log_task_error(
    task_name: &'static str,
    result: Result<()>,
) {
    if let Err(error) = result {
        error!(task = task_name, ?error, "background task failed");
    }
}

#[cfg(test)]
mod tests {
    use tracing::level_filters::LevelFilter;

    use super::*;

    fn file_only(path: PathBuf) -> LogSettings {
        LogSettings {
            override_level: Some("info".to_string()),
            file: Some(path),
            quiet: true,
            ..LogSettings::default()
        }
    }

    #[test]
    fn bad_directive_is_rejected() {
        assert!(parse_filter("info,[").is_err());
        assert!(parse_filter("debug").is_ok());
    }

    #[test]
    fn command_line_level_wins() {
        let settings = LogSettings {
            override_level: Some("warn".to_string()),
            configured_level: Some("trace".to_string()),
            ..LogSettings::default()
        };

        let filter = settings.filter().unwrap();

        assert_eq!(filter.max_level_hint(), Some(LevelFilter::WARN));
    }

    #[test]
    fn file_receives_records_at_or_above_level() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("estimator.log");
        let subscriber = build_subscriber(&file_only(path.clone())).unwrap();

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!(quote = "QT-2025-001", "file logging test");
            tracing::debug!("below the level");
        });

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("file logging test"));
        assert!(contents.contains("QT-2025-001"));
        assert!(!contents.contains("below the level"));
    }

    #[test]
    fn missing_directory_is_an_error() {
        let settings = file_only(PathBuf::from("/definitely/not/here/estimator.log"));

        assert!(build_subscriber(&settings).is_err());
    }

    #[test]
    fn log_task_error_ignores_success() {
        log_task_error("noop", Ok(()));
        log_task_error("failing", Err(anyhow!("boom")));
    }
}
