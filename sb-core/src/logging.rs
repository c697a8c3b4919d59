//! Tracing subscriber setup for the CLI.
//!
//! Human-readable lines go to stderr, keeping stdout free for tables and
//! JSON. A second copy lands in a daily rolling file under the configured
//! log directory, as plain text or one JSON object per line.

use std::path::Path;

use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::constants::LOG_FILE_PREFIX;
use crate::error::{SbError, SbResult};

/// Keeps the background file writer running. Buffered lines are flushed
/// when this is dropped, so hold it for the life of the process.
pub struct LogGuard {
    _worker: WorkerGuard,
}

/// Install console and file logging.
///
/// `level` takes any `EnvFilter` directive such as `"debug"` or
/// `"sb_socket=trace,info"`; an unparsable directive falls back to `info`.
/// Fails if the log directory cannot be created or a global subscriber
/// is already installed.
pub fn init_logging(level: &str, log_dir: &Path, json_output: bool) -> SbResult<LogGuard> {
    std::fs::create_dir_all(log_dir)?;

    let (writer, worker) =
        tracing_appender::non_blocking(tracing_appender::rolling::daily(log_dir, LOG_FILE_PREFIX));

    // Exactly one of these is Some.
    let (json_file, text_file) = if json_output {
        (Some(json_file_layer(writer)), None)
    } else {
        (None, Some(text_file_layer(writer)))
    };

    tracing_subscriber::registry()
        .with(filter(level))
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .with(json_file)
        .with(text_file)
        .try_init()
        .map_err(|e| SbError::Internal(format!("logging already initialized: {e}")))?;

    tracing::debug!(
        "writing {} logs to {}",
        if json_output { "json" } else { "text" },
        log_dir.display()
    );
    Ok(LogGuard { _worker: worker })
}

/// Console-only logging, used when the file sink is unavailable.
/// Later calls are ignored once a subscriber is installed.
pub fn init_console_logging(level: &str) {
    let _ = tracing_subscriber::registry()
        .with(filter(level))
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .try_init();
}

fn filter(level: &str) -> EnvFilter {
    EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"))
}

fn json_file_layer<S>(
    writer: NonBlocking,
) -> fmt::Layer<S, fmt::format::JsonFields, fmt::format::Format<fmt::format::Json>, NonBlocking>
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    fmt::layer()
        .json()
        .with_writer(writer)
        .with_file(true)
        .with_line_number(true)
}

fn text_file_layer<S>(
    writer: NonBlocking,
) -> fmt::Layer<S, fmt::format::DefaultFields, fmt::format::Format, NonBlocking>
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_file(true)
        .with_line_number(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_console_logging_is_idempotent() {
        init_console_logging("debug");
        init_console_logging("warn");
    }

    #[test]
    fn test_init_logging_fails_when_dir_is_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("logs");
        std::fs::write(&blocker, "").unwrap();
        assert!(init_logging("info", &blocker, false).is_err());
    }
}
