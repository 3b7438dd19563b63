//! Structured logging.
//!
//! # Responsibilities
//! - Install the global `tracing` subscriber once at startup
//! - Route log lines to stderr or an append-only log file
//! - Pick timestamp precision and filter level from the configured log level
//!
//! # Design Decisions
//! - `RUST_LOG` takes precedence over the configured level
//! - Every line carries file and line number
//! - `debug` switches timestamps to microsecond precision

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;

use tracing_subscriber::fmt::time::ChronoLocal;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LoggingConfig;

const TIMESTAMP_FORMAT: &str = "%Y/%m/%d %H:%M:%S";
const TIMESTAMP_FORMAT_DEBUG: &str = "%Y/%m/%d %H:%M:%S%.6f";

/// Errors raised while installing the subscriber.
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("Failed to open log file {path:?}: {source}")]
    OpenLogFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to install log subscriber: {0}")]
    Install(#[from] tracing_subscriber::util::TryInitError),
}

/// Verbosity parsed from the free-form `log-level` option.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Parse a level name, case-insensitively. Unknown names yield `None`.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "debug" => Some(Self::Debug),
            "info" => Some(Self::Info),
            "warn" | "warning" => Some(Self::Warn),
            "error" => Some(Self::Error),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }

    pub fn timestamp_format(&self) -> &'static str {
        match self {
            Self::Debug => TIMESTAMP_FORMAT_DEBUG,
            _ => TIMESTAMP_FORMAT,
        }
    }

    /// Filter directive used when `RUST_LOG` is not set.
    ///
    /// `warn` and `error` still filter at `info`, so connection and request
    /// lines stay visible.
    pub fn default_directive(&self) -> String {
        let floor = match self {
            Self::Debug => Self::Debug,
            _ => Self::Info,
        };
        format!("netsink={0},tower_http={0}", floor.as_str())
    }
}

/// Install the global subscriber according to `config`.
pub fn init(config: &LoggingConfig) -> Result<(), LoggingError> {
    let parsed = LogLevel::parse(&config.level);
    let level = parsed.unwrap_or(LogLevel::Info);

    let (writer, ansi) = match &config.file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|source| LoggingError::OpenLogFile {
                    path: path.clone(),
                    source,
                })?;
            (BoxMakeWriter::new(Mutex::new(file)), false)
        }
        None => (BoxMakeWriter::new(std::io::stderr), true),
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.default_directive()));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(ansi)
                .with_timer(ChronoLocal::new(level.timestamp_format().to_string()))
                .with_file(true)
                .with_line_number(true)
                .with_target(false),
        )
        .try_init()?;

    if parsed.is_none() {
        tracing::warn!(log_level = %config.level, "Unknown log level, using info");
    }

    Ok(())
}
