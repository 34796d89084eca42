//! Tracing setup for unievent.
//!
//! The library crates only emit events; nothing installs a subscriber
//! implicitly. Host applications call [`init_tracing`] once at startup and
//! can mirror everything into a log file alongside stdout.
//!
//! # Usage
//!
//! ```ignore
//! use unievent_core::tracing::{init_tracing, TracingConfig};
//!
//! init_tracing(TracingConfig::default().with_log_file("unievent.log"))
//!     .expect("failed to initialize tracing");
//! ```

use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;
use tracing::Level;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan, writer::BoxMakeWriter},
    prelude::*,
    registry::LookupSpan,
};

/// Errors that can occur during tracing initialization
#[derive(Debug, Error)]
pub enum TracingError {
    /// Failed to set global subscriber
    #[error("failed to set global tracing subscriber: {0}")]
    SetGlobalSubscriber(#[from] tracing::subscriber::SetGlobalDefaultError),

    /// Failed to parse env filter directive
    #[error("failed to parse env filter: {0}")]
    EnvFilter(#[from] tracing_subscriber::filter::ParseError),

    /// Failed to open the log file
    #[error("failed to open log file {}: {}", .path.display(), .source)]
    LogFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Output format for tracing logs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TracingOutputFormat {
    /// Human-readable pretty format (default)
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
    /// JSON format for structured log collection
    Json,
}

/// Configuration for tracing initialization
#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// The default log level when RUST_LOG is not set
    pub default_level: Level,
    /// Output format for log messages
    pub output_format: TracingOutputFormat,
    /// Mirror all events into this file, opened in append mode
    pub log_file: Option<PathBuf>,
    /// Whether to include file/line information in logs
    pub include_location: bool,
    /// Whether to include target (module path) in logs
    pub include_target: bool,
    /// Whether to include timestamps
    pub include_timestamp: bool,
    /// Whether to include span events (enter/exit)
    pub include_span_events: bool,
    /// Custom env filter directive (overrides default_level if set)
    pub env_filter: Option<String>,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            default_level: Level::INFO,
            output_format: TracingOutputFormat::Pretty,
            log_file: None,
            include_location: false,
            include_target: true,
            include_timestamp: true,
            include_span_events: false,
            env_filter: None,
        }
    }
}

impl TracingConfig {
    /// Create a config suitable for debugging dispatch decisions
    #[must_use]
    pub fn debug() -> Self {
        Self {
            default_level: Level::DEBUG,
            output_format: TracingOutputFormat::Compact,
            include_location: true,
            include_timestamp: false,
            ..Self::default()
        }
    }

    /// Create a config suitable for structured log collection
    #[must_use]
    pub fn structured() -> Self {
        Self {
            output_format: TracingOutputFormat::Json,
            include_location: true,
            include_span_events: true,
            ..Self::default()
        }
    }

    /// Set the default log level
    #[must_use]
    pub fn with_level(mut self, level: Level) -> Self {
        self.default_level = level;
        self
    }

    /// Set the output format
    #[must_use]
    pub fn with_format(mut self, format: TracingOutputFormat) -> Self {
        self.output_format = format;
        self
    }

    /// Mirror all events into the given file in addition to stdout
    #[must_use]
    pub fn with_log_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_file = Some(path.into());
        self
    }

    /// Set a custom env filter directive
    #[must_use]
    pub fn with_env_filter(mut self, filter: impl Into<String>) -> Self {
        self.env_filter = Some(filter.into());
        self
    }
}

fn fmt_layer<S>(
    config: &TracingConfig,
    writer: BoxMakeWriter,
    ansi: bool,
) -> Box<dyn Layer<S> + Send + Sync>
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a> + 'static,
{
    let span_events = if config.include_span_events {
        FmtSpan::NEW | FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    let layer = fmt::layer()
        .with_writer(writer)
        .with_ansi(ansi)
        .with_file(config.include_location)
        .with_line_number(config.include_location)
        .with_target(config.include_target)
        .with_span_events(span_events);

    match config.output_format {
        TracingOutputFormat::Pretty => layer.pretty().boxed(),
        TracingOutputFormat::Compact if config.include_timestamp => layer.compact().boxed(),
        TracingOutputFormat::Compact => layer.compact().without_time().boxed(),
        TracingOutputFormat::Json => layer.json().boxed(),
    }
}

/// Initialize tracing with the given configuration.
///
/// This should be called once at the start of the host application.
/// The `RUST_LOG` environment variable can be used to override the default
/// level. When [`TracingConfig::log_file`] is set, every event also goes to
/// that file with ANSI colors disabled.
///
/// # Errors
///
/// Returns an error if the global subscriber has already been set, if the
/// env filter directive is invalid, or if the log file cannot be opened.
pub fn init_tracing(config: TracingConfig) -> Result<(), TracingError> {
    let env_filter = match config.env_filter {
        Some(ref directive) => EnvFilter::try_new(directive)?,
        None => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(format!("unievent={}", config.default_level))),
    };

    let stdout_layer = fmt_layer(&config, BoxMakeWriter::new(io::stdout), true);

    let file_layer = match config.log_file {
        Some(ref path) => {
            let file = File::options()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|source| TracingError::LogFile {
                    path: path.clone(),
                    source,
                })?;
            Some(fmt_layer(&config, BoxMakeWriter::new(Arc::new(file)), false))
        }
        None => None,
    };

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer);
    tracing::subscriber::set_global_default(subscriber)?;

    Ok(())
}
