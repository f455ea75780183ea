//! Log output
//!
//! `RUST_LOG` takes precedence over the configured default level. Output is
//! human-readable in development and one JSON object per line in production.

use crate::config::Environment;
use tracing::Level;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

/// How each log line is rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Multi-field text for terminals
    Pretty,
    /// Newline-delimited JSON for log collectors
    Json,
}

/// Subscriber settings
#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// Level used when `RUST_LOG` is unset
    pub default_level: Level,
    pub format: LogFormat,
    /// Log span open/close (connection tasks are spans in development)
    pub span_events: bool,
    /// Source file and line on each event
    pub source_location: bool,
}

impl TracingConfig {
    /// Verbose text output
    #[must_use]
    pub fn development() -> Self {
        Self {
            default_level: Level::DEBUG,
            format: LogFormat::Pretty,
            span_events: true,
            source_location: true,
        }
    }

    /// JSON at info level, no source locations
    #[must_use]
    pub fn production() -> Self {
        Self {
            default_level: Level::INFO,
            format: LogFormat::Json,
            span_events: false,
            source_location: false,
        }
    }

    /// Settings for `env`; staging logs text at info level
    #[must_use]
    pub fn for_environment(env: Environment) -> Self {
        match env {
            Environment::Development => Self::development(),
            Environment::Staging => Self {
                default_level: Level::INFO,
                span_events: false,
                ..Self::development()
            },
            Environment::Production => Self::production(),
        }
    }

    fn filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(self.default_level.as_str()))
    }
}

/// Install the global subscriber
///
/// Fails if a subscriber is already installed in this process.
pub fn init_tracing(config: &TracingConfig) -> Result<(), TracingError> {
    let span_events = if config.span_events {
        FmtSpan::NEW | FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    let layer = fmt::layer()
        .with_file(config.source_location)
        .with_line_number(config.source_location)
        .with_span_events(span_events);

    let registry = tracing_subscriber::registry().with(config.filter());
    let result = match config.format {
        LogFormat::Pretty => registry.with(layer).try_init(),
        LogFormat::Json => registry.with(layer.json()).try_init(),
    };

    result.map_err(|_| TracingError::AlreadyInitialized)
}

/// Tracing initialization errors
#[derive(Debug, thiserror::Error)]
pub enum TracingError {
    #[error("a global tracing subscriber is already installed")]
    AlreadyInitialized,
}
