//! Log output setup.
//!
//! The library only emits `tracing` events: `info` when a mode is resolved
//! or switched, `debug` for probe outcomes, `warn` for ignored environment
//! values. Applications that have no subscriber of their own can install a
//! formatted one with [`init_logging`].

use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Log level configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Trace-level logging (most verbose)
    Trace,
    /// Debug-level logging
    Debug,
    /// Info-level logging
    Info,
    /// Warn-level logging
    Warn,
    /// Error-level logging (least verbose)
    Error,
}

impl LogLevel {
    fn to_tracing_level(self) -> Level {
        match self {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Minimum log level when `RUST_LOG` is not set
    pub level: LogLevel,
    /// Whether to include thread IDs
    pub with_thread_ids: bool,
    /// Whether to include event targets
    pub with_target: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            with_thread_ids: false,
            with_target: false,
        }
    }
}

impl LoggingConfig {
    /// Create a new logging configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the minimum log level.
    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    /// Enable or disable thread IDs.
    pub fn with_thread_ids(mut self, enable: bool) -> Self {
        self.with_thread_ids = enable;
        self
    }

    /// Enable or disable event targets.
    pub fn with_target(mut self, enable: bool) -> Self {
        self.with_target = enable;
        self
    }

    /// Verbose configuration showing probe details.
    pub fn development() -> Self {
        Self {
            level: LogLevel::Debug,
            with_thread_ids: true,
            with_target: true,
        }
    }
}

/// Installs a formatted global subscriber.
///
/// `RUST_LOG` takes precedence over `config.level`. Returns `false` without
/// touching anything if a global subscriber is already installed.
pub fn init_logging(config: LoggingConfig) -> bool {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.level.to_tracing_level().as_str()))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = fmt::layer()
        .with_thread_ids(config.with_thread_ids)
        .with_target(config.with_target);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .is_ok()
}

/// Installs a subscriber with the default configuration.
pub fn init_default_logging() -> bool {
    init_logging(LoggingConfig::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builders() {
        let config = LoggingConfig::new()
            .with_level(LogLevel::Warn)
            .with_thread_ids(true)
            .with_target(true);
        assert_eq!(config.level, LogLevel::Warn);
        assert!(config.with_thread_ids);
        assert!(config.with_target);

        assert_eq!(LoggingConfig::development().level, LogLevel::Debug);
    }

    #[test]
    fn test_level_conversion() {
        assert_eq!(LogLevel::Trace.to_tracing_level(), Level::TRACE);
        assert_eq!(LogLevel::Error.to_tracing_level(), Level::ERROR);
    }

    #[test]
    fn test_second_init_is_harmless() {
        let _ = init_default_logging();
        assert!(!init_logging(LoggingConfig::development()));
    }
}
