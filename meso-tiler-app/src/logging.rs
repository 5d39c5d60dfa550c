//! Logging setup for the application.

use crate::config::{AppConfig, LogLevel};
use env_logger::{Builder, Env};
use log::LevelFilter;

/// Maps the command line level to a `log` filter.
pub fn level_filter(level: LogLevel) -> LevelFilter {
    match level {
        LogLevel::Trace => LevelFilter::Trace,
        LogLevel::Debug => LevelFilter::Debug,
        LogLevel::Info => LevelFilter::Info,
        LogLevel::Warn => LevelFilter::Warn,
        LogLevel::Error => LevelFilter::Error,
    }
}

/// Initializes the logger from the application settings.
///
/// The global level comes from `config.log_level`. If `RUST_LOG` is set, its
/// directives are applied on top, so single modules can still be turned up.
///
/// # Arguments
///
/// * `config` - The application configuration holding the log level
pub fn init_logger(config: &AppConfig) {
    let mut builder = Builder::new();
    builder.filter_level(level_filter(config.log_level));

    if std::env::var_os("RUST_LOG").is_some() {
        builder.parse_env(Env::default().filter_or("RUST_LOG", "info"));
    }

    if let Err(e) = builder.try_init() {
        eprintln!("Logger already initialized: {e}");
    }

    log::debug!("Logger initialized with global log level: {:?}", config.log_level);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_filter() {
        assert_eq!(level_filter(LogLevel::Warn), LevelFilter::Warn);
        assert_eq!(level_filter(LogLevel::default()), LevelFilter::Info);
    }
}
