use clap::ValueEnum;
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::{fmt, EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use crate::config::settings::{ExporterConfig, LogFormat, LoggingConfig};


#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogLevel {
    TRACE,
    DEBUG,
    INFO,
    WARN,
    ERROR,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match *self {
            LogLevel::TRACE => "TRACE",
            LogLevel::DEBUG => "DEBUG",
            LogLevel::INFO => "INFO",
            LogLevel::WARN => "WARN",
            LogLevel::ERROR => "ERROR",
        }
    }
}

/// CLI level wins over the config file, which wins over "info".
pub fn resolve_logging_config(config: &ExporterConfig, arg_log_level: Option<LogLevel>) -> LoggingConfig {
    let format = config
        .settings
        .logging
        .as_ref()
        .map(|c| c.format.to_owned())
        .unwrap_or(LogFormat::Compact);

    let level = arg_log_level
        .map(|l| l.as_str().to_lowercase())
        .or_else(|| config.settings.logging.as_ref().map(|c| c.level.to_owned()))
        .unwrap_or_else(|| "info".to_owned());

    LoggingConfig::new(level, format)
}

pub fn run(config: &ExporterConfig, arg_log_level: Option<LogLevel>) {
    init_logging(&resolve_logging_config(config, arg_log_level));
}


/// Initialize tracing with the desired config.
pub fn init_logging(cfg: &LoggingConfig) {
    let env_filter = EnvFilter::try_new(&cfg.level)
        .unwrap_or_else(|_| EnvFilter::new("info"));

    // Base layer: filter + writer
    let registry = tracing_subscriber::registry().with(env_filter);

    // Choose format layer
    match cfg.format {
        LogFormat::Json => {
            let layer = fmt::layer()
                .json()
                .with_timer(UtcTime::rfc_3339())
                .flatten_event(true) // flattens fields for log shippers
                .with_ansi(false);

            let _ = registry.with(layer).try_init();
        }
        LogFormat::Compact => {
            let layer = fmt::layer()
                .compact()
                .with_timer(UtcTime::rfc_3339())
                .with_ansi(true);

            let _ = registry.with(layer).try_init();
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_level_overrides_config() {
        let mut config = ExporterConfig::default();
        config.settings.logging = Some(LoggingConfig::new("warn".to_owned(), LogFormat::Json));

        let resolved = resolve_logging_config(&config, Some(LogLevel::DEBUG));
        assert_eq!(resolved.level, "debug");
        assert_eq!(resolved.format, LogFormat::Json);

        let from_file = resolve_logging_config(&config, None);
        assert_eq!(from_file.level, "warn");
    }

    #[test]
    fn defaults_to_compact_info() {
        let resolved = resolve_logging_config(&ExporterConfig::default(), None);
        assert_eq!(resolved.level, "info");
        assert_eq!(resolved.format, LogFormat::Compact);
    }
}
