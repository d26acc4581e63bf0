//! Logging infrastructure for Vellum.

use std::io;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan, MakeWriter},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer, Registry,
};

/// Environment variable names read by [`LogConfig::from_env`].
pub mod vars {
    pub const VELLUM_LOG_LEVEL: &str = "VELLUM_LOG_LEVEL";
    pub const VELLUM_LOG_FORMAT: &str = "VELLUM_LOG_FORMAT";
    pub const VELLUM_LOG_FILE: &str = "VELLUM_LOG_FILE";
    pub const VELLUM_LOG_SOURCE: &str = "VELLUM_LOG_SOURCE";
    pub const VELLUM_LOG_SPANS: &str = "VELLUM_LOG_SPANS";
}

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Minimum log level.
    pub level: LogLevel,
    /// `level` replaces any `RUST_LOG` directives instead of deferring to them.
    pub explicit_level: bool,
    /// Output format.
    pub format: LogFormat,
    /// Log file path (if file logging enabled).
    pub file_path: Option<PathBuf>,
    /// Include timestamps.
    pub timestamps: bool,
    /// Include source location.
    pub source_location: bool,
    /// Include span events.
    pub span_events: bool,
}

/// Log level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for tracing_subscriber::filter::LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => tracing_subscriber::filter::LevelFilter::TRACE,
            LogLevel::Debug => tracing_subscriber::filter::LevelFilter::DEBUG,
            LogLevel::Info => tracing_subscriber::filter::LevelFilter::INFO,
            LogLevel::Warn => tracing_subscriber::filter::LevelFilter::WARN,
            LogLevel::Error => tracing_subscriber::filter::LevelFilter::ERROR,
        }
    }
}

impl LogLevel {
    /// Parse from string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "trace" => Some(Self::Trace),
            "debug" => Some(Self::Debug),
            "info" => Some(Self::Info),
            "warn" | "warning" => Some(Self::Warn),
            "error" => Some(Self::Error),
            _ => None,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable full format.
    #[default]
    Pretty,
    /// Compact single-line format.
    Compact,
    /// JSON structured format.
    Json,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::default(),
            explicit_level: false,
            format: LogFormat::default(),
            file_path: None,
            timestamps: true,
            source_location: false,
            span_events: false,
        }
    }
}

impl LogConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(level) = std::env::var(vars::VELLUM_LOG_LEVEL) {
            if let Some(l) = LogLevel::parse(&level) {
                config = config.with_level(l);
            }
        } else if let Ok(level) = std::env::var("RUST_LOG") {
            if let Some(l) = LogLevel::parse(&level) {
                config.level = l;
            }
        }

        if let Ok(format) = std::env::var(vars::VELLUM_LOG_FORMAT) {
            config.format = match format.to_lowercase().as_str() {
                "json" => LogFormat::Json,
                "compact" => LogFormat::Compact,
                _ => LogFormat::Pretty,
            };
        }

        if let Ok(file_path) = std::env::var(vars::VELLUM_LOG_FILE) {
            config.file_path = Some(PathBuf::from(file_path));
        }

        if let Ok(source_location) = std::env::var(vars::VELLUM_LOG_SOURCE) {
            config.source_location = is_truthy(&source_location);
        }

        if let Ok(span_events) = std::env::var(vars::VELLUM_LOG_SPANS) {
            config.span_events = is_truthy(&span_events);
        }

        config
    }

    /// Override the level, e.g. from a `-v` count. The level wins over
    /// `RUST_LOG`.
    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self.explicit_level = true;
        self
    }

    /// Filter directives given the `RUST_LOG` value.
    ///
    /// An explicit level wins; otherwise non-empty `RUST_LOG` directives
    /// apply, else `level`.
    pub fn filter_directives(&self, rust_log: Option<&str>) -> String {
        match rust_log.map(str::trim) {
            Some(directives) if !self.explicit_level && !directives.is_empty() => {
                directives.to_string()
            }
            _ => self.level.as_str().to_string(),
        }
    }
}

fn is_truthy(value: &str) -> bool {
    value.eq_ignore_ascii_case("true") || value == "1"
}

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Initialize logging with the given configuration.
///
/// Logs always go to stderr; stdout carries rendered responses.
pub fn init(config: LogConfig) -> Result<(), LogError> {
    let mut layers: Vec<BoxedLayer> = vec![fmt_layer(&config, io::stderr, true)];

    if let Some(file_path) = &config.file_path {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(file_path)?;
        layers.push(fmt_layer(&config, Mutex::new(file), false));
    }

    tracing_subscriber::registry()
        .with(layers)
        .try_init()
        .map_err(|e| LogError::InitError(e.to_string()))
}

fn env_filter(config: &LogConfig) -> EnvFilter {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    EnvFilter::try_new(config.filter_directives(rust_log.as_deref()))
        .unwrap_or_else(|_| EnvFilter::new(config.level.as_str()))
}

fn span_events(config: &LogConfig) -> FmtSpan {
    if config.span_events {
        FmtSpan::NEW | FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    }
}

fn fmt_layer<W>(config: &LogConfig, writer: W, ansi: bool) -> BoxedLayer
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let layer = fmt::layer()
        .with_writer(writer)
        .with_ansi(ansi)
        .with_target(true)
        .with_file(config.source_location)
        .with_line_number(config.source_location)
        .with_span_events(span_events(config));
    let filter = env_filter(config);

    match (config.format, config.timestamps) {
        (LogFormat::Pretty, true) => layer.with_filter(filter).boxed(),
        (LogFormat::Pretty, false) => layer.without_time().with_filter(filter).boxed(),
        (LogFormat::Compact, true) => layer.compact().with_filter(filter).boxed(),
        (LogFormat::Compact, false) => layer.compact().without_time().with_filter(filter).boxed(),
        (LogFormat::Json, true) => layer.json().with_filter(filter).boxed(),
        (LogFormat::Json, false) => layer.json().without_time().with_filter(filter).boxed(),
    }
}

/// Logging errors.
#[derive(Debug, thiserror::Error)]
pub enum LogError {
    #[error("failed to initialize logging: {0}")]
    InitError(String),

    #[error("failed to open log file: {0}")]
    FileError(#[from] io::Error),
}

/// Convenience macros re-exported from tracing.
pub use tracing::{debug, error, info, trace, warn};

/// Span and timing utilities.
pub mod spans;

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn test_log_level_parse() {
        assert!(matches!(LogLevel::parse("info"), Some(LogLevel::Info)));
        assert!(matches!(LogLevel::parse("DEBUG"), Some(LogLevel::Debug)));
        assert!(matches!(LogLevel::parse("Warning"), Some(LogLevel::Warn)));
        assert!(matches!(LogLevel::parse("warn"), Some(LogLevel::Warn)));
        assert!(matches!(LogLevel::parse("error"), Some(LogLevel::Error)));
        assert!(matches!(LogLevel::parse("trace"), Some(LogLevel::Trace)));
        assert!(LogLevel::parse("invalid").is_none());
    }

    #[test]
    fn test_log_level_from() {
        use tracing_subscriber::filter::LevelFilter;
        assert_eq!(LevelFilter::from(LogLevel::Trace), LevelFilter::TRACE);
        assert_eq!(LevelFilter::from(LogLevel::Debug), LevelFilter::DEBUG);
        assert_eq!(LevelFilter::from(LogLevel::Info), LevelFilter::INFO);
        assert_eq!(LevelFilter::from(LogLevel::Warn), LevelFilter::WARN);
        assert_eq!(LevelFilter::from(LogLevel::Error), LevelFilter::ERROR);
    }

    #[test]
    fn test_default_config() {
        let config = LogConfig::default();
        assert_eq!(config.level, LogLevel::Info);
        assert_eq!(config.format, LogFormat::Pretty);
        assert!(config.file_path.is_none());
        assert!(config.timestamps);
        assert!(!config.source_location);
        assert!(!config.span_events);
    }

    #[test]
    fn test_with_level() {
        let config = LogConfig::default().with_level(LogLevel::Trace);
        assert_eq!(config.level, LogLevel::Trace);
        assert!(config.explicit_level);
    }

    #[test]
    fn test_explicit_level_wins_over_rust_log() {
        let config = LogConfig::default().with_level(LogLevel::Debug);
        assert_eq!(config.filter_directives(Some("warn,vellum_writer=trace")), "debug");
        assert_eq!(config.filter_directives(None), "debug");
    }

    #[test]
    fn test_rust_log_applies_without_explicit_level() {
        let config = LogConfig {
            level: LogLevel::Warn,
            ..LogConfig::default()
        };
        assert_eq!(
            config.filter_directives(Some("warn,vellum_writer=trace")),
            "warn,vellum_writer=trace"
        );
        assert_eq!(config.filter_directives(Some("  ")), "warn");
        assert_eq!(config.filter_directives(None), "warn");
    }

    #[test]
    fn test_config_from_env() {
        let saved: Vec<_> = [
            vars::VELLUM_LOG_LEVEL,
            vars::VELLUM_LOG_FORMAT,
            vars::VELLUM_LOG_FILE,
            vars::VELLUM_LOG_SOURCE,
            vars::VELLUM_LOG_SPANS,
        ]
        .iter()
        .map(|var| (*var, env::var(var).ok()))
        .collect();

        env::set_var(vars::VELLUM_LOG_LEVEL, "debug");
        env::set_var(vars::VELLUM_LOG_FORMAT, "json");
        env::set_var(vars::VELLUM_LOG_FILE, "/tmp/vellum-test.log");
        env::set_var(vars::VELLUM_LOG_SOURCE, "true");
        env::set_var(vars::VELLUM_LOG_SPANS, "1");

        let config = LogConfig::from_env();
        assert_eq!(config.level, LogLevel::Debug);
        assert!(config.explicit_level);
        assert_eq!(config.format, LogFormat::Json);
        assert_eq!(config.file_path, Some(PathBuf::from("/tmp/vellum-test.log")));
        assert!(config.source_location);
        assert!(config.span_events);

        for (var, value) in saved {
            match value {
                Some(v) => env::set_var(var, v),
                None => env::remove_var(var),
            }
        }
    }
}
