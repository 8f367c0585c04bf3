use clap::ValueEnum;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Json,
    Compact,
}

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Default directive; `RUST_LOG` still refines it per target.
    pub level: LevelFilter,
    pub format: LogFormat,
}

impl LoggingConfig {
    pub fn new(level: Option<LogLevel>, format: LogFormat) -> Self {
        let level = match level {
            Some(LogLevel::Trace) => LevelFilter::TRACE,
            Some(LogLevel::Debug) => LevelFilter::DEBUG,
            Some(LogLevel::Warn) => LevelFilter::WARN,
            Some(LogLevel::Error) => LevelFilter::ERROR,
            Some(LogLevel::Info) | None => LevelFilter::INFO,
        };
        Self { level, format }
    }
}

/// Install the global subscriber. Everything goes to stderr; stdout
/// carries only the token.
pub fn init_logging(cfg: &LoggingConfig) -> Result<(), TryInitError> {
    let filter = EnvFilter::builder()
        .with_default_directive(cfg.level.into())
        .from_env_lossy();
    let registry = tracing_subscriber::registry().with(filter);
    let layer = fmt::layer()
        .with_timer(UtcTime::rfc_3339())
        .with_writer(std::io::stderr);

    match cfg.format {
        LogFormat::Json => registry
            .with(layer.json().flatten_event(true).with_ansi(false))
            .try_init(),
        LogFormat::Compact => registry.with(layer.compact()).try_init(),
    }
}
