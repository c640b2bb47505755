//! # Logging Utilities
//!
//! Logging infrastructure for extrace using `tracing`.
//!
//! Rendered stack traces go to stderr, so log output stays on stdout (or in
//! a file) and the two never interleave. Three entry points:
//!
//! - [`init_logging`]: console logging, configured from the environment
//! - [`init_logging_with_level`]: console logging with an explicit level
//! - [`init_logging_to_file`]: file-only logging, nothing on the console
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use extrace_utils::init_logging;
//!
//! // Initialize with default settings (reads from RUST_LOG env var)
//! init_logging().expect("Failed to initialize logging");
//!
//! // Use tracing macros throughout your code
//! tracing::info!("Application started");
//! tracing::debug!("Debug information");
//! ```
//!
//! ## Environment Variables
//!
//! - `RUST_LOG`: Set log level filter (e.g., `RUST_LOG=debug`, `RUST_LOG=extrace_core=debug`)
//! - `EXTRACE_LOG_FORMAT`: Set output format (`json` or `pretty`, default: `pretty`)

use std::path::PathBuf;
use std::str::FromStr;
use std::{env, io};

use chrono::Utc;
use tracing::Level;
use tracing_subscriber::fmt::time::ChronoUtc;
use tracing_subscriber::fmt::{self};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat
{
    /// Pretty-printed, human-readable format (default for development)
    Pretty,
    /// JSON format (default for production)
    Json,
}

impl FromStr for LogFormat
{
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err>
    {
        match s.to_lowercase().as_str() {
            "pretty" | "dev" | "development" => Ok(LogFormat::Pretty),
            "json" | "prod" | "production" => Ok(LogFormat::Json),
            _ => Err(format!("Unknown log format: {s}. Use 'pretty' or 'json'")),
        }
    }
}

/// Log level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel
{
    /// Error level
    Error,
    /// Warning level
    Warn,
    /// Info level (default)
    Info,
    /// Debug level
    Debug,
    /// Trace level (most verbose)
    Trace,
}

impl From<LogLevel> for Level
{
    fn from(level: LogLevel) -> Self
    {
        match level {
            LogLevel::Error => Level::ERROR,
            LogLevel::Warn => Level::WARN,
            LogLevel::Info => Level::INFO,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Trace => Level::TRACE,
        }
    }
}

impl FromStr for LogLevel
{
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err>
    {
        match s.to_lowercase().as_str() {
            "error" | "err" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" | "dbg" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            _ => Err(format!(
                "Unknown log level: {s}. Use 'error', 'warn', 'info', 'debug', or 'trace'"
            )),
        }
    }
}

/// Initialize console logging with default settings
///
/// Reads configuration from environment variables:
/// - `RUST_LOG`: Log level filter (e.g., `debug`, `extrace_core=debug`)
/// - `EXTRACE_LOG_FORMAT`: Output format (`json` or `pretty`, default: `pretty`)
///
/// ## Errors
///
/// Returns an error if logging is already initialized.
pub fn init_logging() -> Result<(), LoggingError>
{
    let format = env::var("EXTRACE_LOG_FORMAT")
        .ok()
        .and_then(|s| LogFormat::from_str(&s).ok())
        .unwrap_or(LogFormat::Pretty);

    install(console_layer(format, env_filter(None)))
}

/// Initialize console logging with an explicit level and format
///
/// The explicit level takes precedence over `RUST_LOG`.
///
/// ## Errors
///
/// Returns an error if logging is already initialized.
pub fn init_logging_with_level(level: LogLevel, format: LogFormat) -> Result<(), LoggingError>
{
    install(console_layer(format, env_filter(Some(level.into()))))
}

/// Initialize file-only logging (no stdout/stderr)
///
/// The log file is created in the user's home directory at
/// `~/.extrace/YYYY-MM-DD-extrace.log`, or falls back to
/// `/tmp/YYYY-MM-DD-extrace.log` if the home directory is not accessible.
/// Returns the path it picked.
///
/// ## Arguments
///
/// * `level` - Optional log level. If `None`, uses `RUST_LOG` or defaults to `INFO`.
///
/// ## Errors
///
/// Returns an error if logging is already initialized or the log directory
/// cannot be created.
pub fn init_logging_to_file(level: Option<LogLevel>) -> Result<PathBuf, LoggingError>
{
    let log_file = dated_log_file()?;
    install(file_layer(&log_file, env_filter(level.map(Into::into))))?;
    Ok(log_file)
}

/// Path of today's log file, with the parent directory created.
fn dated_log_file() -> Result<PathBuf, LoggingError>
{
    let today = Utc::now().format("%Y-%m-%d");
    if let Ok(home) = env::var("HOME") {
        let extrace_dir = PathBuf::from(home).join(".extrace");
        std::fs::create_dir_all(&extrace_dir).map_err(LoggingError::FileError)?;
        Ok(extrace_dir.join(format!("{today}-extrace.log")))
    } else {
        Ok(PathBuf::from("/tmp").join(format!("{today}-extrace.log")))
    }
}

/// Filter priority: explicit level, then `RUST_LOG`, then `INFO`.
fn env_filter(explicit: Option<Level>) -> EnvFilter
{
    match explicit {
        Some(level) => EnvFilter::new(level.to_string()),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(Level::INFO.to_string())),
    }
}

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

fn console_layer(format: LogFormat, filter: EnvFilter) -> BoxedLayer
{
    let layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_thread_names(true)
        .with_file(true)
        .with_line_number(true)
        .with_timer(ChronoUtc::rfc_3339())
        .with_writer(io::stdout);
    match format {
        LogFormat::Pretty => layer.with_ansi(true).with_filter(filter).boxed(),
        LogFormat::Json => layer
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_filter(filter)
            .boxed(),
    }
}

fn file_layer(log_file: &std::path::Path, filter: EnvFilter) -> BoxedLayer
{
    // rolling::never() since the date is already in the filename
    let file_appender = tracing_appender::rolling::never(
        log_file.parent().unwrap_or_else(|| std::path::Path::new(".")),
        log_file.file_name().unwrap_or_default(),
    );
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    // The guard flushes on drop; keep it alive for the whole process
    std::mem::forget(guard);

    fmt::layer()
        .with_writer(non_blocking)
        .with_target(true)
        .with_thread_ids(true)
        .with_thread_names(true)
        .with_file(true)
        .with_line_number(true)
        .with_timer(ChronoUtc::rfc_3339())
        .with_ansi(false) // No ANSI in files
        .with_filter(filter)
        .boxed()
}

fn install(layer: BoxedLayer) -> Result<(), LoggingError>
{
    Registry::default()
        .with(layer)
        .try_init()
        .map_err(|e| LoggingError::InitializationFailed(e.to_string()))
}

/// Logging initialization error
#[derive(Debug, thiserror::Error)]
pub enum LoggingError
{
    /// Failed to initialize logging (usually: already initialized)
    #[error("Failed to initialize logging: {0}")]
    InitializationFailed(String),

    /// File logging error
    #[error("File logging error: {0}")]
    FileError(#[from] io::Error),
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_log_format_from_str()
    {
        assert_eq!(LogFormat::from_str("pretty").unwrap(), LogFormat::Pretty);
        assert_eq!(LogFormat::from_str("json").unwrap(), LogFormat::Json);
        assert_eq!(LogFormat::from_str("dev").unwrap(), LogFormat::Pretty);
        assert_eq!(LogFormat::from_str("prod").unwrap(), LogFormat::Json);
        assert!(LogFormat::from_str("invalid").is_err());
    }

    #[test]
    fn test_log_level_from_str()
    {
        assert_eq!(LogLevel::from_str("error").unwrap(), LogLevel::Error);
        assert_eq!(LogLevel::from_str("warn").unwrap(), LogLevel::Warn);
        assert_eq!(LogLevel::from_str("info").unwrap(), LogLevel::Info);
        assert_eq!(LogLevel::from_str("debug").unwrap(), LogLevel::Debug);
        assert_eq!(LogLevel::from_str("trace").unwrap(), LogLevel::Trace);
        assert!(LogLevel::from_str("invalid").is_err());
    }

    #[test]
    fn test_log_level_to_tracing_level()
    {
        assert_eq!(Level::from(LogLevel::Error), Level::ERROR);
        assert_eq!(Level::from(LogLevel::Warn), Level::WARN);
        assert_eq!(Level::from(LogLevel::Info), Level::INFO);
        assert_eq!(Level::from(LogLevel::Trace), Level::TRACE);
    }

    #[test]
    fn test_dated_log_file_name()
    {
        let path = dated_log_file().unwrap();
        let name = path.file_name().unwrap().to_string_lossy();
        assert!(name.ends_with("-extrace.log"));
        // YYYY-MM-DD prefix plus the fixed suffix
        assert_eq!(name.len(), "0000-00-00-extrace.log".len());
    }

    #[test]
    fn test_env_filter_explicit_level_wins()
    {
        let filter = env_filter(Some(Level::DEBUG));
        assert_eq!(
            Layer::<Registry>::max_level_hint(&filter),
            Some(tracing_subscriber::filter::LevelFilter::DEBUG)
        );
    }

    #[test]
    fn test_second_init_fails()
    {
        // The global dispatcher accepts one subscriber per process. Whatever
        // the first call does (it may lose to another test's install), a
        // default is in place afterwards, so the second call must fail.
        let _ = init_logging_with_level(LogLevel::Info, LogFormat::Pretty);
        let second = init_logging_with_level(LogLevel::Info, LogFormat::Pretty);
        assert!(matches!(second, Err(LoggingError::InitializationFailed(_))));
    }
}
