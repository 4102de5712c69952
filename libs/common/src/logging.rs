//! Logging setup shared by the services
//!
//! Console output uses a compact `timestamp [LEVEL] message` format. File
//! output (optional) rolls daily under the configured directory, either in
//! the same format or as JSON. The filter is reloadable at runtime through
//! [`set_log_level`]. HTTP access logs go to the `api_access` target.

use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};

use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt::{self, format::Writer, FmtContext, FormatEvent, FormatFields},
    layer::SubscriberExt,
    registry::LookupSpan,
    reload,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

/// Target used by [`http_request_logger`]
pub const API_ACCESS_TARGET: &str = "api_access";

fn format_level(level: &Level) -> &'static str {
    match *level {
        Level::TRACE => "[TRACE]",
        Level::DEBUG => "[DEBUG]",
        Level::INFO => "[INFO]",
        Level::WARN => "[WARN]",
        Level::ERROR => "[ERROR]",
    }
}

/// `2025-12-02T00:50:44.809123Z [INFO] message key=value`
struct BracketedLevelFormat;

impl<S, N> FormatEvent<S, N> for BracketedLevelFormat
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &tracing::Event<'_>,
    ) -> std::fmt::Result {
        write!(
            writer,
            "{} ",
            chrono::Utc::now().format("%Y-%m-%dT%H:%M:%S%.6fZ")
        )?;

        let level = *event.metadata().level();
        if writer.has_ansi_escapes() {
            let color = match level {
                Level::TRACE => "\x1b[35m",
                Level::DEBUG => "\x1b[34m",
                Level::INFO => "\x1b[32m",
                Level::WARN => "\x1b[33m",
                Level::ERROR => "\x1b[31m",
            };
            write!(writer, "{}{}\x1b[0m ", color, format_level(&level))?;
        } else {
            write!(writer, "{} ", format_level(&level))?;
        }

        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

type EnvFilterReloadHandle = reload::Handle<EnvFilter, tracing_subscriber::Registry>;

static FILTER_HANDLE: OnceLock<EnvFilterReloadHandle> = OnceLock::new();
static CURRENT_FILTER: OnceLock<Mutex<String>> = OnceLock::new();
// Keeps the non-blocking file writer flushing until process exit
static FILE_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Logger configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Service name, used for the default filter and the file prefix
    pub service_name: String,
    /// Default level when `RUST_LOG` is not set
    pub level: String,
    pub log_dir: PathBuf,
    /// Also write to `{log_dir}/{service_name}.log.YYYY-MM-DD`
    pub enable_file: bool,
    /// JSON lines in the log file instead of the bracketed format
    pub enable_json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            service_name: "unknown".to_string(),
            level: "info".to_string(),
            log_dir: PathBuf::from("logs"),
            enable_file: false,
            enable_json: false,
        }
    }
}

/// Filter string for a config, honouring `RUST_LOG` when set
pub fn default_filter(config: &LogConfig) -> String {
    match std::env::var("RUST_LOG") {
        Ok(env) if env.contains(API_ACCESS_TARGET) => env,
        Ok(env) => format!("{},{}=info", env, API_ACCESS_TARGET),
        Err(_) => format!(
            "{},{}=debug,{}=info",
            config.level,
            config.service_name.replace('-', "_"),
            API_ACCESS_TARGET
        ),
    }
}

/// Install the global subscriber
///
/// Fails if a global subscriber is already installed.
pub fn init_with_config(config: LogConfig) -> Result<(), Box<dyn std::error::Error>> {
    let filter_str = default_filter(&config);
    let env_filter = EnvFilter::try_new(&filter_str)?;
    let (reload_filter, reload_handle) = reload::Layer::new(env_filter);

    let console_layer = fmt::layer()
        .with_ansi(true)
        .event_format(BracketedLevelFormat)
        .boxed();

    let file_layer = if config.enable_file {
        std::fs::create_dir_all(&config.log_dir)?;
        let appender = tracing_appender::rolling::daily(
            &config.log_dir,
            format!("{}.log", config.service_name),
        );
        let (non_blocking, guard) = tracing_appender::non_blocking(appender);
        let _ = FILE_GUARD.set(guard);

        let layer = if config.enable_json {
            fmt::layer()
                .json()
                .with_writer(non_blocking)
                .with_target(true)
                .boxed()
        } else {
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .event_format(BracketedLevelFormat)
                .boxed()
        };
        Some(layer)
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(reload_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()?;

    let _ = FILTER_HANDLE.set(reload_handle);
    let _ = CURRENT_FILTER.set(Mutex::new(filter_str.clone()));

    tracing::info!("Logging: {} filter={}", config.service_name, filter_str);
    if config.enable_file {
        tracing::debug!("Log file dir: {}", config.log_dir.display());
    }
    Ok(())
}

/// Replace the filter at runtime, e.g. `"debug"` or `"info,geosrv=trace"`
pub fn set_log_level(level: &str) -> Result<(), String> {
    let handle = FILTER_HANDLE
        .get()
        .ok_or("Logging not initialized with reload support")?;

    let new_filter =
        EnvFilter::try_new(level).map_err(|e| format!("Invalid log level '{}': {}", level, e))?;
    handle
        .reload(new_filter)
        .map_err(|e| format!("Failed to reload log filter: {}", e))?;

    if let Some(current) = CURRENT_FILTER.get() {
        if let Ok(mut guard) = current.lock() {
            *guard = level.to_string();
        }
    }

    tracing::info!("Log level changed to: {}", level);
    Ok(())
}

/// Active filter string, `"unknown"` before initialization
pub fn get_log_level() -> String {
    CURRENT_FILTER
        .get()
        .and_then(|m| m.lock().ok())
        .map(|guard| guard.clone())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Axum access-log middleware
///
/// Modifying requests (POST/PUT/PATCH/DELETE) are logged at INFO, all other
/// requests at DEBUG, both on the `api_access` target. Request bodies are
/// never read; the declared content length is logged instead.
///
/// Add it before `.with_state()`:
/// ```rust,ignore
/// let app = Router::new()
///     // ... routes ...
///     .layer(axum::middleware::from_fn(common::logging::http_request_logger))
///     .with_state(state);
/// ```
#[cfg(feature = "axum")]
pub async fn http_request_logger(
    req: axum::extract::Request,
    next: axum::middleware::Next,
) -> axum::response::Response {
    use std::time::Instant;
    use tracing::{debug, info};

    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let content_length = req
        .headers()
        .get(axum::http::header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(0);
    let start = Instant::now();

    let response = next.run(req).await;

    let status = response.status().as_u16();
    let duration_ms = start.elapsed().as_millis();
    if matches!(method.as_str(), "POST" | "PUT" | "PATCH" | "DELETE") {
        info!(
            target: "api_access",
            method = %method,
            path = %path,
            status = status,
            duration_ms = %duration_ms,
            body_bytes = content_length,
            "HTTP request"
        );
    } else {
        debug!(
            target: "api_access",
            method = %method,
            path = %path,
            status = status,
            duration_ms = %duration_ms,
            "HTTP request"
        );
    }

    response
}
