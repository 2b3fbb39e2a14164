//! Structured logging for Conduit.
//!
//! The pipeline crates only emit `tracing` events. This module installs the
//! subscriber that turns them into output, either JSON lines or a
//! human-readable format.
//!
//! # Example
//!
//! ```rust,ignore
//! use conduit_telemetry::logging::{init_logging, LogConfig};
//!
//! init_logging(&LogConfig::development())?;
//!
//! tracing::info!(pipeline = "orders", "Pipeline built");
//! ```

use crate::error::TelemetryError;
use crate::TelemetryResult;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// Whether logging is enabled.
    pub enabled: bool,

    /// Filter directive, e.g. `"info"` or `"conduit_middleware=trace,info"`.
    pub level: String,

    /// Whether to output JSON format.
    pub json_format: bool,

    /// Whether to include span events (new, close).
    pub span_events: bool,

    /// Whether to include file/line info.
    pub file_line_info: bool,

    /// Whether to include thread IDs.
    pub thread_ids: bool,

    /// Whether to include target (module path).
    pub include_target: bool,

    /// Service name reported when logging starts.
    pub service_name: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self::production()
    }
}

impl LogConfig {
    /// Creates a development configuration with human-readable output.
    #[must_use]
    pub fn development() -> Self {
        Self {
            enabled: true,
            level: "debug".to_string(),
            json_format: false,
            span_events: true,
            file_line_info: true,
            thread_ids: false,
            include_target: true,
            service_name: "conduit".to_string(),
        }
    }

    /// Creates a production configuration with JSON output.
    #[must_use]
    pub fn production() -> Self {
        Self {
            enabled: true,
            level: "info".to_string(),
            json_format: true,
            span_events: false,
            file_line_info: false,
            thread_ids: false,
            include_target: true,
            service_name: "conduit".to_string(),
        }
    }

    /// Checks that the configuration can be installed.
    ///
    /// # Errors
    ///
    /// Returns `TelemetryError::InvalidConfig` if the filter directive does
    /// not parse or the service name is empty.
    pub fn validate(&self) -> TelemetryResult<()> {
        EnvFilter::try_new(&self.level).map_err(|e| {
            TelemetryError::InvalidConfig(format!("invalid log level '{}': {e}", self.level))
        })?;
        if self.service_name.trim().is_empty() {
            return Err(TelemetryError::InvalidConfig(
                "service name must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    fn span_events(&self) -> FmtSpan {
        if self.span_events {
            FmtSpan::NEW | FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        }
    }

    fn fmt_layer(&self) -> Box<dyn Layer<Registry> + Send + Sync> {
        let layer = tracing_subscriber::fmt::layer()
            .with_span_events(self.span_events())
            .with_file(self.file_line_info)
            .with_line_number(self.file_line_info)
            .with_thread_ids(self.thread_ids)
            .with_target(self.include_target);

        if self.json_format {
            layer.json().boxed()
        } else {
            layer.pretty().boxed()
        }
    }
}

/// Initializes the logging subsystem.
///
/// Installs a global subscriber, so it succeeds at most once per process.
///
/// # Errors
///
/// Returns `TelemetryError::InvalidConfig` if the filter directive is
/// invalid, and `TelemetryError::LoggingInit` if a global subscriber is
/// already installed.
pub fn init_logging(config: &LogConfig) -> TelemetryResult<()> {
    if !config.enabled {
        return Ok(());
    }

    config.validate()?;
    let filter = create_env_filter(&config.level)?;

    tracing_subscriber::registry()
        .with(config.fmt_layer().with_filter(filter))
        .try_init()
        .map_err(|e| TelemetryError::LoggingInit(e.to_string()))?;

    tracing::debug!(
        service.name = %config.service_name,
        json = config.json_format,
        "logging initialized"
    );
    Ok(())
}

/// Creates an env filter from a string.
///
/// # Arguments
///
/// * `filter` - Filter string (e.g., "info", "conduit_middleware=trace,warn")
///
/// # Errors
///
/// Returns error if the filter string is invalid.
pub fn create_env_filter(filter: &str) -> TelemetryResult<EnvFilter> {
    EnvFilter::try_new(filter).map_err(|e| TelemetryError::LoggingInit(e.to_string()))
}

/// Standard log fields for Conduit.
///
/// Use these field names for consistency across logs.
pub mod fields {
    /// Pipeline name field name.
    pub const PIPELINE: &str = "pipeline";

    /// Stage name field name.
    pub const STAGE: &str = "stage";

    /// Continuation cursor field name.
    pub const CURSOR: &str = "cursor";

    /// Error field name.
    pub const ERROR: &str = "error";

    /// Error category field name.
    pub const CATEGORY: &str = "category";

    /// Status code field name.
    pub const STATUS: &str = "status";

    /// Service name field name.
    pub const SERVICE_NAME: &str = "service.name";
}
