//! Configuration sections.

use conduit_core::{Normalizer, StatusCode, DEFAULT_ERROR_PREFIX};
use conduit_telemetry::LogConfig;
use serde::{Deserialize, Serialize};

/// Pipeline failure handling.
///
/// # Example
///
/// ```
/// use conduit_config::PipelineSection;
///
/// let section = PipelineSection::default();
/// assert!(section.catch_panics);
/// assert_eq!(section.failure_status, 500);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct PipelineSection {
    /// Name reported alongside errors produced by the pipeline.
    #[serde(default = "default_pipeline_name")]
    pub name: String,

    /// Catch panics raised by stages and normalize them like any other
    /// failure.
    #[serde(default = "default_true")]
    pub catch_panics: bool,

    /// Status code given to failures that are not already domain errors.
    #[serde(default = "default_failure_status")]
    pub failure_status: u16,

    /// Prefix of the message given to wrapped plain values.
    #[serde(default = "default_error_prefix")]
    pub error_prefix: String,
}

impl Default for PipelineSection {
    fn default() -> Self {
        Self {
            name: default_pipeline_name(),
            catch_panics: true,
            failure_status: default_failure_status(),
            error_prefix: default_error_prefix(),
        }
    }
}

impl PipelineSection {
    /// Returns the failure status as a status code, if it is a valid one.
    #[must_use]
    pub fn failure_status_code(&self) -> Option<StatusCode> {
        StatusCode::from_u16(self.failure_status).ok()
    }

    /// Builds the normalizer described by this section.
    ///
    /// An unusable `failure_status` falls back to 500; [`validate`] rejects
    /// such values when loading.
    ///
    /// [`validate`]: crate::ConduitConfig::validate
    #[must_use]
    pub fn normalizer(&self) -> Normalizer {
        Normalizer::new()
            .with_status(
                self.failure_status_code()
                    .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            )
            .with_prefix(self.error_prefix.clone())
    }
}

fn default_pipeline_name() -> String {
    "pipeline".to_string()
}

const fn default_true() -> bool {
    true
}

const fn default_failure_status() -> u16 {
    500
}

fn default_error_prefix() -> String {
    DEFAULT_ERROR_PREFIX.to_string()
}

/// Log format.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// JSON formatted logs (production).
    #[default]
    Json,
    /// Human-readable pretty format (development).
    Pretty,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Enable logging.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Filter directive (trace, debug, info, warn, error, or per-target).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log output format.
    #[serde(default)]
    pub format: LogFormat,

    /// Include source file and line in logs.
    #[serde(default)]
    pub include_location: bool,

    /// Include span open/close events.
    #[serde(default)]
    pub span_events: bool,

    /// Include thread IDs.
    #[serde(default)]
    pub thread_ids: bool,

    /// Service name reported by the logger.
    #[serde(default = "default_service_name")]
    pub service_name: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: default_log_level(),
            format: LogFormat::default(),
            include_location: false,
            span_events: false,
            thread_ids: false,
            service_name: default_service_name(),
        }
    }
}

impl LoggingConfig {
    /// Converts this section into the logger's own configuration.
    #[must_use]
    pub fn to_log_config(&self) -> LogConfig {
        LogConfig {
            enabled: self.enabled,
            level: self.level.clone(),
            json_format: self.format == LogFormat::Json,
            span_events: self.span_events,
            file_line_info: self.include_location,
            thread_ids: self.thread_ids,
            include_target: true,
            service_name: self.service_name.clone(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_service_name() -> String {
    "conduit".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_section_defaults() {
        let section = PipelineSection::default();
        assert_eq!(section.name, "pipeline");
        assert!(section.catch_panics);
        assert_eq!(section.failure_status, 500);
        assert_eq!(section.error_prefix, "Error while handling middlewares");
    }

    #[test]
    fn test_pipeline_section_normalizer() {
        let section = PipelineSection {
            failure_status: 502,
            error_prefix: "gateway".to_string(),
            ..Default::default()
        };

        let normalizer = section.normalizer();

        assert_eq!(normalizer.default_status(), StatusCode::BAD_GATEWAY);
        assert_eq!(normalizer.prefix(), "gateway");
    }

    #[test]
    fn test_normalizer_falls_back_for_bad_status() {
        let section = PipelineSection {
            failure_status: 42,
            ..Default::default()
        };
        assert!(section.failure_status_code().is_none());
        assert_eq!(
            section.normalizer().default_status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_pipeline_section_partial_toml() {
        let section: PipelineSection = toml::from_str("catch_panics = false").unwrap();
        assert!(!section.catch_panics);
        assert_eq!(section.failure_status, 500);
    }

    #[test]
    fn test_pipeline_section_rejects_unknown_fields() {
        let result: Result<PipelineSection, _> = toml::from_str("retries = 3");
        assert!(result.is_err());
    }

    #[test]
    fn test_logging_config_default() {
        let config = LoggingConfig::default();
        assert!(config.enabled);
        assert_eq!(config.level, "info");
        assert_eq!(config.format, LogFormat::Json);
    }

    #[test]
    fn test_log_format_serialization() {
        let format: LogFormat = serde_json::from_str(r#""json""#).unwrap();
        assert_eq!(format, LogFormat::Json);

        let format: LogFormat = serde_json::from_str(r#""pretty""#).unwrap();
        assert_eq!(format, LogFormat::Pretty);
    }

    #[test]
    fn test_to_log_config() {
        let config = LoggingConfig {
            level: "debug".to_string(),
            format: LogFormat::Pretty,
            include_location: true,
            ..Default::default()
        };

        let log = config.to_log_config();

        assert_eq!(log.level, "debug");
        assert!(!log.json_format);
        assert!(log.file_line_info);
        assert_eq!(log.service_name, "conduit");
    }
}
