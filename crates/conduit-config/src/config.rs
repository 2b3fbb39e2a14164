//! Main configuration type.

use serde::{Deserialize, Serialize};

use crate::{ConfigError, LogFormat, LoggingConfig, PipelineSection};

/// Complete Conduit configuration.
///
/// Use [`ConfigLoader`](crate::ConfigLoader) to load configuration from files
/// and environment variables.
///
/// # Example
///
/// ```toml
/// [pipeline]
/// name = "orders"
/// catch_panics = true
/// failure_status = 500
/// error_prefix = "Error while handling middlewares"
///
/// [logging]
/// level = "conduit_middleware=debug,info"
/// format = "pretty"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct ConduitConfig {
    /// Pipeline failure handling.
    #[serde(default)]
    pub pipeline: PipelineSection,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl ConduitConfig {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if:
    /// - `pipeline.failure_status` is not a 4xx or 5xx status
    /// - `pipeline.error_prefix` is empty
    /// - `logging` cannot be turned into a working logger
    pub fn validate(&self) -> Result<(), ConfigError> {
        let status = self.pipeline.failure_status_code();
        if !status.is_some_and(|s| s.is_client_error() || s.is_server_error()) {
            return Err(ConfigError::invalid_value(
                "pipeline.failure_status",
                format!("expected a 4xx or 5xx status, got {}", self.pipeline.failure_status),
            ));
        }

        if self.pipeline.error_prefix.trim().is_empty() {
            return Err(ConfigError::invalid_value(
                "pipeline.error_prefix",
                "must not be empty",
            ));
        }

        self.logging
            .to_log_config()
            .validate()
            .map_err(|e| ConfigError::invalid_value("logging", e.to_string()))?;

        Ok(())
    }

    /// Create a development configuration preset.
    ///
    /// Pretty debug logging with source locations.
    ///
    /// # Example
    ///
    /// ```
    /// use conduit_config::ConduitConfig;
    ///
    /// let config = ConduitConfig::development();
    /// assert_eq!(config.logging.level, "debug");
    /// ```
    #[must_use]
    pub fn development() -> Self {
        let mut config = Self::default();

        config.logging.level = "debug".to_string();
        config.logging.format = LogFormat::Pretty;
        config.logging.include_location = true;
        config.logging.span_events = true;

        config
    }

    /// Create a production configuration preset.
    ///
    /// JSON info logging.
    #[must_use]
    pub fn production() -> Self {
        let mut config = Self::default();

        config.logging.level = "info".to_string();
        config.logging.format = LogFormat::Json;
        config.logging.include_location = false;

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(ConduitConfig::default().validate().is_ok());
        assert!(ConduitConfig::development().validate().is_ok());
        assert!(ConduitConfig::production().validate().is_ok());
    }

    #[test]
    fn test_presets() {
        let dev = ConduitConfig::development();
        assert_eq!(dev.logging.format, LogFormat::Pretty);
        assert!(dev.logging.include_location);

        let prod = ConduitConfig::production();
        assert_eq!(prod.logging.format, LogFormat::Json);
        assert_eq!(prod.logging.level, "info");
    }

    #[test]
    fn test_validate_rejects_success_status() {
        let mut config = ConduitConfig::default();
        config.pipeline.failure_status = 200;

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("pipeline.failure_status"));
    }

    #[test]
    fn test_validate_rejects_out_of_range_status() {
        let mut config = ConduitConfig::default();
        config.pipeline.failure_status = 1000;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_accepts_client_error_status() {
        let mut config = ConduitConfig::default();
        config.pipeline.failure_status = 422;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_prefix() {
        let mut config = ConduitConfig::default();
        config.pipeline.error_prefix = "   ".to_string();

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("pipeline.error_prefix"));
    }

    #[test]
    fn test_validate_rejects_bad_log_level() {
        let mut config = ConduitConfig::default();
        config.logging.level = "conduit=loud".to_string();

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("logging"));
    }

    #[test]
    fn test_serde_roundtrip_through_toml() {
        let config = ConduitConfig::development();
        let text = toml::to_string(&config).unwrap();
        let parsed: ConduitConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_unknown_section_is_rejected() {
        let result: Result<ConduitConfig, _> = toml::from_str("[server]\nport = 1");
        assert!(result.is_err());
    }
}
