//! Error types for Conduit.
//!
//! This module provides the [`PipeError`] type, the single recognized error
//! shape that callers of a built pipeline observe. Stages may raise anything
//! (see [`Thrown`](crate::Thrown)); by the time a failure leaves the pipeline
//! it has been normalized into a `PipeError`.

use http::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using [`PipeError`].
pub type PipeResult<T> = Result<T, PipeError>;

/// Categories of errors for classification and reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// A failure a stage raised deliberately.
    Domain,
    /// Internal failure raised by a stage.
    Internal,
    /// A non-domain failure that was wrapped during normalization.
    Unhandled,
}

impl ErrorCategory {
    /// Returns the default HTTP-style status code for this category.
    #[must_use]
    pub const fn default_status_code(&self) -> StatusCode {
        match self {
            Self::Domain => StatusCode::BAD_REQUEST,
            Self::Internal | Self::Unhandled => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Standard error type for Conduit pipelines.
///
/// `PipeError` provides structured errors with:
/// - Error categorization
/// - Status code mapping
/// - Serializable error envelope for reporting
/// - Error chaining support
///
/// # Example
///
/// ```
/// use conduit_core::{ErrorCategory, PipeError, StatusCode};
///
/// fn check(input: &str) -> Result<(), PipeError> {
///     if input.is_empty() {
///         return Err(PipeError::domain("input cannot be empty"));
///     }
///     Ok(())
/// }
///
/// let err = check("").unwrap_err();
/// assert_eq!(err.category(), ErrorCategory::Domain);
/// assert_eq!(err.message(), "input cannot be empty");
/// assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
/// ```
#[derive(Error, Debug)]
pub enum PipeError {
    /// A failure raised deliberately by a stage.
    #[error("{message}")]
    Domain {
        /// Human-readable error message.
        message: String,
        /// Status code to report.
        status: StatusCode,
    },

    /// Internal error raised by a stage.
    #[error("Internal error: {message}")]
    Internal {
        /// Human-readable error message.
        message: String,
        /// The underlying error.
        #[source]
        source: Option<anyhow::Error>,
    },

    /// A non-domain failure wrapped into a reportable error.
    #[error("{message}")]
    Wrapped {
        /// Human-readable error message.
        message: String,
        /// Status code to report.
        status: StatusCode,
        /// The original failure.
        #[source]
        source: Option<anyhow::Error>,
    },
}

impl PipeError {
    /// Creates a domain error reporting `400 Bad Request`.
    #[must_use]
    pub fn domain(message: impl Into<String>) -> Self {
        Self::domain_with_status(message, ErrorCategory::Domain.default_status_code())
    }

    /// Creates a domain error reporting `status`.
    #[must_use]
    pub fn domain_with_status(message: impl Into<String>, status: StatusCode) -> Self {
        Self::Domain {
            message: message.into(),
            status,
        }
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
            source: None,
        }
    }

    /// Creates an internal error with a source error.
    pub fn internal_with_source(
        message: impl Into<String>,
        source: impl Into<anyhow::Error>,
    ) -> Self {
        Self::Internal {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Wraps a non-domain failure into a reportable error.
    ///
    /// When `status` is `None` the error reports `500 Internal Server Error`.
    #[must_use]
    pub fn wrap(message: impl Into<String>, status: Option<StatusCode>) -> Self {
        Self::Wrapped {
            message: message.into(),
            status: status.unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            source: None,
        }
    }

    /// Wraps a non-domain failure, keeping the original as the error source.
    pub fn wrap_with_source(
        message: impl Into<String>,
        status: Option<StatusCode>,
        source: impl Into<anyhow::Error>,
    ) -> Self {
        Self::Wrapped {
            message: message.into(),
            status: status.unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            source: Some(source.into()),
        }
    }

    /// Returns the raw message, without the prefix used by `Display`.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Domain { message, .. }
            | Self::Internal { message, .. }
            | Self::Wrapped { message, .. } => message,
        }
    }

    /// Returns the error category.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::Domain { .. } => ErrorCategory::Domain,
            Self::Internal { .. } => ErrorCategory::Internal,
            Self::Wrapped { .. } => ErrorCategory::Unhandled,
        }
    }

    /// Returns the status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Domain { status, .. } | Self::Wrapped { status, .. } => *status,
            Self::Internal { .. } => self.category().default_status_code(),
        }
    }

    /// Returns `true` if this error was produced by wrapping a non-domain failure.
    #[must_use]
    pub const fn is_wrapped(&self) -> bool {
        matches!(self, Self::Wrapped { .. })
    }

    /// Converts this error to a serializable error envelope.
    #[must_use]
    pub fn to_envelope(&self, pipeline: Option<&str>) -> ErrorEnvelope {
        ErrorEnvelope {
            error: ErrorDetail {
                code: self.error_code().to_string(),
                message: self.to_string(),
                category: self.category(),
                status: self.status_code().as_u16(),
                details: self.error_details(),
            },
            pipeline: pipeline.map(ToString::to_string),
        }
    }

    // Machine-readable error code.
    const fn error_code(&self) -> &'static str {
        match self {
            Self::Domain { .. } => "DOMAIN_ERROR",
            Self::Internal { .. } => "INTERNAL_ERROR",
            Self::Wrapped { .. } => "UNHANDLED_ERROR",
        }
    }

    fn error_details(&self) -> Option<serde_json::Value> {
        match self {
            Self::Internal {
                source: Some(source),
                ..
            }
            | Self::Wrapped {
                source: Some(source),
                ..
            } => Some(serde_json::json!({
                "cause": source.to_string()
            })),
            _ => None,
        }
    }
}

/// Serializable error envelope for reporting pipeline failures.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    /// The error details.
    pub error: ErrorDetail,
    /// Name of the pipeline that produced the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pipeline: Option<String>,
}

/// Error detail within an envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Machine-readable error code.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Error category.
    pub category: ErrorCategory,
    /// Numeric status code.
    pub status: u16,
    /// Additional error details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}
