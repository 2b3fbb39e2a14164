//! Raised values and their normalization.
//!
//! A stage can fail with anything: a domain error, an arbitrary error type,
//! or a plain value. [`Thrown`] captures those three shapes and
//! [`Normalizer`] folds them into a single [`PipeError`].
//!
//! # Normalization Rules
//!
//! | Raised value        | Result                                              |
//! |---------------------|-----------------------------------------------------|
//! | `Thrown::Domain`    | passed through unchanged                            |
//! | `Thrown::Error`     | wrapped with the default status, message kept       |
//! | `Thrown::Value`     | synthesized into an internal error, then wrapped with the prefix |

use std::any::Any;
use std::fmt;

use http::StatusCode;

use crate::PipeError;

/// Message prefix used when wrapping values that are not errors.
pub const DEFAULT_ERROR_PREFIX: &str = "Error while handling middlewares";

/// A value raised by a pipeline stage, before normalization.
#[derive(Debug)]
pub enum Thrown {
    /// Already a recognized domain error.
    Domain(PipeError),
    /// An error-like value that is not a domain error.
    Error(anyhow::Error),
    /// A value that is not error-like at all, kept as its string representation.
    Value(String),
}

impl Thrown {
    /// Raises an arbitrary error type.
    pub fn error<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Error(anyhow::Error::new(error))
    }

    /// Raises a plain value.
    pub fn value(value: impl fmt::Display) -> Self {
        Self::Value(value.to_string())
    }

    /// Converts a panic payload into a raised value.
    ///
    /// Payloads carrying a [`PipeError`] are recognized as domain errors;
    /// string payloads keep their text.
    #[must_use]
    pub fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let payload = match payload.downcast::<PipeError>() {
            Ok(error) => return Self::Domain(*error),
            Err(payload) => payload,
        };
        let payload = match payload.downcast::<String>() {
            Ok(message) => return Self::Value(*message),
            Err(payload) => payload,
        };
        match payload.downcast::<&'static str>() {
            Ok(message) => Self::Value((*message).to_string()),
            Err(_) => Self::Value("opaque panic payload".to_string()),
        }
    }
}

impl fmt::Display for Thrown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Domain(error) => write!(f, "{error}"),
            Self::Error(error) => write!(f, "{error}"),
            Self::Value(value) => f.write_str(value),
        }
    }
}

impl From<PipeError> for Thrown {
    fn from(error: PipeError) -> Self {
        Self::Domain(error)
    }
}

impl From<anyhow::Error> for Thrown {
    fn from(error: anyhow::Error) -> Self {
        // anyhow can carry a domain error; keep it recognizable.
        match error.downcast::<PipeError>() {
            Ok(error) => Self::Domain(error),
            Err(error) => Self::Error(error),
        }
    }
}

impl From<std::io::Error> for Thrown {
    fn from(error: std::io::Error) -> Self {
        Self::error(error)
    }
}

impl From<String> for Thrown {
    fn from(value: String) -> Self {
        Self::Value(value)
    }
}

impl From<&str> for Thrown {
    fn from(value: &str) -> Self {
        Self::Value(value.to_string())
    }
}

/// Returns `true` if the raised value is already a recognized domain error.
#[must_use]
pub const fn is_domain_error(thrown: &Thrown) -> bool {
    matches!(thrown, Thrown::Domain(_))
}

/// Folds raised values into [`PipeError`].
///
/// # Example
///
/// ```
/// use conduit_core::{Normalizer, PipeError, StatusCode, Thrown};
///
/// let normalizer = Normalizer::new();
///
/// let error = normalizer.normalize(Thrown::value(42));
/// assert!(error.message().contains("42"));
/// assert_eq!(error.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
///
/// let domain = normalizer.normalize(PipeError::domain("missing").into());
/// assert_eq!(domain.message(), "missing");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Normalizer {
    default_status: StatusCode,
    prefix: String,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Normalizer {
    /// Creates a normalizer reporting `500` with the default message prefix.
    #[must_use]
    pub fn new() -> Self {
        Self {
            default_status: StatusCode::INTERNAL_SERVER_ERROR,
            prefix: DEFAULT_ERROR_PREFIX.to_string(),
        }
    }

    /// Sets the status carried by wrapped errors.
    #[must_use]
    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.default_status = status;
        self
    }

    /// Sets the message prefix used for wrapped plain values.
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Returns the status carried by wrapped errors.
    #[must_use]
    pub const fn default_status(&self) -> StatusCode {
        self.default_status
    }

    /// Returns the message prefix used for wrapped plain values.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Normalizes a raised value into a domain error.
    #[must_use]
    pub fn normalize(&self, thrown: Thrown) -> PipeError {
        match thrown {
            Thrown::Domain(error) => error,
            Thrown::Error(error) => {
                let message = error.to_string();
                PipeError::wrap_with_source(message, Some(self.default_status), error)
            }
            Thrown::Value(value) => {
                let message = format!("{}: {value}", self.prefix);
                let synthesized = PipeError::internal(value);
                PipeError::wrap_with_source(message, Some(self.default_status), synthesized)
            }
        }
    }
}
