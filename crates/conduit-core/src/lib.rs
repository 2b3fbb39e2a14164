//! # Conduit Core
//!
//! Core error types for the Conduit middleware pipeline.
//!
//! This crate provides the pieces every pipeline stage agrees on:
//!
//! - [`PipeError`] - The recognized domain error that pipeline callers observe
//! - [`ErrorCategory`] - Classification and default status codes
//! - [`Thrown`] - Whatever a stage raised before normalization
//! - [`Normalizer`] - Turns any [`Thrown`] value into a [`PipeError`]
//!
//! The pipeline itself lives in `conduit-middleware`; it only touches this
//! crate through [`is_domain_error`], [`PipeError::wrap`] and [`Normalizer`].

#![doc(html_root_url = "https://docs.rs/conduit-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
mod thrown;

pub use error::{ErrorCategory, ErrorDetail, ErrorEnvelope, PipeError, PipeResult};
pub use thrown::{is_domain_error, Normalizer, Thrown, DEFAULT_ERROR_PREFIX};

/// Re-exported so callers can name status codes without depending on `http`.
pub use http::StatusCode;
