//! # Conduit
//!
//! Continuation-passing middleware pipelines for Rust.
//!
//! A pipeline is an ordered list of middleware ending in a terminal handler.
//! Every middleware gets the call's arguments and a continuation; invoking
//! the continuation runs the rest of the chain, optionally with some
//! arguments replaced, or stops it with an error.
//!
//! ## Crates
//!
//! | Crate                | Contents                                        |
//! |----------------------|-------------------------------------------------|
//! | [`core`]             | `PipeError`, `Thrown`, `Normalizer`             |
//! | [`middleware`]       | Async and sync pipelines, `pipe!`, `pipe_sync!` |
//! | [`config`]           | Layered TOML/JSON/env configuration             |
//! | [`telemetry`]        | Logging setup                                   |
//!
//! ## Example
//!
//! ```
//! use conduit::prelude::*;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let pipeline = pipe!(
//!     FnMiddleware::new("comma", |(v,): (String,), next: Next<(String,), String>| async move {
//!         Ok(next.run_with((Some(format!(", {v}")),)).await?)
//!     }),
//!     FnHandler::new(|(v,): (String,)| async move { Ok(format!("hello {v}")) }),
//! );
//!
//! assert_eq!(pipeline.call(("world".into(),)).await.unwrap(), "hello , world");
//! # }
//! ```

#![doc(html_root_url = "https://docs.rs/conduit/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Re-export core types
pub use conduit_core as core;

// Re-export middleware types
pub use conduit_middleware as middleware;

// Re-export configuration types
pub use conduit_config as config;

// Re-export telemetry types
pub use conduit_telemetry as telemetry;

// Re-export the construction macros at the crate root
pub use conduit_middleware::{pipe, pipe_sync};

use conduit_config::{ConduitConfig, PipelineSection};
use conduit_middleware::{Args, PipelineBuilder, SyncPipelineBuilder};
use conduit_telemetry::TelemetryResult;

/// Starts an async pipeline builder configured from `section`.
///
/// # Example
///
/// ```
/// use conduit::config::PipelineSection;
///
/// let section = PipelineSection {
///     catch_panics: false,
///     ..Default::default()
/// };
/// let pipeline = conduit::builder_from::<(), ()>(&section)
///     .handler_fn(|()| async { Ok(()) });
///
/// assert!(!pipeline.catches_panics());
/// ```
#[must_use]
pub fn builder_from<A: Args, R: Send + 'static>(section: &PipelineSection) -> PipelineBuilder<A, R> {
    PipelineBuilder::new()
        .normalizer(section.normalizer())
        .catch_panics(section.catch_panics)
}

/// Starts a sync pipeline builder configured from `section`.
#[must_use]
pub fn sync_builder_from<A: Args, R: 'static>(
    section: &PipelineSection,
) -> SyncPipelineBuilder<A, R> {
    SyncPipelineBuilder::new()
        .normalizer(section.normalizer())
        .catch_panics(section.catch_panics)
}

/// Installs the global logger described by `config`.
///
/// # Errors
///
/// Fails if the logging section is invalid or a logger is already installed.
pub fn init_logging(config: &ConduitConfig) -> TelemetryResult<()> {
    conduit_telemetry::init_logging(&config.logging.to_log_config())
}

/// Prelude module for convenient imports.
///
/// # Example
///
/// ```rust,ignore
/// use conduit::prelude::*;
/// ```
pub mod prelude {
    pub use conduit_core::{
        is_domain_error, ErrorCategory, ErrorEnvelope, Normalizer, PipeError, PipeResult,
        StatusCode, Thrown,
    };

    pub use conduit_middleware::{
        pipe, pipe_sync, Args, BoxFuture, FnHandler, FnMiddleware, Handler, Middleware, Next,
        Pipeline, PipelineBuilder, SyncFnHandler, SyncFnMiddleware, SyncHandler, SyncMiddleware,
        SyncNext, SyncPipeline, SyncPipelineBuilder,
    };

    pub use conduit_config::{ConduitConfig, ConfigLoader, PipelineSection};
}
