//! Structured logging for Conduit pipelines.
//!
//! Conduit's library crates emit `tracing` events and never install a
//! subscriber themselves. Applications call [`init_logging`] once at startup
//! to route those events to stdout, as JSON lines in production or a pretty
//! format during development.
//!
//! # Events
//!
//! | Level   | Message                          | Fields                      |
//! |---------|----------------------------------|-----------------------------|
//! | `trace` | `dispatching middleware`         | `stage`, `cursor`           |
//! | `trace` | `dispatching terminal handler`   | `cursor`                    |
//! | `debug` | `continuation short-circuited`   | `cursor`                    |
//! | `debug` | `pipeline stage failed`          | `cursor`, `category`, `error` |
//!
//! # Example
//!
//! ```rust,ignore
//! use conduit_telemetry::{init_logging, LogConfig};
//!
//! init_logging(&LogConfig {
//!     level: "conduit_middleware=trace,info".to_string(),
//!     ..LogConfig::development()
//! })?;
//! ```

#![doc(html_root_url = "https://docs.rs/conduit-telemetry/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
pub mod logging;

pub use error::{TelemetryError, TelemetryResult};
pub use logging::{create_env_filter, fields, init_logging, LogConfig};
