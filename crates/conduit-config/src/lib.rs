//! Typed configuration for Conduit.
//!
//! Configuration is layered: built-in defaults, then a TOML or JSON file,
//! then environment variables of the form `PREFIX__SECTION__KEY`. Unknown
//! fields are rejected.
//!
//! ```text
//! defaults → conduit.toml → CONDUIT__PIPELINE__*, CONDUIT__LOGGING__*
//! ```
//!
//! # Example
//!
//! ```
//! use conduit_config::ConfigLoader;
//!
//! let config = ConfigLoader::new()
//!     .with_string("[pipeline]\nfailure_status = 502", "toml")
//!     .unwrap()
//!     .load()
//!     .unwrap();
//!
//! let normalizer = config.pipeline.normalizer();
//! assert_eq!(normalizer.default_status().as_u16(), 502);
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod loader;
mod schema;

pub use config::ConduitConfig;
pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::{LogFormat, LoggingConfig, PipelineSection};
