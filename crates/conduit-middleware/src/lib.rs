//! # Conduit Middleware
//!
//! Continuation-based middleware pipelines.
//!
//! A pipeline is an ordered list of middleware followed by one terminal
//! handler. Each middleware receives the invocation arguments and a
//! continuation; calling the continuation runs the rest of the chain and
//! yields its result, which the middleware may return as is, transform, or
//! ignore.
//!
//! ```text
//! call(args) → mw[0] → mw[1] → … → mw[N-1] → handler
//!                                               ↓
//! result     ← mw[0] ← mw[1] ← … ← mw[N-1] ←────┘
//! ```
//!
//! ## Continuation Contract
//!
//! | Call                      | Effect                                          |
//! |---------------------------|-------------------------------------------------|
//! | `next.run()`              | Next stage runs with the original arguments     |
//! | `next.run_with(overrides)`| Next stage runs with selected positions replaced|
//! | `next.fail(error)`        | Chain stops, normalized `error` is returned     |
//! | not called                | Chain stops with the middleware's own result    |
//!
//! Overrides are always merged against the arguments the pipeline was
//! originally called with. Failures of any stage are normalized once, at the
//! continuation boundary closest to where they were raised, and propagate
//! unchanged from there.
//!
//! ## Variants
//!
//! - [`Pipeline`]: async stages, `call` returns a spawnable future
//! - [`SyncPipeline`]: synchronous stages on a single call stack
//!
//! Both share the same composition algorithm.
//!
//! ## Example
//!
//! ```
//! use conduit_middleware::{Pipeline, PipeError};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let pipeline = Pipeline::<(u32,), u32>::builder()
//!     .middleware_fn("double", |_args, next| async move {
//!         Ok(next.run().await? * 2)
//!     })
//!     .middleware_fn("guard", |(n,), next| async move {
//!         if n == 0 {
//!             return Ok(next.fail(PipeError::domain("zero")).await?);
//!         }
//!         Ok(next.run().await?)
//!     })
//!     .handler_fn(|(n,)| async move { Ok(n + 1) });
//!
//! assert_eq!(pipeline.call((4,)).await.unwrap(), 10);
//! assert!(pipeline.call((0,)).await.is_err());
//! # }
//! ```

#![doc(html_root_url = "https://docs.rs/conduit-middleware/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod args;
mod chain;
pub mod middleware;
pub mod pipeline;
pub mod sync;

// Re-export main types at crate root
pub use args::Args;
pub use middleware::{BoxFuture, FnHandler, FnMiddleware, Handler, Middleware, Next};
pub use pipeline::{Pipeline, PipelineBuilder};
pub use sync::{
    SyncFnHandler, SyncFnMiddleware, SyncHandler, SyncMiddleware, SyncNext, SyncPipeline,
    SyncPipelineBuilder,
};

pub use conduit_core::{is_domain_error, Normalizer, PipeError, StatusCode, Thrown};
