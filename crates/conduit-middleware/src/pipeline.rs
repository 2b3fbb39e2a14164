//! Async middleware pipeline.
//!
//! A [`Pipeline`] is built once from an ordered stage list and can then be
//! called any number of times, concurrently if needed. The stage list cannot
//! change after [`PipelineBuilder::handler`] has produced the pipeline.
//!
//! ```text
//! call(args) → mw[0] → mw[1] → … → mw[N-1] → handler
//!                                               ↓
//! result     ← mw[0] ← mw[1] ← … ← mw[N-1] ←────┘
//! ```
//!
//! # Example
//!
//! ```
//! use conduit_middleware::Pipeline;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let pipeline = Pipeline::<(String,), String>::builder()
//!     .middleware_fn("comma", |(value,), next| async move {
//!         Ok(next.run_with((Some(format!(", {value}")),)).await?)
//!     })
//!     .handler_fn(|(value,)| async move { Ok(format!("hello {value}")) });
//!
//! let result = pipeline.call(("world".to_string(),)).await.unwrap();
//! assert_eq!(result, "hello , world");
//! # }
//! ```

use std::future::Future;
use std::sync::Arc;

use conduit_core::{Normalizer, PipeError, Thrown};

use crate::args::Args;
use crate::chain::Chain;
use crate::middleware::{
    AsyncChain, BoxFuture, FnHandler, FnMiddleware, Handler, Middleware, Next,
};

/// An immutable async middleware pipeline.
///
/// Cloning a pipeline is cheap; clones share the same stage list.
pub struct Pipeline<A: Args, R> {
    chain: Arc<AsyncChain<A, R>>,
}

impl<A: Args, R> Clone for Pipeline<A, R> {
    fn clone(&self) -> Self {
        Self {
            chain: Arc::clone(&self.chain),
        }
    }
}

impl<A: Args, R: Send + 'static> Pipeline<A, R> {
    /// Creates a new pipeline builder.
    #[must_use]
    pub fn builder() -> PipelineBuilder<A, R> {
        PipelineBuilder::new()
    }

    /// Calls the pipeline.
    ///
    /// Every call gets its own copy of the arguments and its own cursor, so
    /// concurrent calls never observe each other. The returned future owns
    /// everything it needs and can be spawned.
    pub fn call(&self, args: A) -> BoxFuture<'static, Result<R, PipeError>> {
        Next::seed(Arc::clone(&self.chain), args).run()
    }

    /// Returns the names of all middleware stages in order.
    ///
    /// The terminal handler is not included.
    #[must_use]
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.chain.middlewares().iter().map(|mw| mw.name()).collect()
    }

    /// Returns the number of middleware stages.
    #[must_use]
    pub fn stage_count(&self) -> usize {
        self.chain.middlewares().len()
    }

    /// Returns the normalizer applied to stage failures.
    #[must_use]
    pub fn normalizer(&self) -> &Normalizer {
        self.chain.normalizer()
    }

    /// Returns `true` if panics raised by stages are caught and normalized.
    #[must_use]
    pub fn catches_panics(&self) -> bool {
        self.chain.catches_panics()
    }
}

/// Builder for constructing a [`Pipeline`].
///
/// Middleware runs in the order it is added. Setting the terminal handler
/// finishes the builder.
pub struct PipelineBuilder<A: Args, R> {
    middlewares: Vec<Box<dyn Middleware<A, R>>>,
    normalizer: Normalizer,
    catch_panics: bool,
}

impl<A: Args, R: Send + 'static> PipelineBuilder<A, R> {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            middlewares: Vec::new(),
            normalizer: Normalizer::new(),
            catch_panics: true,
        }
    }

    /// Appends a middleware stage.
    #[must_use]
    pub fn middleware<M: Middleware<A, R>>(mut self, middleware: M) -> Self {
        self.middlewares.push(Box::new(middleware));
        self
    }

    /// Appends a middleware stage built from an async function.
    #[must_use]
    pub fn middleware_fn<F, Fut>(self, name: &'static str, func: F) -> Self
    where
        F: Fn(A, Next<A, R>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R, Thrown>> + Send + 'static,
    {
        self.middleware(FnMiddleware::new(name, func))
    }

    /// Sets the normalizer applied to stage failures.
    #[must_use]
    pub fn normalizer(mut self, normalizer: Normalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    /// Sets whether panics raised by stages are caught and normalized.
    ///
    /// Enabled by default. When disabled a panicking stage unwinds through
    /// the caller of the pipeline.
    #[must_use]
    pub fn catch_panics(mut self, catch_panics: bool) -> Self {
        self.catch_panics = catch_panics;
        self
    }

    /// Sets the terminal handler and builds the pipeline.
    #[must_use]
    pub fn handler<H: Handler<A, R>>(self, handler: H) -> Pipeline<A, R> {
        Pipeline {
            chain: Arc::new(Chain::new(
                self.middlewares,
                Box::new(handler),
                self.normalizer,
                self.catch_panics,
            )),
        }
    }

    /// Sets a terminal handler built from an async function and builds the
    /// pipeline.
    #[must_use]
    pub fn handler_fn<F, Fut>(self, func: F) -> Pipeline<A, R>
    where
        F: Fn(A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R, Thrown>> + Send + 'static,
    {
        self.handler(FnHandler::new(func))
    }
}

impl<A: Args, R: Send + 'static> Default for PipelineBuilder<A, R> {
    fn default() -> Self {
        Self::new()
    }
}

/// Builds an async [`Pipeline`] from an ordered stage list.
///
/// All arguments but the last are middleware; the last is the terminal
/// handler. A lone handler is a valid pipeline.
///
/// # Example
///
/// ```
/// use conduit_middleware::{pipe, FnHandler};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let pipeline = pipe!(FnHandler::new(|(): ()| async { Ok("ok") }));
/// assert_eq!(pipeline.call(()).await.unwrap(), "ok");
/// # }
/// ```
#[macro_export]
macro_rules! pipe {
    (@build $builder:expr; $handler:expr $(,)?) => {
        $builder.handler($handler)
    };
    (@build $builder:expr; $middleware:expr, $($rest:tt)+) => {
        $crate::pipe!(@build $builder.middleware($middleware); $($rest)+)
    };
    ($($stages:tt)+) => {
        $crate::pipe!(@build $crate::Pipeline::builder(); $($stages)+)
    };
}
