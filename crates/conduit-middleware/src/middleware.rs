//! Async middleware traits and the [`Next`] continuation.
//!
//! Middleware receives the invocation arguments plus a [`Next`] value. Calling
//! one of `Next`'s methods runs the rest of the chain and yields whatever the
//! next stage produced; not calling it short-circuits the pipeline with the
//! middleware's own result.
//!
//! # Example
//!
//! ```
//! use conduit_middleware::{BoxFuture, Middleware, Next, Thrown};
//!
//! struct Shout;
//!
//! impl Middleware<(String,), String> for Shout {
//!     fn name(&self) -> &'static str {
//!         "shout"
//!     }
//!
//!     fn process<'a>(
//!         &'a self,
//!         (text,): (String,),
//!         next: Next<(String,), String>,
//!     ) -> BoxFuture<'a, Result<String, Thrown>> {
//!         Box::pin(async move {
//!             let response = next.run_with((Some(text.to_uppercase()),)).await?;
//!             Ok(format!("{response}!"))
//!         })
//!     }
//! }
//! ```

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use conduit_core::{PipeError, Thrown};

use crate::args::Args;
use crate::chain::{Chain, Step};

/// A boxed, sendable future.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub(crate) type AsyncChain<A, R> = Chain<Box<dyn Middleware<A, R>>, Box<dyn Handler<A, R>>>;

/// An async pipeline stage that runs before the terminal handler.
///
/// # Invariants
///
/// - Middleware calls its continuation at most once (`Next` is consumed)
/// - Middleware that does not call the continuation ends the chain with its
///   own result
/// - Errors returned by the continuation are already normalized; returning
///   them with `?` passes them outward unchanged
pub trait Middleware<A: Args, R>: Send + Sync + 'static {
    /// Returns the name of this middleware, used in log events.
    fn name(&self) -> &'static str;

    /// Processes one invocation.
    ///
    /// # Arguments
    ///
    /// * `args` - The arguments for this stage, with any overrides applied
    /// * `next` - Continuation running the rest of the chain
    fn process<'a>(&'a self, args: A, next: Next<A, R>) -> BoxFuture<'a, Result<R, Thrown>>;
}

/// The terminal stage of an async pipeline.
pub trait Handler<A: Args, R>: Send + Sync + 'static {
    /// Produces the pipeline's base result.
    fn handle<'a>(&'a self, args: A) -> BoxFuture<'a, Result<R, Thrown>>;
}

/// Continuation handed to async middleware.
///
/// A `Next` belongs to exactly one pipeline invocation. It carries the
/// arguments the pipeline was called with and the position of the next
/// middleware to run.
pub struct Next<A: Args, R> {
    chain: Arc<AsyncChain<A, R>>,
    origin: Arc<A>,
    cursor: usize,
}

impl<A: Args, R: Send + 'static> Next<A, R> {
    /// Creates the continuation that seeds stage 0 of a new invocation.
    pub(crate) fn seed(chain: Arc<AsyncChain<A, R>>, args: A) -> Self {
        Self {
            chain,
            origin: Arc::new(args),
            cursor: 0,
        }
    }

    /// Returns the position of the middleware this continuation dispatches to.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Returns the arguments the pipeline was originally called with.
    pub fn original_args(&self) -> &A {
        &self.origin
    }

    /// Runs the rest of the chain with the original arguments.
    pub fn run(self) -> BoxFuture<'static, Result<R, PipeError>> {
        self.call(None, A::Overrides::default())
    }

    /// Runs the rest of the chain, replacing the positions set in `overrides`.
    pub fn run_with(self, overrides: A::Overrides) -> BoxFuture<'static, Result<R, PipeError>> {
        self.call(None, overrides)
    }

    /// Stops the chain with `error`; no further stage runs.
    pub fn fail(self, error: impl Into<Thrown>) -> BoxFuture<'static, Result<R, PipeError>> {
        self.call(Some(error.into()), A::Overrides::default())
    }

    /// The general continuation call.
    ///
    /// With `Some(error)` the chain stops and the normalized error is
    /// returned. Otherwise the next stage runs with `overrides` merged into
    /// the original arguments. Any failure of that stage is normalized here,
    /// once, before it is returned.
    pub fn call(
        self,
        error: Option<Thrown>,
        overrides: A::Overrides,
    ) -> BoxFuture<'static, Result<R, PipeError>> {
        Box::pin(async move {
            match self.dispatch(error, overrides).await {
                Ok(value) => Ok(value),
                Err(thrown) => Err(self.chain.normalize(self.cursor, thrown)),
            }
        })
    }

    async fn dispatch(
        &self,
        error: Option<Thrown>,
        overrides: A::Overrides,
    ) -> Result<R, Thrown> {
        match self.chain.step(self.cursor, &*self.origin, error, overrides) {
            Step::Fail(thrown) => {
                tracing::debug!(cursor = self.cursor, "continuation short-circuited");
                Err(thrown)
            }
            Step::Middleware {
                stage,
                args,
                cursor,
            } => {
                tracing::trace!(
                    stage = stage.name(),
                    cursor = self.cursor,
                    "dispatching middleware"
                );
                let next = Self {
                    chain: Arc::clone(&self.chain),
                    origin: Arc::clone(&self.origin),
                    cursor,
                };
                self.chain
                    .guard_future(|| stage.process(args, next))
                    .await
            }
            Step::Handler { handler, args } => {
                tracing::trace!(cursor = self.cursor, "dispatching terminal handler");
                self.chain.guard_future(|| handler.handle(args)).await
            }
        }
    }
}

/// A middleware created from an async function.
///
/// # Example
///
/// ```
/// use conduit_middleware::{FnMiddleware, Next};
///
/// let middleware = FnMiddleware::new(
///     "trim",
///     |(text,): (String,), next: Next<(String,), String>| async move {
///         Ok(next.run_with((Some(text.trim().to_string()),)).await?)
///     },
/// );
/// ```
pub struct FnMiddleware<F> {
    name: &'static str,
    func: F,
}

impl<F> FnMiddleware<F> {
    /// Creates a new function-based middleware.
    pub fn new<A, R, Fut>(name: &'static str, func: F) -> Self
    where
        A: Args,
        F: Fn(A, Next<A, R>) -> Fut,
        Fut: Future<Output = Result<R, Thrown>>,
    {
        Self { name, func }
    }
}

impl<A, R, F, Fut> Middleware<A, R> for FnMiddleware<F>
where
    A: Args,
    R: Send + 'static,
    F: Fn(A, Next<A, R>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<R, Thrown>> + Send + 'static,
{
    fn name(&self) -> &'static str {
        self.name
    }

    fn process<'a>(&'a self, args: A, next: Next<A, R>) -> BoxFuture<'a, Result<R, Thrown>> {
        Box::pin((self.func)(args, next))
    }
}

/// A terminal handler created from an async function.
pub struct FnHandler<F> {
    func: F,
}

impl<F> FnHandler<F> {
    /// Creates a new function-based handler.
    pub fn new<A, R, Fut>(func: F) -> Self
    where
        A: Args,
        F: Fn(A) -> Fut,
        Fut: Future<Output = Result<R, Thrown>>,
    {
        Self { func }
    }
}

impl<A, R, F, Fut> Handler<A, R> for FnHandler<F>
where
    A: Args,
    R: Send + 'static,
    F: Fn(A) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<R, Thrown>> + Send + 'static,
{
    fn handle<'a>(&'a self, args: A) -> BoxFuture<'a, Result<R, Thrown>> {
        Box::pin((self.func)(args))
    }
}
