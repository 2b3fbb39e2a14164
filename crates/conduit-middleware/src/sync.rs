//! Synchronous middleware pipeline.
//!
//! Same composition algorithm as [`Pipeline`](crate::Pipeline), on a single
//! call stack: no stage suspends, and every continuation call returns its
//! result immediately. A stage whose result type happens to be a future has
//! that future returned as an ordinary value; it is never polled.
//!
//! # Example
//!
//! ```
//! use conduit_middleware::SyncPipeline;
//!
//! let pipeline = SyncPipeline::<(String,), String>::builder()
//!     .middleware_fn("comma", |(value,), next| {
//!         Ok(next.run_with((Some(format!(", {value}")),))?)
//!     })
//!     .handler_fn(|(value,)| Ok(format!("hello {value}")));
//!
//! assert_eq!(pipeline.call(("world".to_string(),)).unwrap(), "hello , world");
//! ```

use std::sync::Arc;

use conduit_core::{Normalizer, PipeError, Thrown};

use crate::args::Args;
use crate::chain::{Chain, Step};

type SyncChain<A, R> = Chain<Box<dyn SyncMiddleware<A, R>>, Box<dyn SyncHandler<A, R>>>;

/// A synchronous pipeline stage that runs before the terminal handler.
pub trait SyncMiddleware<A: Args, R>: Send + Sync + 'static {
    /// Returns the name of this middleware, used in log events.
    fn name(&self) -> &'static str;

    /// Processes one invocation.
    fn process(&self, args: A, next: SyncNext<'_, A, R>) -> Result<R, Thrown>;
}

/// The terminal stage of a synchronous pipeline.
pub trait SyncHandler<A: Args, R>: Send + Sync + 'static {
    /// Produces the pipeline's base result.
    fn handle(&self, args: A) -> Result<R, Thrown>;
}

/// Continuation handed to synchronous middleware.
///
/// Borrows the stage list and the original arguments of the invocation it
/// belongs to.
pub struct SyncNext<'a, A: Args, R> {
    chain: &'a SyncChain<A, R>,
    origin: &'a A,
    cursor: usize,
}

impl<'a, A: Args, R: 'static> SyncNext<'a, A, R> {
    fn seed(chain: &'a SyncChain<A, R>, origin: &'a A) -> Self {
        Self {
            chain,
            origin,
            cursor: 0,
        }
    }

    /// Returns the position of the middleware this continuation dispatches to.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Returns the arguments the pipeline was originally called with.
    pub fn original_args(&self) -> &A {
        self.origin
    }

    /// Runs the rest of the chain with the original arguments.
    pub fn run(self) -> Result<R, PipeError> {
        self.call(None, A::Overrides::default())
    }

    /// Runs the rest of the chain, replacing the positions set in `overrides`.
    pub fn run_with(self, overrides: A::Overrides) -> Result<R, PipeError> {
        self.call(None, overrides)
    }

    /// Stops the chain with `error`; no further stage runs.
    pub fn fail(self, error: impl Into<Thrown>) -> Result<R, PipeError> {
        self.call(Some(error.into()), A::Overrides::default())
    }

    /// The general continuation call. See [`Next::call`](crate::Next::call).
    pub fn call(self, error: Option<Thrown>, overrides: A::Overrides) -> Result<R, PipeError> {
        self.dispatch(error, overrides)
            .map_err(|thrown| self.chain.normalize(self.cursor, thrown))
    }

    fn dispatch(&self, error: Option<Thrown>, overrides: A::Overrides) -> Result<R, Thrown> {
        match self.chain.step(self.cursor, self.origin, error, overrides) {
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
                let next = SyncNext {
                    chain: self.chain,
                    origin: self.origin,
                    cursor,
                };
                self.chain.guard(|| stage.process(args, next))
            }
            Step::Handler { handler, args } => {
                tracing::trace!(cursor = self.cursor, "dispatching terminal handler");
                self.chain.guard(|| handler.handle(args))
            }
        }
    }
}

/// An immutable synchronous middleware pipeline.
///
/// Cloning is cheap; clones share the same stage list.
pub struct SyncPipeline<A: Args, R> {
    chain: Arc<SyncChain<A, R>>,
}

impl<A: Args, R> Clone for SyncPipeline<A, R> {
    fn clone(&self) -> Self {
        Self {
            chain: Arc::clone(&self.chain),
        }
    }
}

impl<A: Args, R: 'static> SyncPipeline<A, R> {
    /// Creates a new pipeline builder.
    #[must_use]
    pub fn builder() -> SyncPipelineBuilder<A, R> {
        SyncPipelineBuilder::new()
    }

    /// Calls the pipeline.
    pub fn call(&self, args: A) -> Result<R, PipeError> {
        SyncNext::seed(&self.chain, &args).run()
    }

    /// Returns the names of all middleware stages in order.
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

/// Builder for constructing a [`SyncPipeline`].
pub struct SyncPipelineBuilder<A: Args, R> {
    middlewares: Vec<Box<dyn SyncMiddleware<A, R>>>,
    normalizer: Normalizer,
    catch_panics: bool,
}

impl<A: Args, R: 'static> SyncPipelineBuilder<A, R> {
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
    pub fn middleware<M: SyncMiddleware<A, R>>(mut self, middleware: M) -> Self {
        self.middlewares.push(Box::new(middleware));
        self
    }

    /// Appends a middleware stage built from a function.
    #[must_use]
    pub fn middleware_fn<F>(self, name: &'static str, func: F) -> Self
    where
        F: Fn(A, SyncNext<'_, A, R>) -> Result<R, Thrown> + Send + Sync + 'static,
    {
        self.middleware(SyncFnMiddleware::new(name, func))
    }

    /// Sets the normalizer applied to stage failures.
    #[must_use]
    pub fn normalizer(mut self, normalizer: Normalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    /// Sets whether panics raised by stages are caught and normalized.
    #[must_use]
    pub fn catch_panics(mut self, catch_panics: bool) -> Self {
        self.catch_panics = catch_panics;
        self
    }

    /// Sets the terminal handler and builds the pipeline.
    #[must_use]
    pub fn handler<H: SyncHandler<A, R>>(self, handler: H) -> SyncPipeline<A, R> {
        SyncPipeline {
            chain: Arc::new(Chain::new(
                self.middlewares,
                Box::new(handler),
                self.normalizer,
                self.catch_panics,
            )),
        }
    }

    /// Sets a terminal handler built from a function and builds the pipeline.
    #[must_use]
    pub fn handler_fn<F>(self, func: F) -> SyncPipeline<A, R>
    where
        F: Fn(A) -> Result<R, Thrown> + Send + Sync + 'static,
    {
        self.handler(SyncFnHandler::new(func))
    }
}

impl<A: Args, R: 'static> Default for SyncPipelineBuilder<A, R> {
    fn default() -> Self {
        Self::new()
    }
}

/// A synchronous middleware created from a function.
pub struct SyncFnMiddleware<F> {
    name: &'static str,
    func: F,
}

impl<F> SyncFnMiddleware<F> {
    /// Creates a new function-based middleware.
    pub fn new<A, R>(name: &'static str, func: F) -> Self
    where
        A: Args,
        F: Fn(A, SyncNext<'_, A, R>) -> Result<R, Thrown>,
    {
        Self { name, func }
    }
}

impl<A, R, F> SyncMiddleware<A, R> for SyncFnMiddleware<F>
where
    A: Args,
    R: 'static,
    F: Fn(A, SyncNext<'_, A, R>) -> Result<R, Thrown> + Send + Sync + 'static,
{
    fn name(&self) -> &'static str {
        self.name
    }

    fn process(&self, args: A, next: SyncNext<'_, A, R>) -> Result<R, Thrown> {
        (self.func)(args, next)
    }
}

/// A synchronous terminal handler created from a function.
pub struct SyncFnHandler<F> {
    func: F,
}

impl<F> SyncFnHandler<F> {
    /// Creates a new function-based handler.
    pub fn new<A, R>(func: F) -> Self
    where
        A: Args,
        F: Fn(A) -> Result<R, Thrown>,
    {
        Self { func }
    }
}

impl<A, R, F> SyncHandler<A, R> for SyncFnHandler<F>
where
    A: Args,
    R: 'static,
    F: Fn(A) -> Result<R, Thrown> + Send + Sync + 'static,
{
    fn handle(&self, args: A) -> Result<R, Thrown> {
        (self.func)(args)
    }
}

/// Builds a [`SyncPipeline`] from an ordered stage list.
///
/// All arguments but the last are middleware; the last is the terminal
/// handler.
///
/// # Example
///
/// ```
/// use conduit_middleware::{pipe_sync, SyncFnHandler};
///
/// let pipeline = pipe_sync!(SyncFnHandler::new(|(): ()| Ok("ok")));
/// assert_eq!(pipeline.call(()).unwrap(), "ok");
/// ```
#[macro_export]
macro_rules! pipe_sync {
    (@build $builder:expr; $handler:expr $(,)?) => {
        $builder.handler($handler)
    };
    (@build $builder:expr; $middleware:expr, $($rest:tt)+) => {
        $crate::pipe_sync!(@build $builder.middleware($middleware); $($rest)+)
    };
    ($($stages:tt)+) => {
        $crate::pipe_sync!(@build $crate::SyncPipeline::builder(); $($stages)+)
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::future::Future;
    use std::pin::Pin;
    use std::sync::Mutex;

    struct Tag {
        name: &'static str,
        seen: Arc<Mutex<Vec<String>>>,
    }

    impl SyncMiddleware<(String,), String> for Tag {
        fn name(&self) -> &'static str {
            self.name
        }

        fn process(
            &self,
            (value,): (String,),
            next: SyncNext<'_, (String,), String>,
        ) -> Result<String, Thrown> {
            self.seen.lock().unwrap().push(format!("{}:{value}", self.name));
            let response = next.run()?;
            Ok(format!("{}({response})", self.name))
        }
    }

    #[test]
    fn test_handler_only() {
        let pipeline = SyncPipeline::<(), &'static str>::builder().handler_fn(|()| Ok("ok"));
        assert_eq!(pipeline.stage_count(), 0);
        assert_eq!(pipeline.call(()).unwrap(), "ok");
    }

    #[test]
    fn test_nesting_order() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let pipeline = SyncPipeline::<(String,), String>::builder()
            .middleware(Tag {
                name: "a",
                seen: Arc::clone(&seen),
            })
            .middleware(Tag {
                name: "b",
                seen: Arc::clone(&seen),
            })
            .handler_fn(|(value,)| Ok(value));

        let result = pipeline.call(("x".to_string(),)).unwrap();

        assert_eq!(result, "a(b(x))");
        assert_eq!(*seen.lock().unwrap(), vec!["a:x", "b:x"]);
        assert_eq!(pipeline.stage_names(), vec!["a", "b"]);
    }

    #[test]
    fn test_cursor_advances_per_middleware() {
        let cursors = Arc::new(Mutex::new(Vec::new()));
        let first = Arc::clone(&cursors);
        let second = Arc::clone(&cursors);

        let pipeline = SyncPipeline::<(), ()>::builder()
            .middleware_fn("first", move |(), next| {
                first.lock().unwrap().push(next.cursor());
                Ok(next.run()?)
            })
            .middleware_fn("second", move |(), next| {
                second.lock().unwrap().push(next.cursor());
                Ok(next.run()?)
            })
            .handler_fn(|()| Ok(()));

        pipeline.call(()).unwrap();
        assert_eq!(*cursors.lock().unwrap(), vec![1, 2]);
    }

    #[test]
    fn test_overrides_merge_against_original_args() {
        let pipeline = SyncPipeline::<(u8, u8), (u8, u8)>::builder()
            .middleware_fn("first", |_args, next| Ok(next.run_with((Some(10), None))?))
            .middleware_fn("second", |args, next| {
                assert_eq!(args, (10, 2));
                Ok(next.run()?)
            })
            .handler_fn(|args| Ok(args));

        assert_eq!(pipeline.call((1, 2)).unwrap(), (1, 2));
    }

    type Deferred = Pin<Box<dyn Future<Output = ()> + Send>>;

    #[test]
    fn test_future_result_is_not_polled() {
        let polled = Arc::new(Mutex::new(false));
        let flag = Arc::clone(&polled);

        let pipeline = SyncPipeline::<(), Deferred>::builder().handler_fn(move |()| {
            let flag = Arc::clone(&flag);
            let deferred: Deferred = Box::pin(async move {
                *flag.lock().unwrap() = true;
            });
            Ok(deferred)
        });

        let future = pipeline.call(()).unwrap();
        assert!(!*polled.lock().unwrap());
        drop(future);
        assert!(!*polled.lock().unwrap());
    }

    #[test]
    fn test_pipe_sync_macro() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let pipeline = pipe_sync!(
            Tag {
                name: "outer",
                seen: Arc::clone(&seen),
            },
            SyncFnHandler::new(|(value,): (String,)| Ok(value.to_uppercase())),
        );

        assert_eq!(pipeline.call(("hi".to_string(),)).unwrap(), "outer(HI)");
    }
}
