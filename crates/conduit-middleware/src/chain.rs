//! The composition algorithm shared by both pipeline variants.
//!
//! A [`Chain`] owns the fixed stage list. Each continuation call asks the
//! chain for the next [`Step`]; the async and sync variants only differ in
//! how they execute that step.
//!
//! ```text
//! call(error, overrides)
//!   ├─ error present      → Step::Fail
//!   ├─ cursor < N         → Step::Middleware (cursor + 1 handed onward)
//!   └─ cursor == N        → Step::Handler
//! ```

use std::future::Future;
use std::panic::{catch_unwind, AssertUnwindSafe};

use conduit_core::{Normalizer, PipeError, Thrown};
use futures_util::FutureExt;

use crate::args::Args;

/// Stage list plus the failure policy for one built pipeline.
pub(crate) struct Chain<M, H> {
    middlewares: Vec<M>,
    handler: H,
    normalizer: Normalizer,
    catch_panics: bool,
}

/// What a continuation call resolves to.
pub(crate) enum Step<'a, M, H, A> {
    /// The caller passed an error; the chain stops here.
    Fail(Thrown),
    /// Dispatch to a middleware. `cursor` is the position handed onward.
    Middleware { stage: &'a M, args: A, cursor: usize },
    /// All middlewares are exhausted; dispatch to the terminal handler.
    Handler { handler: &'a H, args: A },
}

impl<M, H> Chain<M, H> {
    pub(crate) fn new(
        middlewares: Vec<M>,
        handler: H,
        normalizer: Normalizer,
        catch_panics: bool,
    ) -> Self {
        Self {
            middlewares,
            handler,
            normalizer,
            catch_panics,
        }
    }

    pub(crate) fn middlewares(&self) -> &[M] {
        &self.middlewares
    }

    pub(crate) fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    pub(crate) fn catches_panics(&self) -> bool {
        self.catch_panics
    }

    /// Resolves one continuation call.
    ///
    /// Overrides are merged against `origin`, the arguments the pipeline was
    /// called with, never against the previous stage's arguments.
    pub(crate) fn step<'a, A: Args>(
        &'a self,
        cursor: usize,
        origin: &A,
        error: Option<Thrown>,
        overrides: A::Overrides,
    ) -> Step<'a, M, H, A> {
        if let Some(error) = error {
            return Step::Fail(error);
        }

        let args = origin.merge(overrides);
        match self.middlewares.get(cursor) {
            Some(stage) => Step::Middleware {
                stage,
                args,
                cursor: cursor + 1,
            },
            None => Step::Handler {
                handler: &self.handler,
                args,
            },
        }
    }

    /// Normalizes a failure caught at a continuation boundary.
    pub(crate) fn normalize(&self, cursor: usize, thrown: Thrown) -> PipeError {
        let error = self.normalizer.normalize(thrown);
        tracing::debug!(
            cursor,
            category = ?error.category(),
            error = %error,
            "pipeline stage failed"
        );
        error
    }

    /// Runs a synchronous stage, turning a panic into a raised value.
    pub(crate) fn guard<T>(
        &self,
        stage: impl FnOnce() -> Result<T, Thrown>,
    ) -> Result<T, Thrown> {
        if !self.catch_panics {
            return stage();
        }
        catch_unwind(AssertUnwindSafe(stage))
            .unwrap_or_else(|payload| Err(Thrown::from_panic(payload)))
    }

    /// Starts an asynchronous stage and awaits it, turning a panic raised
    /// while building or polling its future into a raised value.
    pub(crate) async fn guard_future<T, F>(
        &self,
        start: impl FnOnce() -> F,
    ) -> Result<T, Thrown>
    where
        F: Future<Output = Result<T, Thrown>>,
    {
        if !self.catch_panics {
            return start().await;
        }

        let future = match catch_unwind(AssertUnwindSafe(start)) {
            Ok(future) => future,
            Err(payload) => return Err(Thrown::from_panic(payload)),
        };

        AssertUnwindSafe(future)
            .catch_unwind()
            .await
            .unwrap_or_else(|payload| Err(Thrown::from_panic(payload)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain(middlewares: usize) -> Chain<&'static str, &'static str> {
        Chain::new(
            vec!["mw"; middlewares],
            "handler",
            Normalizer::new(),
            true,
        )
    }

    #[test]
    fn test_step_dispatches_middleware_and_advances_cursor() {
        let chain = chain(2);
        let origin = ("a".to_string(),);

        match chain.step(0, &origin, None, Default::default()) {
            Step::Middleware { cursor, args, .. } => {
                assert_eq!(cursor, 1);
                assert_eq!(args, origin);
            }
            _ => panic!("expected middleware step"),
        }
    }

    #[test]
    fn test_step_targets_handler_when_exhausted() {
        let chain = chain(2);
        let origin = ("a".to_string(),);

        assert!(matches!(
            chain.step(2, &origin, None, Default::default()),
            Step::Handler { handler: &"handler", .. }
        ));
    }

    #[test]
    fn test_step_without_middlewares_targets_handler() {
        let chain = chain(0);
        assert!(matches!(
            chain.step(0, &(), None, ()),
            Step::Handler { .. }
        ));
    }

    #[test]
    fn test_step_short_circuits_on_error() {
        let chain = chain(1);
        let step = chain.step(0, &(1_u8,), Some(Thrown::value("stop")), (Some(2),));
        assert!(matches!(step, Step::Fail(Thrown::Value(ref v)) if v == "stop"));
    }

    #[test]
    fn test_step_merges_against_origin() {
        let chain = chain(1);
        let origin = (1_u8, 2_u8);

        match chain.step(0, &origin, None, (None, Some(9))) {
            Step::Middleware { args, .. } => assert_eq!(args, (1, 9)),
            _ => panic!("expected middleware step"),
        }
    }

    #[test]
    fn test_guard_catches_panics() {
        let chain = chain(0);
        let result: Result<(), Thrown> = chain.guard(|| panic!("exploded"));
        assert!(matches!(result, Err(Thrown::Value(ref v)) if v == "exploded"));
    }

    async fn explode() -> Result<(), Thrown> {
        panic!("exploded later")
    }

    #[tokio::test]
    async fn test_guard_future_catches_panics_while_polling() {
        let chain = chain(0);
        let result = chain.guard_future(explode).await;
        assert!(matches!(result, Err(Thrown::Value(ref v)) if v == "exploded later"));
    }

    #[tokio::test]
    async fn test_guard_future_passes_results_through() {
        let chain = chain(0);
        let result = chain.guard_future(|| async { Ok::<_, Thrown>(5) }).await;
        assert!(matches!(result, Ok(5)));
    }
}
