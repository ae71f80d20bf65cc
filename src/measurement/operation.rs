//! Named units of timed work.

use std::fmt;

use crate::context::AnalysisContext;
use crate::error::OperationError;

type OperationFn<'a> = Box<dyn FnMut(&AnalysisContext) -> Result<(), OperationError> + 'a>;

/// A named closure the harness calls repeatedly.
///
/// The closure borrows the context immutably. Operations that need their own
/// state between calls (e.g. a bootstrap RNG) capture it mutably.
pub struct Operation<'a> {
    name: String,
    run: OperationFn<'a>,
}

impl<'a> Operation<'a> {
    /// Wrap a closure.
    pub fn new<F>(name: impl Into<String>, run: F) -> Self
    where
        F: FnMut(&AnalysisContext) -> Result<(), OperationError> + 'a,
    {
        Self {
            name: name.into(),
            run: Box::new(run),
        }
    }

    /// Wrap a closure returning a value; the value goes through
    /// [`black_box`](super::black_box) and is dropped.
    pub fn from_fn<F, T, E>(name: impl Into<String>, mut f: F) -> Self
    where
        F: FnMut(&AnalysisContext) -> Result<T, E> + 'a,
        E: Into<OperationError>,
    {
        Self::new(name, move |ctx| {
            super::black_box(f(ctx).map_err(Into::into)?);
            Ok(())
        })
    }

    /// Operation name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Call the closure once.
    #[inline]
    pub fn call(&mut self, ctx: &AnalysisContext) -> Result<(), OperationError> {
        (self.run)(ctx)
    }
}

impl fmt::Debug for Operation<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Operation").field("name", &self.name).finish_non_exhaustive()
    }
}
