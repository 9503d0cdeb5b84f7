use std::ops::ControlFlow;

use crate::collector::Collector;

/// A [`Collector`] that runs an action on every element and produces
/// nothing.
///
/// In a parallel run the action fires on worker threads, out of input
/// order; use a sequential pipeline when ordering of the side effects
/// matters.
#[derive(Debug, Clone)]
pub struct ForEach<F> {
    action: F,
}

impl<F> ForEach<F> {
    /// Creates a new instance of this collector.
    #[inline]
    pub const fn new<T>(action: F) -> Self
    where
        F: Fn(T),
    {
        Self { action }
    }
}

impl<T, F> Collector<T> for ForEach<F>
where
    F: Fn(T) + Send + Sync,
{
    type Accum = ();
    type Output = ();

    fn supply(&self) -> Self::Accum {}

    #[inline]
    fn accumulate(&self, _acc: &mut Self::Accum, item: T) -> ControlFlow<()> {
        (self.action)(item);
        ControlFlow::Continue(())
    }

    fn combine(&self, _left: Self::Accum, _right: Self::Accum) -> Self::Accum {}

    fn finish(&self, _acc: Self::Accum) -> Self::Output {}
}
