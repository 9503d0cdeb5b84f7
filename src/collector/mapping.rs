use std::marker::PhantomData;
use std::ops::ControlFlow;

use crate::collector::Collector;

/// A [`Collector`] that maps each incoming element before handing it to
/// the wrapped collector.
///
/// This `struct` is created by [`Collector::map_input()`]. See its
/// documentation for more.
pub struct Mapping<C, U, T, F> {
    downstream: C,
    f: F,
    _marker: PhantomData<fn(U) -> T>,
}

impl<C, U, T, F> Mapping<C, U, T, F> {
    pub(crate) const fn new(downstream: C, f: F) -> Self {
        Self {
            downstream,
            f,
            _marker: PhantomData,
        }
    }
}

impl<T, U, C, F> Collector<U> for Mapping<C, U, T, F>
where
    C: Collector<T>,
    F: Fn(U) -> T + Send + Sync,
{
    type Accum = C::Accum;
    type Output = C::Output;

    fn supply(&self) -> Self::Accum {
        self.downstream.supply()
    }

    #[inline]
    fn accumulate(&self, acc: &mut Self::Accum, item: U) -> ControlFlow<()> {
        self.downstream.accumulate(acc, (self.f)(item))
    }

    fn combine(&self, left: Self::Accum, right: Self::Accum) -> Self::Accum {
        self.downstream.combine(left, right)
    }

    fn finish(&self, acc: Self::Accum) -> Self::Output {
        self.downstream.finish(acc)
    }
}
