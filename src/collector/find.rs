use std::ops::ControlFlow;

use crate::collector::Collector;

/// A [`Collector`] that keeps the first element and stops pulling.
///
/// The output is `None` for an empty sequence. In a partitioned run the
/// merge prefers the leftmost partition, so "first" still means first in
/// sequence order.
#[derive(Debug, Clone, Copy, Default)]
pub struct FindFirst;

impl FindFirst {
    /// Creates a new instance of this collector.
    #[inline]
    pub const fn new() -> Self {
        Self
    }
}

impl<T: Send> Collector<T> for FindFirst {
    type Accum = Option<T>;
    type Output = Option<T>;

    fn supply(&self) -> Self::Accum {
        None
    }

    #[inline]
    fn accumulate(&self, acc: &mut Self::Accum, item: T) -> ControlFlow<()> {
        if acc.is_none() {
            *acc = Some(item);
        }
        ControlFlow::Break(())
    }

    fn combine(&self, left: Self::Accum, right: Self::Accum) -> Self::Accum {
        left.or(right)
    }

    fn finish(&self, acc: Self::Accum) -> Self::Output {
        acc
    }
}

/// A [`Collector`] answering whether any element satisfies the predicate.
///
/// Short-circuits on the first hit. Vacuously `false` on an empty
/// sequence.
#[derive(Debug, Clone)]
pub struct AnyMatch<F> {
    pred: F,
}

impl<F> AnyMatch<F> {
    /// Creates a new instance of this collector.
    #[inline]
    pub const fn new<T>(pred: F) -> Self
    where
        F: Fn(&T) -> bool,
    {
        Self { pred }
    }
}

impl<T, F> Collector<T> for AnyMatch<F>
where
    F: Fn(&T) -> bool + Send + Sync,
{
    type Accum = bool;
    type Output = bool;

    fn supply(&self) -> Self::Accum {
        false
    }

    #[inline]
    fn accumulate(&self, acc: &mut Self::Accum, item: T) -> ControlFlow<()> {
        if (self.pred)(&item) {
            *acc = true;
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    }

    fn combine(&self, left: Self::Accum, right: Self::Accum) -> Self::Accum {
        left || right
    }

    fn finish(&self, acc: Self::Accum) -> Self::Output {
        acc
    }
}

/// A [`Collector`] answering whether every element satisfies the
/// predicate.
///
/// Short-circuits on the first miss. Vacuously `true` on an empty
/// sequence.
#[derive(Debug, Clone)]
pub struct AllMatch<F> {
    pred: F,
}

impl<F> AllMatch<F> {
    /// Creates a new instance of this collector.
    #[inline]
    pub const fn new<T>(pred: F) -> Self
    where
        F: Fn(&T) -> bool,
    {
        Self { pred }
    }
}

impl<T, F> Collector<T> for AllMatch<F>
where
    F: Fn(&T) -> bool + Send + Sync,
{
    type Accum = bool;
    type Output = bool;

    fn supply(&self) -> Self::Accum {
        true
    }

    #[inline]
    fn accumulate(&self, acc: &mut Self::Accum, item: T) -> ControlFlow<()> {
        if (self.pred)(&item) {
            ControlFlow::Continue(())
        } else {
            *acc = false;
            ControlFlow::Break(())
        }
    }

    fn combine(&self, left: Self::Accum, right: Self::Accum) -> Self::Accum {
        left && right
    }

    fn finish(&self, acc: Self::Accum) -> Self::Output {
        acc
    }
}

/// A [`Collector`] answering whether no element satisfies the predicate.
///
/// Short-circuits on the first hit. Vacuously `true` on an empty
/// sequence.
#[derive(Debug, Clone)]
pub struct NoneMatch<F> {
    pred: F,
}

impl<F> NoneMatch<F> {
    /// Creates a new instance of this collector.
    #[inline]
    pub const fn new<T>(pred: F) -> Self
    where
        F: Fn(&T) -> bool,
    {
        Self { pred }
    }
}

impl<T, F> Collector<T> for NoneMatch<F>
where
    F: Fn(&T) -> bool + Send + Sync,
{
    type Accum = bool;
    type Output = bool;

    fn supply(&self) -> Self::Accum {
        true
    }

    #[inline]
    fn accumulate(&self, acc: &mut Self::Accum, item: T) -> ControlFlow<()> {
        if (self.pred)(&item) {
            *acc = false;
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    }

    fn combine(&self, left: Self::Accum, right: Self::Accum) -> Self::Accum {
        left && right
    }

    fn finish(&self, acc: Self::Accum) -> Self::Output {
        acc
    }
}
