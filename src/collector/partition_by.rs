use std::ops::ControlFlow;

use crate::collector::{Collector, ToList};

/// The two halves produced by [`PartitionBy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Partitioned<R> {
    /// Results for elements the predicate accepted.
    pub matched: R,
    /// Results for elements the predicate rejected.
    pub unmatched: R,
}

/// A [`Collector`] that splits elements into two groups by a predicate
/// and runs a downstream collector on each side.
///
/// A two-key [`GroupBy`](crate::collector::GroupBy) with a fixed shape:
/// both sides always exist, even when empty.
///
/// # Examples
///
/// ```
/// use rill::{Pipeline, collector::PartitionBy};
///
/// let split = Pipeline::from([1, 2, 3, 4, 5])
///     .collect(PartitionBy::new(|x: &i32| x % 2 == 0))?;
/// assert_eq!(split.matched, [2, 4]);
/// assert_eq!(split.unmatched, [1, 3, 5]);
/// # Ok::<_, rill::PipelineError>(())
/// ```
pub struct PartitionBy<C, F> {
    pred: F,
    downstream: C,
}

impl<F> PartitionBy<ToList, F> {
    /// Creates a partitioning collector that gathers each side into a
    /// `Vec`.
    pub const fn new<T>(pred: F) -> Self
    where
        F: Fn(&T) -> bool,
    {
        Self::with_downstream::<T>(pred, ToList::new())
    }
}

impl<C, F> PartitionBy<C, F> {
    /// Creates a partitioning collector with an explicit downstream.
    pub const fn with_downstream<T>(pred: F, downstream: C) -> Self
    where
        F: Fn(&T) -> bool,
    {
        Self { pred, downstream }
    }
}

impl<T, C, F> Collector<T> for PartitionBy<C, F>
where
    C: Collector<T>,
    F: Fn(&T) -> bool + Send + Sync,
{
    type Accum = (C::Accum, C::Accum);
    type Output = Partitioned<C::Output>;

    fn supply(&self) -> Self::Accum {
        (self.downstream.supply(), self.downstream.supply())
    }

    fn accumulate(&self, acc: &mut Self::Accum, item: T) -> ControlFlow<()> {
        let slot = if (self.pred)(&item) {
            &mut acc.0
        } else {
            &mut acc.1
        };
        // One saturated side must not stop the other from filling.
        let _ = self.downstream.accumulate(slot, item);
        ControlFlow::Continue(())
    }

    fn combine(&self, left: Self::Accum, right: Self::Accum) -> Self::Accum {
        (
            self.downstream.combine(left.0, right.0),
            self.downstream.combine(left.1, right.1),
        )
    }

    fn finish(&self, acc: Self::Accum) -> Self::Output {
        Partitioned {
            matched: self.downstream.finish(acc.0),
            unmatched: self.downstream.finish(acc.1),
        }
    }
}
