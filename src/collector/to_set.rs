use std::collections::HashSet;
use std::hash::Hash;
use std::ops::ControlFlow;

use crate::collector::Collector;

/// A [`Collector`] that gathers elements into a `HashSet`, dropping
/// duplicates.
///
/// This is the collector behind [`Pipeline::to_set`](crate::Pipeline::to_set).
#[derive(Debug, Clone, Copy, Default)]
pub struct ToSet;

impl ToSet {
    /// Creates a new instance of this collector.
    #[inline]
    pub const fn new() -> Self {
        Self
    }
}

impl<T> Collector<T> for ToSet
where
    T: Eq + Hash + Send,
{
    type Accum = HashSet<T>;
    type Output = HashSet<T>;

    fn supply(&self) -> Self::Accum {
        HashSet::new()
    }

    #[inline]
    fn accumulate(&self, acc: &mut Self::Accum, item: T) -> ControlFlow<()> {
        acc.insert(item);
        ControlFlow::Continue(())
    }

    fn combine(&self, mut left: Self::Accum, right: Self::Accum) -> Self::Accum {
        left.extend(right);
        left
    }

    fn finish(&self, acc: Self::Accum) -> Self::Output {
        acc
    }
}
