use std::cmp::Ordering;
use std::ops::ControlFlow;

use crate::collector::Collector;

/// A [`Collector`] that keeps the smallest element seen.
///
/// Its output is `None` for an empty sequence. When several elements
/// compare equal and minimal, the first one is kept, matching
/// [`Iterator::min`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Min;

impl Min {
    /// Creates a new instance of this collector.
    #[inline]
    pub const fn new() -> Self {
        Self
    }
}

impl<T: Ord + Send> Collector<T> for Min {
    type Accum = Option<T>;
    type Output = Option<T>;

    fn supply(&self) -> Self::Accum {
        None
    }

    #[inline]
    fn accumulate(&self, acc: &mut Self::Accum, item: T) -> ControlFlow<()> {
        // `None.min(Some(_))` would pick `None`, so the empty case is
        // matched out explicitly. A strict `<` keeps the first minimum.
        *acc = Some(match acc.take() {
            None => item,
            Some(best) if item < best => item,
            Some(best) => best,
        });
        ControlFlow::Continue(())
    }

    fn combine(&self, left: Self::Accum, right: Self::Accum) -> Self::Accum {
        match (left, right) {
            (Some(l), Some(r)) => Some(if r < l { r } else { l }),
            (l, r) => l.or(r),
        }
    }

    fn finish(&self, acc: Self::Accum) -> Self::Output {
        acc
    }
}

/// A [`Collector`] that keeps the largest element seen.
///
/// Its output is `None` for an empty sequence. When several elements
/// compare equal and maximal, the last one is kept, matching
/// [`Iterator::max`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Max;

impl Max {
    /// Creates a new instance of this collector.
    #[inline]
    pub const fn new() -> Self {
        Self
    }
}

impl<T: Ord + Send> Collector<T> for Max {
    type Accum = Option<T>;
    type Output = Option<T>;

    fn supply(&self) -> Self::Accum {
        None
    }

    #[inline]
    fn accumulate(&self, acc: &mut Self::Accum, item: T) -> ControlFlow<()> {
        // `None` is always smaller than `Some`, and `Option::max` keeps
        // its second argument on ties, so the last maximum wins.
        *acc = acc.take().max(Some(item));
        ControlFlow::Continue(())
    }

    fn combine(&self, left: Self::Accum, right: Self::Accum) -> Self::Accum {
        // `right` is later in the sequence; ties go to it.
        left.max(right)
    }

    fn finish(&self, acc: Self::Accum) -> Self::Output {
        acc
    }
}

/// [`Min`] with a caller-supplied comparison function.
#[derive(Debug, Clone)]
pub struct MinBy<F> {
    cmp: F,
}

impl<F> MinBy<F> {
    /// Creates a new instance of this collector with the given comparator.
    #[inline]
    pub const fn new<T>(cmp: F) -> Self
    where
        F: Fn(&T, &T) -> Ordering,
    {
        Self { cmp }
    }
}

impl<T, F> Collector<T> for MinBy<F>
where
    T: Send,
    F: Fn(&T, &T) -> Ordering + Send + Sync,
{
    type Accum = Option<T>;
    type Output = Option<T>;

    fn supply(&self) -> Self::Accum {
        None
    }

    #[inline]
    fn accumulate(&self, acc: &mut Self::Accum, item: T) -> ControlFlow<()> {
        *acc = Some(match acc.take() {
            None => item,
            Some(best) if (self.cmp)(&item, &best).is_lt() => item,
            Some(best) => best,
        });
        ControlFlow::Continue(())
    }

    fn combine(&self, left: Self::Accum, right: Self::Accum) -> Self::Accum {
        match (left, right) {
            (Some(l), Some(r)) => Some(if (self.cmp)(&r, &l).is_lt() { r } else { l }),
            (l, r) => l.or(r),
        }
    }

    fn finish(&self, acc: Self::Accum) -> Self::Output {
        acc
    }
}

/// [`Max`] with a caller-supplied comparison function.
///
/// Handy as a [`GroupBy`](crate::collector::GroupBy) downstream, e.g. the
/// top-rated record per group.
#[derive(Debug, Clone)]
pub struct MaxBy<F> {
    cmp: F,
}

impl<F> MaxBy<F> {
    /// Creates a new instance of this collector with the given comparator.
    #[inline]
    pub const fn new<T>(cmp: F) -> Self
    where
        F: Fn(&T, &T) -> Ordering,
    {
        Self { cmp }
    }
}

impl<T, F> Collector<T> for MaxBy<F>
where
    T: Send,
    F: Fn(&T, &T) -> Ordering + Send + Sync,
{
    type Accum = Option<T>;
    type Output = Option<T>;

    fn supply(&self) -> Self::Accum {
        None
    }

    #[inline]
    fn accumulate(&self, acc: &mut Self::Accum, item: T) -> ControlFlow<()> {
        *acc = Some(match acc.take() {
            None => item,
            // `>=` keeps the last of equal maxima, like `Iterator::max_by`.
            Some(best) if (self.cmp)(&item, &best).is_ge() => item,
            Some(best) => best,
        });
        ControlFlow::Continue(())
    }

    fn combine(&self, left: Self::Accum, right: Self::Accum) -> Self::Accum {
        match (left, right) {
            (Some(l), Some(r)) => Some(if (self.cmp)(&r, &l).is_ge() { r } else { l }),
            (l, r) => l.or(r),
        }
    }

    fn finish(&self, acc: Self::Accum) -> Self::Output {
        acc
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_yields_none() {
        let min = Min::new();
        let max = Max::new();
        assert_eq!(
            <Min as Collector<i32>>::finish(&min, min.supply()),
            None
        );
        assert_eq!(
            <Max as Collector<i32>>::finish(&max, max.supply()),
            None
        );
    }

    #[test]
    fn min_keeps_first_tie_max_keeps_last() {
        // Distinguish equal-comparing values by a side channel.
        let cmp = |a: &(i32, char), b: &(i32, char)| a.0.cmp(&b.0);

        let min = MinBy::new(cmp);
        let mut acc = min.supply();
        for item in [(1, 'a'), (1, 'b'), (2, 'c')] {
            let _ = min.accumulate(&mut acc, item);
        }
        assert_eq!(min.finish(acc), Some((1, 'a')));

        let max = MaxBy::new(cmp);
        let mut acc = max.supply();
        for item in [(2, 'a'), (1, 'b'), (2, 'c')] {
            let _ = max.accumulate(&mut acc, item);
        }
        assert_eq!(max.finish(acc), Some((2, 'c')));
    }
}
