use std::ops::ControlFlow;

use crate::collector::Collector;

/// A [`Collector`] folding elements into an accumulator seeded with an
/// identity value.
///
/// Needs two functions: `fold` absorbs one element, `combine` merges two
/// partial folds. When the accumulator and element types coincide and the
/// operation is associative, one operation serves as both — which is what
/// [`Pipeline::reduce`](crate::Pipeline::reduce) arranges.
#[derive(Debug, Clone)]
pub struct Fold<A, F, G> {
    init: A,
    fold: F,
    combine: G,
}

impl<A, F, G> Fold<A, F, G> {
    /// Creates a new instance of this collector.
    #[inline]
    pub const fn new<T>(init: A, fold: F, combine: G) -> Self
    where
        F: Fn(A, T) -> A,
        G: Fn(A, A) -> A,
    {
        Self {
            init,
            fold,
            combine,
        }
    }
}

impl<T, A, F, G> Collector<T> for Fold<A, F, G>
where
    A: Clone + Send + Sync,
    F: Fn(A, T) -> A + Send + Sync,
    G: Fn(A, A) -> A + Send + Sync,
{
    // `Option` so the by-value fold function can take the accumulator out
    // of the `&mut` slot; it is always `Some` between calls.
    type Accum = Option<A>;
    type Output = A;

    fn supply(&self) -> Self::Accum {
        Some(self.init.clone())
    }

    #[inline]
    fn accumulate(&self, acc: &mut Self::Accum, item: T) -> ControlFlow<()> {
        if let Some(a) = acc.take() {
            *acc = Some((self.fold)(a, item));
        }
        ControlFlow::Continue(())
    }

    fn combine(&self, left: Self::Accum, right: Self::Accum) -> Self::Accum {
        match (left, right) {
            (Some(l), Some(r)) => Some((self.combine)(l, r)),
            (l, r) => l.or(r),
        }
    }

    fn finish(&self, acc: Self::Accum) -> Self::Output {
        acc.unwrap_or_else(|| self.init.clone())
    }
}

/// A [`Collector`] reducing elements with an associative operation and no
/// identity value.
///
/// The output is `None` for an empty sequence — the empty case is
/// signaled, not an error.
#[derive(Debug, Clone)]
pub struct Reduce<F> {
    op: F,
}

impl<F> Reduce<F> {
    /// Creates a new instance of this collector.
    #[inline]
    pub const fn new<T>(op: F) -> Self
    where
        F: Fn(T, T) -> T,
    {
        Self { op }
    }
}

impl<T, F> Collector<T> for Reduce<F>
where
    T: Send,
    F: Fn(T, T) -> T + Send + Sync,
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
            Some(a) => (self.op)(a, item),
        });
        ControlFlow::Continue(())
    }

    fn combine(&self, left: Self::Accum, right: Self::Accum) -> Self::Accum {
        match (left, right) {
            (Some(l), Some(r)) => Some((self.op)(l, r)),
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
    fn fold_concatenates_in_order() {
        let c = Fold::new(String::new(), |mut s: String, x: i32| {
            s.push_str(&x.to_string());
            s
        }, |mut l: String, r: String| {
            l.push_str(&r);
            l
        });
        let mut acc = c.supply();
        for x in [1, 2, 3] {
            let _ = c.accumulate(&mut acc, x);
        }
        assert_eq!(c.finish(acc), "123");
    }

    #[test]
    fn reduce_of_nothing_is_none() {
        let c = Reduce::new(|a: i32, b: i32| a + b);
        assert_eq!(c.finish(c.supply()), None);
    }
}
