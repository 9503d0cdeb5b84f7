use std::ops::ControlFlow;

use crate::collector::Collector;

/// A [`Collector`] that computes the arithmetic mean of numeric elements.
///
/// Elements are widened to `f64`. The output is `None` for an empty
/// sequence — emptiness is signaled, never a division error.
#[derive(Debug, Clone, Copy, Default)]
pub struct Average;

impl Average {
    /// Creates a new instance of this collector.
    #[inline]
    pub const fn new() -> Self {
        Self
    }
}

impl<T> Collector<T> for Average
where
    T: Into<f64> + Send,
{
    type Accum = (f64, usize);
    type Output = Option<f64>;

    fn supply(&self) -> Self::Accum {
        (0.0, 0)
    }

    #[inline]
    fn accumulate(&self, acc: &mut Self::Accum, item: T) -> ControlFlow<()> {
        acc.0 += item.into();
        acc.1 += 1;
        ControlFlow::Continue(())
    }

    fn combine(&self, left: Self::Accum, right: Self::Accum) -> Self::Accum {
        (left.0 + right.0, left.1 + right.1)
    }

    fn finish(&self, (sum, count): Self::Accum) -> Self::Output {
        (count > 0).then(|| sum / count as f64)
    }
}
