//! The accumulation half of a pipeline.
//!
//! If a stage chain describes *how to produce* elements, a [`Collector`]
//! describes *how to consume* them. A collector is a value with four
//! capabilities: create an empty accumulator, fold one element in, merge
//! two partial accumulators, and turn the final accumulator into a
//! result. The merge step is what lets the same collector serve both a
//! sequential pass and a partitioned parallel run.
//!
//! Built-in collectors live in this module ([`ToList`], [`GroupBy`],
//! [`Joining`], ...); every terminal method on
//! [`Pipeline`](crate::Pipeline) is a thin wrapper over
//! [`collect`](crate::Pipeline::collect) with one of them.

mod and_then;
mod average;
mod count;
mod find;
mod fold;
mod for_each;
mod group_by;
mod joining;
mod mapping;
mod min_max;
mod partition_by;
mod statistics;
mod sum;
mod to_list;
mod to_map;
mod to_set;

pub use and_then::AndThen;
pub use average::Average;
pub use count::Count;
pub use find::{AllMatch, AnyMatch, FindFirst, NoneMatch};
pub use fold::{Fold, Reduce};
pub use for_each::ForEach;
pub use group_by::GroupBy;
pub use joining::Joining;
pub use mapping::Mapping;
pub use min_max::{Max, MaxBy, Min, MinBy};
pub use partition_by::{PartitionBy, Partitioned};
pub use statistics::{Statistics, SummaryStats};
pub use sum::Sum;
pub use to_list::ToList;
pub use to_map::{ToMap, ToMapMerge};
pub use to_set::ToSet;

use std::ops::ControlFlow;

/// The four-capability accumulation contract.
///
/// A collector never owns an accumulator; it only knows how to create,
/// feed, merge, and finish them. The engine creates one accumulator per
/// pass (or per worker partition), feeds it elements in sequence order,
/// and — in a parallel run — merges the per-partition accumulators left
/// to right with [`combine`](Collector::combine).
///
/// # Contract
///
/// - [`supply`](Collector::supply) returns an *empty* accumulator:
///   combining it with any other accumulator must be a no-op.
/// - [`combine`](Collector::combine) must be associative, and folding an
///   element into a partial accumulator then combining must equal
///   combining first and folding after. This is the condition under which
///   a partitioned run produces the same result as a sequential one. The
///   engine does not verify it; it is the implementor's obligation.
/// - [`accumulate`](Collector::accumulate) returns a [`ControlFlow`]
///   hint: `Break` means the collector will not change with further
///   input, so the driver may stop pulling. Collectors that can always
///   take more simply return `Continue(())` every time.
///
/// # Implementing
///
/// Wrap the state you need in an accumulator type and describe the four
/// steps. Here is a collector that counts how many distinct word lengths
/// it saw and which length was most common:
///
/// ```
/// use std::collections::HashMap;
/// use std::ops::ControlFlow;
/// use rill::{Collector, Pipeline};
///
/// struct LengthHistogram;
///
/// impl Collector<&'static str> for LengthHistogram {
///     type Accum = HashMap<usize, usize>;
///     type Output = Option<usize>;
///
///     fn supply(&self) -> Self::Accum {
///         HashMap::new()
///     }
///
///     fn accumulate(&self, acc: &mut Self::Accum, word: &'static str) -> ControlFlow<()> {
///         *acc.entry(word.len()).or_default() += 1;
///         ControlFlow::Continue(())
///     }
///
///     fn combine(&self, mut left: Self::Accum, right: Self::Accum) -> Self::Accum {
///         for (len, n) in right {
///             *left.entry(len).or_default() += n;
///         }
///         left
///     }
///
///     fn finish(&self, acc: Self::Accum) -> Self::Output {
///         acc.into_iter().max_by_key(|&(_, n)| n).map(|(len, _)| len)
///     }
/// }
///
/// let commonest = Pipeline::from(["the", "quick", "brown", "fox", "ran"])
///     .collect(LengthHistogram)?;
/// assert_eq!(commonest, Some(3));
/// # Ok::<_, rill::PipelineError>(())
/// ```
pub trait Collector<T>: Send + Sync {
    /// The mutable intermediate state one pass folds elements into.
    type Accum: Send;

    /// The result this collector yields, via [`finish`](Collector::finish).
    type Output;

    /// Creates an empty accumulator.
    fn supply(&self) -> Self::Accum;

    /// Folds one element into the accumulator, returning `Break(())` once
    /// further input cannot change the result.
    fn accumulate(&self, acc: &mut Self::Accum, item: T) -> ControlFlow<()>;

    /// Merges two partial accumulators. `left` holds elements that came
    /// earlier in the sequence than everything in `right`.
    fn combine(&self, left: Self::Accum, right: Self::Accum) -> Self::Accum;

    /// Turns the final accumulator into the result.
    fn finish(&self, acc: Self::Accum) -> Self::Output;

    /// Adapts this collector to consume `U`s by mapping each one into a
    /// `T` first.
    ///
    /// The counterpart of a `map` stage, for places where a collector is
    /// handed somewhere that fixes the element type — most usefully a
    /// [`GroupBy`] downstream.
    ///
    /// # Examples
    ///
    /// ```
    /// use rill::{Collector, Pipeline, collector::Joining};
    ///
    /// let joined = Pipeline::from(["a", "bb", "ccc"])
    ///     .collect(Joining::new(", ").map_input(|s: &str| s.len()))?;
    /// assert_eq!(joined, "1, 2, 3");
    /// # Ok::<_, rill::PipelineError>(())
    /// ```
    fn map_input<U, F>(self, f: F) -> Mapping<Self, U, T, F>
    where
        Self: Sized,
        F: Fn(U) -> T + Send + Sync,
    {
        Mapping::new(self, f)
    }

    /// Post-processes the finished output with one more function.
    ///
    /// # Examples
    ///
    /// ```
    /// use rill::{Collector, Pipeline, collector::ToList};
    ///
    /// let len = Pipeline::from([1, 2, 3])
    ///     .collect(ToList::new().and_then(|list: Vec<i32>| list.len()))?;
    /// assert_eq!(len, 3);
    /// # Ok::<_, rill::PipelineError>(())
    /// ```
    fn and_then<R, F>(self, f: F) -> AndThen<Self, R, F>
    where
        Self: Sized,
        F: Fn(Self::Output) -> R + Send + Sync,
    {
        AndThen::new(self, f)
    }
}
