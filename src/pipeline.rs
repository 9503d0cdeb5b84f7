//! The pipeline builder: sources, lazy stages, execution mode, terminals.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::fmt::{self, Debug, Display};
use std::hash::Hash;
use std::num::NonZeroUsize;
use std::sync::Arc;

use crate::collector::{
    AllMatch, AnyMatch, Average, Collector, Count, FindFirst, Fold, GroupBy, Joining, Max, MaxBy,
    Min, MinBy, NoneMatch, PartitionBy, Partitioned, Reduce, Statistics, Sum, SummaryStats,
    ToList, ToMap, ToMapMerge, ToSet, ForEach,
};
use crate::engine::{self, CancelToken, ExecMode, trace};
use crate::error::{PipelineError, StageKind};
use crate::source::{CollectionSource, GeneratorSource};
use crate::stage::{
    Distinct, DistinctBy, Drive, Filter, FlatMap, Limit, Map, Peek, Skip, Sorted, TakeWhile,
};

/// A lazy, declarative chain of transformations over a sequence, ending
/// in a terminal operation.
///
/// A pipeline value is immutable: every stage method consumes it and
/// returns a new pipeline, so clones taken at any point stay independent
/// and safe to drive separately (for a restartable, collection-backed
/// source). Nothing is evaluated until a terminal method runs; `filter`,
/// `map` and friends only record what to do.
///
/// Terminal methods consume the pipeline by value — a finished pipeline
/// cannot be driven twice. The one runtime guard is for generator-backed
/// sources shared between clones: those are single-pass, and a second run
/// fails with [`PipelineError::SourceConsumed`].
///
/// # Examples
///
/// ```
/// use rill::Pipeline;
///
/// let squares_of_evens = Pipeline::from([1, 2, 3, 4, 5, 6])
///     .filter(|x| x % 2 == 0)
///     .map(|x| x * x)
///     .to_list()?;
/// assert_eq!(squares_of_evens, [4, 16, 36]);
/// # Ok::<_, rill::PipelineError>(())
/// ```
///
/// The same chain, partitioned across workers — the aggregate is
/// identical because the collector's combine step is associative:
///
/// ```
/// use rill::Pipeline;
///
/// let total: i64 = Pipeline::from(0..10_000)
///     .filter(|x| x % 3 == 0)
///     .map(|x| i64::from(x) * 2)
///     .parallel()
///     .sum()?;
/// assert_eq!(total, 33_336_666);
/// # Ok::<_, rill::PipelineError>(())
/// ```
pub struct Pipeline<T> {
    drive: Arc<dyn Drive<T>>,
    mode: ExecMode,
    cancel: CancelToken,
}

impl<T> Clone for Pipeline<T> {
    fn clone(&self) -> Self {
        Self {
            drive: Arc::clone(&self.drive),
            mode: self.mode,
            cancel: self.cancel.clone(),
        }
    }
}

impl<T> Debug for Pipeline<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("mode", &self.mode)
            .finish_non_exhaustive()
    }
}

impl<T: Send + 'static> Pipeline<T> {
    fn with_drive(drive: Arc<dyn Drive<T>>) -> Self {
        Self {
            drive,
            mode: ExecMode::default(),
            cancel: CancelToken::default(),
        }
    }

    fn derive<U: Send + 'static>(self, drive: Arc<dyn Drive<U>>) -> Pipeline<U> {
        Pipeline {
            drive,
            mode: self.mode,
            cancel: self.cancel,
        }
    }

    /// Builds a pipeline over a finite collection.
    ///
    /// The input is materialized once; the source is restartable, so
    /// pipelines cloned from this one can each be driven. Elements are
    /// cloned out of the shared collection as the sequence is pulled.
    ///
    /// # Examples
    ///
    /// ```
    /// use rill::Pipeline;
    ///
    /// let names = Pipeline::from(vec!["Alice", "Bob", "Charlie"]);
    /// assert_eq!(names.count()?, 3);
    /// # Ok::<_, rill::PipelineError>(())
    /// ```
    pub fn from<I>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Clone + Sync,
    {
        Self::with_drive(Arc::new(CollectionSource::new(
            items.into_iter().collect(),
        )))
    }

    /// Builds a pipeline over a fixed set of values.
    ///
    /// ```
    /// use rill::Pipeline;
    ///
    /// let langs = Pipeline::of(["Java", "Python", "Rust"]).to_list()?;
    /// assert_eq!(langs, ["Java", "Python", "Rust"]);
    /// # Ok::<_, rill::PipelineError>(())
    /// ```
    pub fn of<const N: usize>(items: [T; N]) -> Self
    where
        T: Clone + Sync,
    {
        Self::from(items)
    }

    /// Builds an infinite pipeline from a seed and a successor function:
    /// `seed, f(&seed), f(&f(&seed)), ...`.
    ///
    /// The source is unbounded and single-pass. A bounding stage
    /// ([`limit`](Pipeline::limit) or [`take_while`](Pipeline::take_while))
    /// is required before any terminal operation; without one the
    /// terminal fails fast with [`PipelineError::UnboundedSequence`]
    /// rather than hanging.
    ///
    /// # Examples
    ///
    /// ```
    /// use rill::Pipeline;
    ///
    /// let powers_of_two = Pipeline::iterate(1_u32, |n| n * 2)
    ///     .limit(8)
    ///     .to_list()?;
    /// assert_eq!(powers_of_two, [1, 2, 4, 8, 16, 32, 64, 128]);
    /// # Ok::<_, rill::PipelineError>(())
    /// ```
    pub fn iterate(seed: T, f: impl Fn(&T) -> T + Send + 'static) -> Self {
        let iter = std::iter::successors(Some(seed), move |prev| {
            trace::enter(StageKind::Source);
            Some(f(prev))
        });
        Self::with_drive(Arc::new(GeneratorSource::new(iter)))
    }

    /// Builds an infinite pipeline by calling a supplier for every
    /// element. Unbounded and single-pass, like
    /// [`iterate`](Pipeline::iterate).
    pub fn generate(mut supplier: impl FnMut() -> T + Send + 'static) -> Self {
        let iter = std::iter::repeat_with(move || {
            trace::enter(StageKind::Source);
            supplier()
        });
        Self::with_drive(Arc::new(GeneratorSource::new(iter)))
    }

    // ----- intermediate stages -----

    /// Keeps only elements satisfying the predicate.
    pub fn filter(self, pred: impl Fn(&T) -> bool + Send + Sync + 'static) -> Self {
        let drive = Arc::new(Filter::new(Arc::clone(&self.drive), pred));
        self.derive(drive)
    }

    /// Transforms every element with a pure function.
    pub fn map<U: Send + 'static>(
        self,
        f: impl Fn(T) -> U + Send + Sync + 'static,
    ) -> Pipeline<U> {
        let drive = Arc::new(Map::new(Arc::clone(&self.drive), f));
        self.derive(drive)
    }

    /// Expands every element into a sub-sequence and splices the results
    /// in order.
    ///
    /// ```
    /// use rill::Pipeline;
    ///
    /// let chars = Pipeline::from(["ab", "cd"])
    ///     .flat_map(|s| s.chars().collect::<Vec<_>>())
    ///     .to_list()?;
    /// assert_eq!(chars, ['a', 'b', 'c', 'd']);
    /// # Ok::<_, rill::PipelineError>(())
    /// ```
    pub fn flat_map<U, I>(self, f: impl Fn(T) -> I + Send + Sync + 'static) -> Pipeline<U>
    where
        U: Send + 'static,
        I: IntoIterator<Item = U>,
        I::IntoIter: Send + 'static,
    {
        let drive = Arc::new(FlatMap::new(Arc::clone(&self.drive), f));
        self.derive(drive)
    }

    /// Sorts the sequence by its natural order.
    ///
    /// A barrier stage: the whole upstream is drained and buffered before
    /// anything flows on. The sort is stable.
    pub fn sorted(self) -> Self
    where
        T: Ord,
    {
        self.sorted_by(T::cmp)
    }

    /// Sorts the sequence with a caller-supplied comparator (stable).
    pub fn sorted_by(self, cmp: impl Fn(&T, &T) -> Ordering + Send + Sync + 'static) -> Self {
        let drive = Arc::new(Sorted::new(Arc::clone(&self.drive), cmp));
        self.derive(drive)
    }

    /// Drops duplicate elements, keeping the first occurrence of each in
    /// input order.
    pub fn distinct(self) -> Self
    where
        T: Eq + Hash + Clone,
    {
        let drive = Arc::new(Distinct::new(Arc::clone(&self.drive)));
        self.derive(drive)
    }

    /// Drops elements whose key was already seen, for types without a
    /// usable `Eq + Hash` of their own (or with a different notion of
    /// identity).
    pub fn distinct_by<K>(self, key: impl Fn(&T) -> K + Send + Sync + 'static) -> Self
    where
        K: Eq + Hash + 'static,
    {
        let drive = Arc::new(DistinctBy::new(Arc::clone(&self.drive), key));
        self.derive(drive)
    }

    /// Passes at most `n` elements through, then stops pulling from the
    /// upstream entirely. `limit(0)` evaluates nothing.
    ///
    /// This also bounds an infinite generator source.
    pub fn limit(self, n: usize) -> Self {
        let drive = Arc::new(Limit::new(Arc::clone(&self.drive), n));
        self.derive(drive)
    }

    /// Discards the first `n` elements and passes the rest unchanged.
    pub fn skip(self, n: usize) -> Self {
        let drive = Arc::new(Skip::new(Arc::clone(&self.drive), n));
        self.derive(drive)
    }

    /// Runs a side-effecting action on every element that reaches this
    /// stage, without changing the sequence.
    ///
    /// Under lazy evaluation the action observes exactly the elements
    /// that flow past — no more: a downstream `limit` or short-circuiting
    /// terminal keeps upstream elements unevaluated and unseen.
    ///
    /// In a parallel run the action fires on worker threads, interleaved
    /// and out of input order. Elements are handed over by shared
    /// reference; state the action touches is the caller's to
    /// synchronize.
    pub fn peek(self, action: impl Fn(&T) + Send + Sync + 'static) -> Self {
        let drive = Arc::new(Peek::new(Arc::clone(&self.drive), action));
        self.derive(drive)
    }

    /// Passes elements through until the predicate first fails, then
    /// stops pulling. Bounds an infinite generator source.
    ///
    /// ```
    /// use rill::Pipeline;
    ///
    /// let small_evens = Pipeline::iterate(2_u32, |n| n + 2)
    ///     .take_while(|&n| n <= 10)
    ///     .to_list()?;
    /// assert_eq!(small_evens, [2, 4, 6, 8, 10]);
    /// # Ok::<_, rill::PipelineError>(())
    /// ```
    pub fn take_while(self, pred: impl Fn(&T) -> bool + Send + Sync + 'static) -> Self {
        let drive = Arc::new(TakeWhile::new(Arc::clone(&self.drive), pred));
        self.derive(drive)
    }

    // ----- execution mode -----

    /// Selects single-threaded execution (the default). Input order is
    /// preserved end to end, except where a `sorted` stage redefines it.
    pub fn sequential(mut self) -> Self {
        self.mode = ExecMode::Sequential;
        self
    }

    /// Selects partitioned execution with one worker per available core.
    ///
    /// The source is split into contiguous chunks, the stage chain runs
    /// independently per chunk, and the per-chunk accumulators are merged
    /// left to right with the collector's combine step. For a collector
    /// with an associative combine the final aggregate equals the
    /// sequential one; element-level side effects (`peek`, `for_each`)
    /// may interleave across workers.
    ///
    /// Chains with a whole-sequence stage (`sorted`, `distinct`, `limit`,
    /// `skip`, `take_while`) and single-pass generator sources cannot be
    /// partitioned; they run as one sequential pass with the same result.
    pub fn parallel(mut self) -> Self {
        self.mode = ExecMode::Parallel { workers: None };
        self
    }

    /// Like [`parallel`](Pipeline::parallel) with an explicit worker
    /// count.
    pub fn parallel_with(mut self, workers: NonZeroUsize) -> Self {
        self.mode = ExecMode::Parallel {
            workers: Some(workers),
        };
        self
    }

    /// Attaches a cancellation token. Workers check it between elements;
    /// a cancelled run returns [`PipelineError::Cancelled`] instead of a
    /// partial result.
    pub fn cancel_with(mut self, token: &CancelToken) -> Self {
        self.cancel = token.clone();
        self
    }

    // ----- terminal operations -----

    /// Drives the sequence into a [`Collector`] and returns its output.
    ///
    /// Every other terminal method is a wrapper over this one.
    pub fn collect<C: Collector<T>>(self, collector: C) -> Result<C::Output, PipelineError> {
        engine::run(&*self.drive, &collector, self.mode, &self.cancel)
    }

    /// Gathers the sequence into a `Vec`, in order.
    pub fn to_list(self) -> Result<Vec<T>, PipelineError> {
        self.collect(ToList::new())
    }

    /// Gathers the sequence into a `HashSet`, dropping duplicates.
    pub fn to_set(self) -> Result<HashSet<T>, PipelineError>
    where
        T: Eq + Hash,
    {
        self.collect(ToSet::new())
    }

    /// Builds a map from key/value projections of every element.
    ///
    /// A repeated key is an error; use
    /// [`to_map_merge`](Pipeline::to_map_merge) to resolve collisions
    /// instead.
    ///
    /// ```
    /// use rill::{Pipeline, PipelineError};
    ///
    /// let lengths = Pipeline::from(["a", "bb"])
    ///     .to_map(|s| s.to_string(), |s| s.len())?;
    /// assert_eq!(lengths["a"], 1);
    ///
    /// let dup = Pipeline::from(["a", "bb", "a"])
    ///     .to_map(|s| s.to_string(), |s| s.len());
    /// assert!(matches!(dup, Err(PipelineError::DuplicateKey { .. })));
    /// # Ok::<_, rill::PipelineError>(())
    /// ```
    pub fn to_map<K, V>(
        self,
        key_fn: impl Fn(&T) -> K + Send + Sync,
        val_fn: impl Fn(T) -> V + Send + Sync,
    ) -> Result<HashMap<K, V>, PipelineError>
    where
        K: Eq + Hash + Debug + Send,
        V: Send,
    {
        self.collect(ToMap::new(key_fn, val_fn))?
    }

    /// Builds a map, folding values that share a key with the merge
    /// function.
    pub fn to_map_merge<K, V>(
        self,
        key_fn: impl Fn(&T) -> K + Send + Sync,
        val_fn: impl Fn(T) -> V + Send + Sync,
        merge: impl Fn(V, V) -> V + Send + Sync,
    ) -> Result<HashMap<K, V>, PipelineError>
    where
        K: Eq + Hash + Send,
        V: Send,
    {
        self.collect(ToMapMerge::new(key_fn, val_fn, merge))
    }

    /// Folds the sequence onto an identity value with an associative
    /// operation.
    ///
    /// The operation doubles as the merge step for parallel runs, so it
    /// must be associative and `identity` must be its neutral element.
    ///
    /// ```
    /// use rill::Pipeline;
    ///
    /// let total = Pipeline::from(["a", "bb", "ccc"])
    ///     .map(|s| s.len())
    ///     .reduce(0, |a, b| a + b)?;
    /// assert_eq!(total, 6);
    /// # Ok::<_, rill::PipelineError>(())
    /// ```
    pub fn reduce(
        self,
        identity: T,
        op: impl Fn(T, T) -> T + Send + Sync,
    ) -> Result<T, PipelineError>
    where
        T: Clone + Sync,
    {
        let op = Arc::new(op);
        let fold = {
            let op = Arc::clone(&op);
            move |acc, item| op(acc, item)
        };
        let combine = move |left, right| op(left, right);
        self.collect(Fold::new(identity, fold, combine))
    }

    /// Reduces the sequence without an identity value. An empty sequence
    /// yields `Ok(None)`.
    pub fn reduce_with(
        self,
        op: impl Fn(T, T) -> T + Send + Sync,
    ) -> Result<Option<T>, PipelineError> {
        self.collect(Reduce::new(op))
    }

    /// General fold: a seed accumulator, a fold step, and a combine step
    /// for merging partial folds in a parallel run.
    pub fn fold<A>(
        self,
        init: A,
        fold: impl Fn(A, T) -> A + Send + Sync,
        combine: impl Fn(A, A) -> A + Send + Sync,
    ) -> Result<A, PipelineError>
    where
        A: Clone + Send + Sync,
    {
        self.collect(Fold::new(init, fold, combine))
    }

    /// Counts the elements of the sequence.
    pub fn count(self) -> Result<usize, PipelineError> {
        self.collect(Count::new())
    }

    /// Sums a numeric sequence. Empty sums to zero.
    pub fn sum(self) -> Result<T, PipelineError>
    where
        Sum<T>: Collector<T, Output = T> + Default,
    {
        self.collect(Sum::<T>::default())
    }

    /// The arithmetic mean of a numeric sequence, or `Ok(None)` when it
    /// is empty — never a division error.
    pub fn average(self) -> Result<Option<f64>, PipelineError>
    where
        T: Into<f64>,
    {
        self.collect(Average::new())
    }

    /// Count, sum, min, max, and mean in a single pass.
    pub fn statistics(self) -> Result<SummaryStats, PipelineError>
    where
        T: Into<f64>,
    {
        self.collect(Statistics::new())
    }

    /// The smallest element, or `Ok(None)` for an empty sequence.
    pub fn min(self) -> Result<Option<T>, PipelineError>
    where
        T: Ord,
    {
        self.collect(Min::new())
    }

    /// The largest element, or `Ok(None)` for an empty sequence.
    pub fn max(self) -> Result<Option<T>, PipelineError>
    where
        T: Ord,
    {
        self.collect(Max::new())
    }

    /// The smallest element by a comparator, or `Ok(None)` when empty.
    pub fn min_by(
        self,
        cmp: impl Fn(&T, &T) -> Ordering + Send + Sync,
    ) -> Result<Option<T>, PipelineError> {
        self.collect(MinBy::new(cmp))
    }

    /// The largest element by a comparator, or `Ok(None)` when empty.
    pub fn max_by(
        self,
        cmp: impl Fn(&T, &T) -> Ordering + Send + Sync,
    ) -> Result<Option<T>, PipelineError> {
        self.collect(MaxBy::new(cmp))
    }

    /// Classifies elements into groups: `Map<K, Vec<T>>`.
    ///
    /// ```
    /// use rill::Pipeline;
    ///
    /// let by_len = Pipeline::from(["cs", "math", "art"])
    ///     .group_by(|s| s.len())?;
    /// assert_eq!(by_len[&2], ["cs"]);
    /// assert_eq!(by_len[&4], ["math"]);
    /// # Ok::<_, rill::PipelineError>(())
    /// ```
    pub fn group_by<K>(
        self,
        classifier: impl Fn(&T) -> K + Send + Sync,
    ) -> Result<HashMap<K, Vec<T>>, PipelineError>
    where
        K: Eq + Hash + Send,
    {
        self.collect(GroupBy::new(classifier))
    }

    /// Classifies elements into groups and aggregates each group with a
    /// downstream collector — counts, averages, nested groupings.
    ///
    /// ```
    /// use rill::{Pipeline, collector::Count};
    ///
    /// let counts = Pipeline::from(["a", "bb", "cc", "d"])
    ///     .group_by_with(|s| s.len(), Count::new())?;
    /// assert_eq!(counts[&1], 2);
    /// assert_eq!(counts[&2], 2);
    /// # Ok::<_, rill::PipelineError>(())
    /// ```
    pub fn group_by_with<K, C>(
        self,
        classifier: impl Fn(&T) -> K + Send + Sync,
        downstream: C,
    ) -> Result<HashMap<K, C::Output>, PipelineError>
    where
        K: Eq + Hash + Send,
        C: Collector<T>,
    {
        self.collect(GroupBy::with_downstream(classifier, downstream))
    }

    /// Splits elements into the two sides of a predicate.
    pub fn partition_by(
        self,
        pred: impl Fn(&T) -> bool + Send + Sync,
    ) -> Result<Partitioned<Vec<T>>, PipelineError> {
        self.collect(PartitionBy::new(pred))
    }

    /// Splits elements by a predicate and aggregates each side with a
    /// downstream collector.
    pub fn partition_by_with<C>(
        self,
        pred: impl Fn(&T) -> bool + Send + Sync,
        downstream: C,
    ) -> Result<Partitioned<C::Output>, PipelineError>
    where
        C: Collector<T>,
    {
        self.collect(PartitionBy::with_downstream(pred, downstream))
    }

    /// Renders every element and joins them with a separator.
    pub fn joining(self, sep: impl Into<String>) -> Result<String, PipelineError>
    where
        T: Display,
    {
        self.collect(Joining::new(sep))
    }

    /// Like [`joining`](Pipeline::joining), wrapped in a prefix and
    /// suffix.
    ///
    /// ```
    /// use rill::Pipeline;
    ///
    /// let listing = Pipeline::from(["CS", "Math"])
    ///     .joining_with(" | ", "majors: [", "]")?;
    /// assert_eq!(listing, "majors: [CS | Math]");
    /// # Ok::<_, rill::PipelineError>(())
    /// ```
    pub fn joining_with(
        self,
        sep: impl Into<String>,
        prefix: impl Into<String>,
        suffix: impl Into<String>,
    ) -> Result<String, PipelineError>
    where
        T: Display,
    {
        self.collect(Joining::new(sep).wrap(prefix, suffix))
    }

    /// Whether any element satisfies the predicate (short-circuits).
    pub fn any_match(
        self,
        pred: impl Fn(&T) -> bool + Send + Sync,
    ) -> Result<bool, PipelineError> {
        self.collect(AnyMatch::new(pred))
    }

    /// Whether every element satisfies the predicate (short-circuits).
    pub fn all_match(
        self,
        pred: impl Fn(&T) -> bool + Send + Sync,
    ) -> Result<bool, PipelineError> {
        self.collect(AllMatch::new(pred))
    }

    /// Whether no element satisfies the predicate (short-circuits).
    pub fn none_match(
        self,
        pred: impl Fn(&T) -> bool + Send + Sync,
    ) -> Result<bool, PipelineError> {
        self.collect(NoneMatch::new(pred))
    }

    /// The first element of the sequence, or `Ok(None)` when it is
    /// empty. Evaluates no more of the upstream than needed.
    pub fn find_first(self) -> Result<Option<T>, PipelineError> {
        self.collect(FindFirst::new())
    }

    /// Runs an action on every element. Ordered in sequential mode;
    /// interleaved across workers in parallel mode.
    pub fn for_each(self, action: impl Fn(T) + Send + Sync) -> Result<(), PipelineError> {
        self.collect(ForEach::new(action))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_then_map_applies_in_declaration_order() {
        let out = Pipeline::from([1, 2, 3, 4, 5, 6])
            .filter(|x| x % 2 == 0)
            .map(|x| x * x)
            .to_list()
            .unwrap();
        assert_eq!(out, [4, 16, 36]);
    }

    #[test]
    fn rejected_elements_are_invisible_downstream() {
        use std::sync::Mutex;

        let seen = Arc::new(Mutex::new(Vec::new()));
        let observer = Arc::clone(&seen);
        Pipeline::from([1, 2, 3, 4])
            .filter(|x| x % 2 == 0)
            .peek(move |x| observer.lock().unwrap().push(*x))
            .for_each(|_| {})
            .unwrap();
        assert_eq!(*seen.lock().unwrap(), [2, 4]);
    }

    #[test]
    fn reduce_over_mapped_lengths() {
        let total = Pipeline::from(["a", "bb", "ccc"])
            .map(|s| s.len())
            .reduce(0, |a, b| a + b)
            .unwrap();
        assert_eq!(total, 6);
    }

    #[test]
    fn reduce_with_on_empty_signals_none() {
        let out = Pipeline::from(Vec::<i32>::new())
            .reduce_with(|a, b| a + b)
            .unwrap();
        assert_eq!(out, None);
    }

    #[test]
    fn to_map_duplicate_key_is_an_error() {
        let dup = Pipeline::from(["a", "bb", "a"]).to_map(|s| s.to_string(), |s| s.len());
        assert!(matches!(dup, Err(PipelineError::DuplicateKey { key }) if key.contains('a')));
    }

    #[test]
    fn to_map_merge_resolves_collisions() {
        let merged = Pipeline::from(["a", "bb", "a"])
            .to_map_merge(|s| s.to_string(), |s| s.len(), |old, new| old + new)
            .unwrap();
        assert_eq!(merged["a"], 2);
        assert_eq!(merged["bb"], 2);
    }

    #[test]
    fn average_of_empty_is_none() {
        let avg = Pipeline::from(Vec::<i32>::new()).average().unwrap();
        assert_eq!(avg, None);
    }

    #[test]
    fn min_max_empty_signal_none() {
        assert_eq!(Pipeline::from(Vec::<i32>::new()).min().unwrap(), None);
        assert_eq!(Pipeline::from(Vec::<i32>::new()).max().unwrap(), None);
        assert_eq!(Pipeline::from(Vec::<i32>::new()).find_first().unwrap(), None);
    }

    #[test]
    fn sorted_is_idempotent() {
        let once = Pipeline::from([3, 1, 2, 1]).sorted().to_list().unwrap();
        let twice = Pipeline::from([3, 1, 2, 1])
            .sorted()
            .sorted()
            .to_list()
            .unwrap();
        assert_eq!(once, [1, 1, 2, 3]);
        assert_eq!(once, twice);
    }

    #[test]
    fn distinct_is_idempotent() {
        let once = Pipeline::from([1, 2, 1, 3, 2]).distinct().to_list().unwrap();
        let twice = Pipeline::from([1, 2, 1, 3, 2])
            .distinct()
            .distinct()
            .to_list()
            .unwrap();
        assert_eq!(once, [1, 2, 3]);
        assert_eq!(once, twice);
    }

    #[test]
    fn limit_caps_and_preserves_order() {
        let out = Pipeline::from([5, 6, 7]).limit(10).to_list().unwrap();
        assert_eq!(out, [5, 6, 7]);
        let out = Pipeline::from([5, 6, 7]).limit(2).to_list().unwrap();
        assert_eq!(out, [5, 6]);
    }

    #[test]
    fn limit_zero_evaluates_no_upstream_element() {
        use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};

        let evaluated = Arc::new(AtomicUsize::new(0));
        let probe = Arc::clone(&evaluated);
        let out = Pipeline::from([1, 2, 3])
            .peek(move |_| {
                probe.fetch_add(1, AtomicOrdering::Relaxed);
            })
            .limit(0)
            .to_list()
            .unwrap();
        assert!(out.is_empty());
        assert_eq!(evaluated.load(AtomicOrdering::Relaxed), 0);
    }

    #[test]
    fn skip_discards_the_prefix() {
        let out = Pipeline::from([1, 2, 3, 4]).skip(2).to_list().unwrap();
        assert_eq!(out, [3, 4]);
        let out = Pipeline::from([1, 2]).skip(5).to_list().unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn unbounded_terminal_fails_fast() {
        let err = Pipeline::iterate(1, |n| n + 1).count().unwrap_err();
        assert_eq!(err, PipelineError::UnboundedSequence);

        // `skip` and `filter` do not bound anything.
        let err = Pipeline::generate(|| 42).skip(10).count().unwrap_err();
        assert_eq!(err, PipelineError::UnboundedSequence);
    }

    #[test]
    fn sorted_after_unbounded_source_fails_despite_downstream_limit() {
        let err = Pipeline::iterate(1, |n| n + 1)
            .sorted()
            .limit(3)
            .to_list()
            .unwrap_err();
        assert_eq!(err, PipelineError::UnboundedSequence);
    }

    #[test]
    fn generator_source_is_consumed_by_one_run() {
        let pipeline = Pipeline::iterate(0, |n| n + 1).limit(3);
        let again = pipeline.clone();

        assert_eq!(pipeline.to_list().unwrap(), [0, 1, 2]);
        assert_eq!(again.to_list().unwrap_err(), PipelineError::SourceConsumed);
    }

    #[test]
    fn collection_source_is_restartable_across_clones() {
        let evens = Pipeline::from(0..10).filter(|x| x % 2 == 0);
        let count = evens.clone().count().unwrap();
        let list = evens.to_list().unwrap();
        assert_eq!(count, 5);
        assert_eq!(list, [0, 2, 4, 6, 8]);
    }

    #[test]
    fn match_family() {
        let p = || Pipeline::from([3.8_f64, 3.6, 4.2, 3.9]);
        assert!(p().any_match(|gpa| *gpa > 4.0).unwrap());
        assert!(p().all_match(|gpa| *gpa > 3.0).unwrap());
        assert!(p().none_match(|gpa| *gpa < 2.0).unwrap());
        assert!(!p().any_match(|gpa| *gpa > 9.0).unwrap());
    }

    #[test]
    fn find_first_respects_stage_order() {
        let first = Pipeline::from([1, 2, 3, 4])
            .filter(|x| x % 2 == 0)
            .find_first()
            .unwrap();
        assert_eq!(first, Some(2));
    }

    #[test]
    fn take_while_bounds_an_iterate_source() {
        let evens = Pipeline::iterate(2_u32, |n| n + 2)
            .take_while(|&n| n <= 100)
            .count()
            .unwrap();
        assert_eq!(evens, 50);
    }

    #[test]
    fn group_by_with_nested_downstreams() {
        let students = [
            ("Ann", "cs", 3.8),
            ("Bo", "math", 3.6),
            ("Cy", "cs", 4.2),
            ("Di", "math", 3.2),
        ];

        let counts = Pipeline::from(students)
            .group_by_with(|s| s.1, Count::new())
            .unwrap();
        assert_eq!(counts["cs"], 2);
        assert_eq!(counts["math"], 2);

        let avg_gpa = Pipeline::from(students)
            .group_by_with(|s| s.1, Average::new().map_input(|s: (&str, &str, f64)| s.2))
            .unwrap();
        assert_eq!(avg_gpa["cs"], Some(4.0));

        let top = Pipeline::from(students)
            .group_by_with(|s| s.1, MaxBy::new(|a: &(&str, &str, f64), b| a.2.total_cmp(&b.2)))
            .unwrap();
        assert_eq!(top["cs"].unwrap().0, "Cy");
        assert_eq!(top["math"].unwrap().0, "Bo");
    }

    #[test]
    fn nested_grouping() {
        let students = [("Ann", "cs", 'F'), ("Bo", "cs", 'M'), ("Cy", "math", 'F')];
        let nested = Pipeline::from(students)
            .group_by_with(|s| s.1, GroupBy::new(|s: &(&str, &str, char)| s.2))
            .unwrap();
        assert_eq!(nested["cs"][&'F'], [("Ann", "cs", 'F')]);
        assert_eq!(nested["cs"][&'M'], [("Bo", "cs", 'M')]);
        assert_eq!(nested["math"][&'F'], [("Cy", "math", 'F')]);
    }

    #[test]
    fn collecting_and_then_downstream() {
        let sizes = Pipeline::from(["a", "bb", "cc", "d"])
            .group_by_with(|s| s.len(), ToList::new().and_then(|v: Vec<&str>| v.len()))
            .unwrap();
        assert_eq!(sizes[&1], 2);
        assert_eq!(sizes[&2], 2);
    }

    #[test]
    fn partition_by_splits_both_ways() {
        let split = Pipeline::from([3.8, 3.6, 4.2, 3.2])
            .partition_by(|gpa| *gpa > 3.5)
            .unwrap();
        assert_eq!(split.matched, [3.8, 3.6, 4.2]);
        assert_eq!(split.unmatched, [3.2]);
    }

    #[test]
    fn joining_with_affixes() {
        let joined = Pipeline::from(["CS", "Math", "Physics"])
            .distinct()
            .joining_with(" | ", "majors: [", "]")
            .unwrap();
        assert_eq!(joined, "majors: [CS | Math | Physics]");
    }

    #[test]
    fn statistics_in_one_pass() {
        let stats = Pipeline::from([20, 22, 21, 23, 20, 24]).statistics().unwrap();
        assert_eq!(stats.count(), 6);
        assert_eq!(stats.min(), Some(20.0));
        assert_eq!(stats.max(), Some(24.0));
        assert_eq!(stats.average(), Some(21.666666666666668));
    }

    #[test]
    fn sum_of_empty_is_zero() {
        assert_eq!(Pipeline::from(Vec::<i64>::new()).sum().unwrap(), 0);
    }

    #[test]
    fn group_by_agrees_with_itertools() {
        use itertools::Itertools;

        let xs = vec![1, 2, 3, 4, 5, 6, 7];
        let ours = Pipeline::from(xs.clone()).group_by(|x| x % 3).unwrap();
        let theirs = xs.into_iter().map(|x| (x % 3, x)).into_group_map();
        assert_eq!(ours, theirs);
    }

    #[test]
    fn joining_agrees_with_itertools() {
        use itertools::Itertools;

        let words = ["a", "bb", "ccc"];
        let ours = Pipeline::from(words).joining(", ").unwrap();
        let theirs = words.iter().join(", ");
        assert_eq!(ours, theirs);
    }
}
