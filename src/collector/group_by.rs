use std::collections::HashMap;
use std::hash::Hash;
use std::marker::PhantomData;
use std::ops::ControlFlow;

use crate::collector::{Collector, ToList};

/// A [`Collector`] that classifies elements into groups and runs a
/// downstream collector inside each group.
///
/// The default downstream is [`ToList`], giving the classic
/// `Map<K, Vec<T>>` shape; any other collector slots in for nested
/// aggregation — counts per group, averages per group, a further
/// `GroupBy`, and so on.
///
/// # Examples
///
/// ```
/// use rill::{Collector, Pipeline};
/// use rill::collector::{Average, GroupBy};
///
/// let gpa_by_major = Pipeline::from([
///     ("cs", 3.8),
///     ("math", 3.6),
///     ("cs", 4.2),
/// ])
/// .collect(GroupBy::with_downstream(
///     |&(major, _): &(&str, f64)| major,
///     Average::new().map_input(|(_, gpa): (&str, f64)| gpa),
/// ))?;
///
/// assert_eq!(gpa_by_major["cs"], Some(4.0));
/// assert_eq!(gpa_by_major["math"], Some(3.6));
/// # Ok::<_, rill::PipelineError>(())
/// ```
pub struct GroupBy<K, C, F> {
    classifier: F,
    downstream: C,
    _marker: PhantomData<fn() -> K>,
}

impl<K, F> GroupBy<K, ToList, F> {
    /// Creates a grouping collector that gathers each group into a `Vec`.
    pub const fn new<T>(classifier: F) -> Self
    where
        F: Fn(&T) -> K,
    {
        Self::with_downstream::<T>(classifier, ToList::new())
    }
}

impl<K, C, F> GroupBy<K, C, F> {
    /// Creates a grouping collector with an explicit downstream.
    pub const fn with_downstream<T>(classifier: F, downstream: C) -> Self
    where
        F: Fn(&T) -> K,
    {
        Self {
            classifier,
            downstream,
            _marker: PhantomData,
        }
    }
}

impl<T, K, C, F> Collector<T> for GroupBy<K, C, F>
where
    K: Eq + Hash + Send,
    C: Collector<T>,
    F: Fn(&T) -> K + Send + Sync,
{
    type Accum = HashMap<K, C::Accum>;
    type Output = HashMap<K, C::Output>;

    fn supply(&self) -> Self::Accum {
        HashMap::new()
    }

    fn accumulate(&self, acc: &mut Self::Accum, item: T) -> ControlFlow<()> {
        let key = (self.classifier)(&item);
        let slot = acc
            .entry(key)
            .or_insert_with(|| self.downstream.supply());
        // A downstream `Break` only means *that group* is saturated;
        // other groups may still be hungry, so grouping never breaks.
        let _ = self.downstream.accumulate(slot, item);
        ControlFlow::Continue(())
    }

    fn combine(&self, mut left: Self::Accum, right: Self::Accum) -> Self::Accum {
        for (key, r_acc) in right {
            match left.remove(&key) {
                Some(l_acc) => {
                    let merged = self.downstream.combine(l_acc, r_acc);
                    left.insert(key, merged);
                }
                None => {
                    left.insert(key, r_acc);
                }
            }
        }
        left
    }

    fn finish(&self, acc: Self::Accum) -> Self::Output {
        acc.into_iter()
            .map(|(key, group)| (key, self.downstream.finish(group)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::Count;

    #[test]
    fn groups_preserve_arrival_order_within_a_key() {
        let c = GroupBy::new(|x: &i32| x % 2);
        let mut acc = c.supply();
        for x in [1, 2, 3, 4, 5] {
            let _ = c.accumulate(&mut acc, x);
        }
        let groups = c.finish(acc);
        assert_eq!(groups[&1], [1, 3, 5]);
        assert_eq!(groups[&0], [2, 4]);
    }

    #[test]
    fn downstream_count_per_group() {
        let c = GroupBy::with_downstream(|s: &&str| s.len(), Count::new());
        let mut acc = c.supply();
        for s in ["a", "bb", "cc", "d"] {
            let _ = c.accumulate(&mut acc, s);
        }
        let counts = c.finish(acc);
        assert_eq!(counts[&1], 2);
        assert_eq!(counts[&2], 2);
    }

    #[test]
    fn combine_merges_groups_with_the_downstream() {
        let c = GroupBy::with_downstream(|x: &i32| x % 2, Count::new());
        let mut left = c.supply();
        let mut right = c.supply();
        for x in [1, 2, 3] {
            let _ = c.accumulate(&mut left, x);
        }
        for x in [4, 5, 6] {
            let _ = c.accumulate(&mut right, x);
        }
        let counts = c.finish(c.combine(left, right));
        assert_eq!(counts[&1], 3);
        assert_eq!(counts[&0], 3);
    }
}
