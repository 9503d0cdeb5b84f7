use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::marker::PhantomData;
use std::ops::ControlFlow;

use crate::collector::Collector;
use crate::error::PipelineError;

/// A [`Collector`] that builds a `HashMap` from key/value projections of
/// each element.
///
/// Seeing a key twice is an error: the output is
/// `Err(PipelineError::DuplicateKey)`. Use [`ToMapMerge`] to resolve
/// collisions with a merge function instead.
///
/// This is the collector behind [`Pipeline::to_map`](crate::Pipeline::to_map).
pub struct ToMap<K, V, F, G> {
    key_fn: F,
    val_fn: G,
    _marker: PhantomData<fn() -> (K, V)>,
}

impl<K, V, F, G> ToMap<K, V, F, G> {
    /// Creates a new instance of this collector.
    pub const fn new<T>(key_fn: F, val_fn: G) -> Self
    where
        F: Fn(&T) -> K,
        G: Fn(T) -> V,
    {
        Self {
            key_fn,
            val_fn,
            _marker: PhantomData,
        }
    }
}

impl<T, K, V, F, G> Collector<T> for ToMap<K, V, F, G>
where
    K: Eq + Hash + Debug + Send,
    V: Send,
    F: Fn(&T) -> K + Send + Sync,
    G: Fn(T) -> V + Send + Sync,
{
    // The error swallows the map; nothing can un-fail a duplicate key.
    type Accum = Result<HashMap<K, V>, PipelineError>;
    type Output = Result<HashMap<K, V>, PipelineError>;

    fn supply(&self) -> Self::Accum {
        Ok(HashMap::new())
    }

    fn accumulate(&self, acc: &mut Self::Accum, item: T) -> ControlFlow<()> {
        let Ok(map) = acc else {
            return ControlFlow::Break(());
        };
        let key = (self.key_fn)(&item);
        if map.contains_key(&key) {
            *acc = Err(PipelineError::DuplicateKey {
                key: format!("{key:?}"),
            });
            return ControlFlow::Break(());
        }
        map.insert(key, (self.val_fn)(item));
        ControlFlow::Continue(())
    }

    fn combine(&self, left: Self::Accum, right: Self::Accum) -> Self::Accum {
        let (mut left, right) = match (left, right) {
            (Ok(l), Ok(r)) => (l, r),
            // The earlier partition's failure wins.
            (Err(e), _) | (_, Err(e)) => return Err(e),
        };
        for (key, value) in right {
            if left.contains_key(&key) {
                return Err(PipelineError::DuplicateKey {
                    key: format!("{key:?}"),
                });
            }
            left.insert(key, value);
        }
        Ok(left)
    }

    fn finish(&self, acc: Self::Accum) -> Self::Output {
        acc
    }
}

/// [`ToMap`] with an explicit collision policy: when a key repeats, the
/// merge function folds the old and new values into one.
pub struct ToMapMerge<K, V, F, G, M> {
    key_fn: F,
    val_fn: G,
    merge: M,
    _marker: PhantomData<fn() -> (K, V)>,
}

impl<K, V, F, G, M> ToMapMerge<K, V, F, G, M> {
    /// Creates a new instance of this collector.
    pub const fn new<T>(key_fn: F, val_fn: G, merge: M) -> Self
    where
        F: Fn(&T) -> K,
        G: Fn(T) -> V,
        M: Fn(V, V) -> V,
    {
        Self {
            key_fn,
            val_fn,
            merge,
            _marker: PhantomData,
        }
    }
}

impl<T, K, V, F, G, M> Collector<T> for ToMapMerge<K, V, F, G, M>
where
    K: Eq + Hash + Send,
    V: Send,
    F: Fn(&T) -> K + Send + Sync,
    G: Fn(T) -> V + Send + Sync,
    M: Fn(V, V) -> V + Send + Sync,
{
    type Accum = HashMap<K, V>;
    type Output = HashMap<K, V>;

    fn supply(&self) -> Self::Accum {
        HashMap::new()
    }

    fn accumulate(&self, acc: &mut Self::Accum, item: T) -> ControlFlow<()> {
        let key = (self.key_fn)(&item);
        let value = (self.val_fn)(item);
        let merged = match acc.remove(&key) {
            Some(old) => (self.merge)(old, value),
            None => value,
        };
        acc.insert(key, merged);
        ControlFlow::Continue(())
    }

    fn combine(&self, mut left: Self::Accum, right: Self::Accum) -> Self::Accum {
        for (key, value) in right {
            let merged = match left.remove(&key) {
                Some(old) => (self.merge)(old, value),
                None => value,
            };
            left.insert(key, merged);
        }
        left
    }

    fn finish(&self, acc: Self::Accum) -> Self::Output {
        acc
    }
}
