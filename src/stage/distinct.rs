use std::collections::HashSet;
use std::hash::Hash;
use std::sync::Arc;

use crate::engine::trace;
use crate::error::{PipelineError, StageKind};
use crate::stage::{Cursor, Drive, SendCursor};

/// Drops repeated elements, keeping the first occurrence of each.
///
/// Uses the element's own `Eq + Hash` identity. The seen-set is local to
/// each cursor, so a restartable source deduplicates afresh per run.
pub(crate) struct Distinct<T> {
    upstream: Arc<dyn Drive<T>>,
}

impl<T> Distinct<T> {
    pub(crate) fn new(upstream: Arc<dyn Drive<T>>) -> Self {
        Self { upstream }
    }
}

impl<T> Drive<T> for Distinct<T>
where
    T: Eq + Hash + Clone + Send + 'static,
{
    fn cursor(&self) -> Result<Cursor<'_, T>, PipelineError> {
        let mut seen = HashSet::new();
        Ok(Box::new(
            self.upstream
                .cursor()?
                .filter(move |item| seen.insert(item.clone())),
        ))
    }

    fn chunk_cursors(
        &self,
        _chunks: usize,
    ) -> Result<Option<Vec<SendCursor<'_, T>>>, PipelineError> {
        // First-seen-wins needs one seen-set over the whole sequence.
        Ok(None)
    }

    fn bounded(&self) -> bool {
        self.upstream.bounded()
    }
}

/// Like [`Distinct`], but with a caller-supplied identity: two elements
/// are duplicates when the key function maps them to the same key.
pub(crate) struct DistinctBy<T, K> {
    upstream: Arc<dyn Drive<T>>,
    key: Arc<dyn Fn(&T) -> K + Send + Sync>,
}

impl<T, K> DistinctBy<T, K> {
    pub(crate) fn new(
        upstream: Arc<dyn Drive<T>>,
        key: impl Fn(&T) -> K + Send + Sync + 'static,
    ) -> Self {
        Self {
            upstream,
            key: Arc::new(key),
        }
    }
}

impl<T, K> Drive<T> for DistinctBy<T, K>
where
    T: Send + 'static,
    K: Eq + Hash + 'static,
{
    fn cursor(&self) -> Result<Cursor<'_, T>, PipelineError> {
        let key = Arc::clone(&self.key);
        let mut seen = HashSet::new();
        Ok(Box::new(self.upstream.cursor()?.filter(move |item| {
            trace::enter(StageKind::Distinct);
            seen.insert(key(item))
        })))
    }

    fn chunk_cursors(
        &self,
        _chunks: usize,
    ) -> Result<Option<Vec<SendCursor<'_, T>>>, PipelineError> {
        Ok(None)
    }

    fn bounded(&self) -> bool {
        self.upstream.bounded()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::CollectionSource;

    #[test]
    fn keeps_first_seen_order() {
        let distinct = Distinct::new(Arc::new(CollectionSource::new(vec![3, 1, 3, 2, 1])));
        let out: Vec<i32> = distinct.cursor().unwrap().collect();
        assert_eq!(out, [3, 1, 2]);
    }

    #[test]
    fn by_key_deduplicates_on_the_projection() {
        let distinct = DistinctBy::new(
            Arc::new(CollectionSource::new(vec!["apple", "avocado", "banana"])),
            |s: &&str| s.chars().next(),
        );
        let out: Vec<&str> = distinct.cursor().unwrap().collect();
        assert_eq!(out, ["apple", "banana"]);
    }
}
