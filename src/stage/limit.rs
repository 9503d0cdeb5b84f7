use std::sync::Arc;

use crate::error::PipelineError;
use crate::stage::{Cursor, Drive, SendCursor};

/// Emits at most `n` elements, then stops pulling from the upstream.
///
/// `limit(0)` never pulls at all. Because the cut happens on the pull
/// side, upstream stages do no work for elements past the cut.
pub(crate) struct Limit<T> {
    upstream: Arc<dyn Drive<T>>,
    n: usize,
}

impl<T> Limit<T> {
    pub(crate) fn new(upstream: Arc<dyn Drive<T>>, n: usize) -> Self {
        Self { upstream, n }
    }
}

impl<T: Send + 'static> Drive<T> for Limit<T> {
    fn cursor(&self) -> Result<Cursor<'_, T>, PipelineError> {
        Ok(Box::new(self.upstream.cursor()?.take(self.n)))
    }

    fn chunk_cursors(
        &self,
        _chunks: usize,
    ) -> Result<Option<Vec<SendCursor<'_, T>>>, PipelineError> {
        // The cut counts across the whole sequence, not per chunk.
        Ok(None)
    }

    fn bounded(&self) -> bool {
        // A limit bounds any upstream, including infinite generators.
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::CollectionSource;

    #[test]
    fn limit_zero_pulls_nothing() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        let pulls = Arc::new(AtomicUsize::new(0));
        let counted = {
            let pulls = Arc::clone(&pulls);
            crate::stage::Peek::new(
                Arc::new(CollectionSource::new(vec![1, 2, 3])),
                move |_: &i32| {
                    pulls.fetch_add(1, Ordering::Relaxed);
                },
            )
        };
        let limited = Limit::new(Arc::new(counted), 0);

        let collected: Vec<i32> = limited.cursor().unwrap().collect();
        assert!(collected.is_empty());
        assert_eq!(pulls.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn limit_caps_at_sequence_length() {
        let limited = Limit::new(Arc::new(CollectionSource::new(vec![1, 2])), 10);
        let collected: Vec<i32> = limited.cursor().unwrap().collect();
        assert_eq!(collected, [1, 2]);
    }
}
