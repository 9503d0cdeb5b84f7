use std::cmp::Ordering;
use std::sync::Arc;

use crate::engine::trace;
use crate::error::{PipelineError, StageKind};
use crate::stage::{Cursor, Drive, SendCursor};

/// Barrier stage: drains the whole upstream, stable-sorts it, then
/// replays it in order.
///
/// Opening a cursor on an unbounded upstream would drain forever, so the
/// barrier checks boundedness itself. A downstream `limit` cannot rescue
/// an unbounded sort: the cut would come after the drain.
pub(crate) struct Sorted<T> {
    upstream: Arc<dyn Drive<T>>,
    cmp: Arc<dyn Fn(&T, &T) -> Ordering + Send + Sync>,
}

impl<T> Sorted<T> {
    pub(crate) fn new(
        upstream: Arc<dyn Drive<T>>,
        cmp: impl Fn(&T, &T) -> Ordering + Send + Sync + 'static,
    ) -> Self {
        Self {
            upstream,
            cmp: Arc::new(cmp),
        }
    }
}

impl<T: Send + 'static> Drive<T> for Sorted<T> {
    fn cursor(&self) -> Result<Cursor<'_, T>, PipelineError> {
        if !self.upstream.bounded() {
            return Err(PipelineError::UnboundedSequence);
        }
        let mut buffered: Vec<T> = self.upstream.cursor()?.collect();
        // `sort_by` is stable: ties keep their input order.
        buffered.sort_by(|a, b| {
            trace::enter(StageKind::Sorted);
            (self.cmp)(a, b)
        });
        Ok(Box::new(buffered.into_iter()))
    }

    fn chunk_cursors(
        &self,
        _chunks: usize,
    ) -> Result<Option<Vec<SendCursor<'_, T>>>, PipelineError> {
        // Sorting is a whole-sequence barrier.
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
    fn stable_on_ties() {
        // Sort by the first tuple field only; the second records input order.
        let items = vec![(2, 'a'), (1, 'b'), (2, 'c'), (1, 'd')];
        let sorted = Sorted::new(
            Arc::new(CollectionSource::new(items)),
            |a: &(i32, char), b: &(i32, char)| a.0.cmp(&b.0),
        );
        let out: Vec<(i32, char)> = sorted.cursor().unwrap().collect();
        assert_eq!(out, [(1, 'b'), (1, 'd'), (2, 'a'), (2, 'c')]);
    }
}
