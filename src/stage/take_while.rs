use std::sync::Arc;

use crate::engine::trace;
use crate::error::{PipelineError, StageKind};
use crate::stage::{Cursor, Drive, SendCursor};

/// Emits elements until the predicate first fails, then stops pulling.
///
/// This is the predicate-based termination for generator sources. The
/// chain counts as bounded once it carries a `take_while`; a predicate
/// that never fails over an infinite source is the caller's bug, exactly
/// as it would be in a hand-written loop.
pub(crate) struct TakeWhile<T> {
    upstream: Arc<dyn Drive<T>>,
    pred: Arc<dyn Fn(&T) -> bool + Send + Sync>,
}

impl<T> TakeWhile<T> {
    pub(crate) fn new(
        upstream: Arc<dyn Drive<T>>,
        pred: impl Fn(&T) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self {
            upstream,
            pred: Arc::new(pred),
        }
    }
}

impl<T: Send + 'static> Drive<T> for TakeWhile<T> {
    fn cursor(&self) -> Result<Cursor<'_, T>, PipelineError> {
        let pred = Arc::clone(&self.pred);
        Ok(Box::new(self.upstream.cursor()?.take_while(move |item| {
            trace::enter(StageKind::TakeWhile);
            pred(item)
        })))
    }

    fn chunk_cursors(
        &self,
        _chunks: usize,
    ) -> Result<Option<Vec<SendCursor<'_, T>>>, PipelineError> {
        // The cut point depends on sequence order across chunk borders.
        Ok(None)
    }

    fn bounded(&self) -> bool {
        true
    }
}
