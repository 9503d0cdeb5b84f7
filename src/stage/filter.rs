use std::sync::Arc;

use crate::engine::trace;
use crate::error::{PipelineError, StageKind};
use crate::stage::{Cursor, Drive, SendCursor};

/// Keeps only elements the predicate accepts.
///
/// Stateless: a chunked run applies the predicate independently per chunk.
pub(crate) struct Filter<T> {
    upstream: Arc<dyn Drive<T>>,
    pred: Arc<dyn Fn(&T) -> bool + Send + Sync>,
}

impl<T> Filter<T> {
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

fn apply<'a, T: 'static>(
    cursor: impl Iterator<Item = T> + 'a,
    pred: Arc<dyn Fn(&T) -> bool + Send + Sync>,
) -> impl Iterator<Item = T> + 'a {
    cursor.filter(move |item| {
        trace::enter(StageKind::Filter);
        pred(item)
    })
}

impl<T: Send + 'static> Drive<T> for Filter<T> {
    fn cursor(&self) -> Result<Cursor<'_, T>, PipelineError> {
        Ok(Box::new(apply(self.upstream.cursor()?, Arc::clone(&self.pred))))
    }

    fn chunk_cursors(
        &self,
        chunks: usize,
    ) -> Result<Option<Vec<SendCursor<'_, T>>>, PipelineError> {
        let Some(chunks) = self.upstream.chunk_cursors(chunks)? else {
            return Ok(None);
        };
        Ok(Some(
            chunks
                .into_iter()
                .map(|chunk| {
                    Box::new(apply(chunk, Arc::clone(&self.pred))) as SendCursor<'_, T>
                })
                .collect(),
        ))
    }

    fn bounded(&self) -> bool {
        self.upstream.bounded()
    }
}
