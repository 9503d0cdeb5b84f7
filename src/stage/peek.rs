use std::sync::Arc;

use crate::engine::trace;
use crate::error::{PipelineError, StageKind};
use crate::stage::{Cursor, Drive, SendCursor};

/// Runs a side-effecting action on each element without changing it.
///
/// The action only sees elements that actually reach this stage, so
/// short-circuiting terminals and `limit` keep it from running on the
/// rest. Elements are handed to the action by shared reference: mutating
/// shared state from here is the caller's business, mutating the element
/// itself is impossible.
pub(crate) struct Peek<T> {
    upstream: Arc<dyn Drive<T>>,
    action: Arc<dyn Fn(&T) + Send + Sync>,
}

impl<T> Peek<T> {
    pub(crate) fn new(
        upstream: Arc<dyn Drive<T>>,
        action: impl Fn(&T) + Send + Sync + 'static,
    ) -> Self {
        Self {
            upstream,
            action: Arc::new(action),
        }
    }
}

fn apply<'a, T: 'static>(
    cursor: impl Iterator<Item = T> + 'a,
    action: Arc<dyn Fn(&T) + Send + Sync>,
) -> impl Iterator<Item = T> + 'a {
    cursor.inspect(move |item| {
        trace::enter(StageKind::Peek);
        action(item)
    })
}

impl<T: Send + 'static> Drive<T> for Peek<T> {
    fn cursor(&self) -> Result<Cursor<'_, T>, PipelineError> {
        Ok(Box::new(apply(
            self.upstream.cursor()?,
            Arc::clone(&self.action),
        )))
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
                    Box::new(apply(chunk, Arc::clone(&self.action))) as SendCursor<'_, T>
                })
                .collect(),
        ))
    }

    fn bounded(&self) -> bool {
        self.upstream.bounded()
    }
}
