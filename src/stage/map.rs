use std::sync::Arc;

use crate::engine::trace;
use crate::error::{PipelineError, StageKind};
use crate::stage::{Cursor, Drive, SendCursor};

/// Transforms each element with a pure function.
pub(crate) struct Map<U, T> {
    upstream: Arc<dyn Drive<U>>,
    f: Arc<dyn Fn(U) -> T + Send + Sync>,
}

impl<U, T> Map<U, T> {
    pub(crate) fn new(
        upstream: Arc<dyn Drive<U>>,
        f: impl Fn(U) -> T + Send + Sync + 'static,
    ) -> Self {
        Self {
            upstream,
            f: Arc::new(f),
        }
    }
}

fn apply<'a, U: 'static, T: 'static>(
    cursor: impl Iterator<Item = U> + 'a,
    f: Arc<dyn Fn(U) -> T + Send + Sync>,
) -> impl Iterator<Item = T> + 'a {
    cursor.map(move |item| {
        trace::enter(StageKind::Map);
        f(item)
    })
}

impl<U, T> Drive<T> for Map<U, T>
where
    U: Send + 'static,
    T: Send + 'static,
{
    fn cursor(&self) -> Result<Cursor<'_, T>, PipelineError> {
        Ok(Box::new(apply(self.upstream.cursor()?, Arc::clone(&self.f))))
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
                .map(|chunk| Box::new(apply(chunk, Arc::clone(&self.f))) as SendCursor<'_, T>)
                .collect(),
        ))
    }

    fn bounded(&self) -> bool {
        self.upstream.bounded()
    }
}
