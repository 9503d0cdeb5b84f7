use std::sync::Arc;

use crate::engine::trace;
use crate::error::{PipelineError, StageKind};
use crate::stage::{Cursor, Drive, SendCursor};

/// One-to-many expansion: each element becomes a sub-sequence, spliced
/// into the output in order.
///
/// The user function's iterator is erased at construction time so the
/// stage itself stays object-safe.
pub(crate) struct FlatMap<U, T> {
    upstream: Arc<dyn Drive<U>>,
    f: Arc<dyn Fn(U) -> Box<dyn Iterator<Item = T> + Send> + Send + Sync>,
}

impl<U, T> FlatMap<U, T> {
    pub(crate) fn new<I>(
        upstream: Arc<dyn Drive<U>>,
        f: impl Fn(U) -> I + Send + Sync + 'static,
    ) -> Self
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: Send + 'static,
    {
        Self {
            upstream,
            f: Arc::new(move |item| {
                Box::new(f(item).into_iter()) as Box<dyn Iterator<Item = T> + Send>
            }),
        }
    }
}

fn apply<'a, U: 'static, T: 'static>(
    cursor: impl Iterator<Item = U> + 'a,
    f: Arc<dyn Fn(U) -> Box<dyn Iterator<Item = T> + Send> + Send + Sync>,
) -> impl Iterator<Item = T> + 'a {
    cursor.flat_map(move |item| {
        trace::enter(StageKind::FlatMap);
        f(item)
    })
}

impl<U, T> Drive<T> for FlatMap<U, T>
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
