use std::sync::Arc;

use crate::error::PipelineError;
use crate::stage::{Cursor, Drive, SendCursor};

/// Discards the first `n` elements, passes the rest through unchanged.
pub(crate) struct Skip<T> {
    upstream: Arc<dyn Drive<T>>,
    n: usize,
}

impl<T> Skip<T> {
    pub(crate) fn new(upstream: Arc<dyn Drive<T>>, n: usize) -> Self {
        Self { upstream, n }
    }
}

impl<T: Send + 'static> Drive<T> for Skip<T> {
    fn cursor(&self) -> Result<Cursor<'_, T>, PipelineError> {
        Ok(Box::new(self.upstream.cursor()?.skip(self.n)))
    }

    fn chunk_cursors(
        &self,
        _chunks: usize,
    ) -> Result<Option<Vec<SendCursor<'_, T>>>, PipelineError> {
        // The skip counts across the whole sequence, not per chunk.
        Ok(None)
    }

    fn bounded(&self) -> bool {
        // Skipping never turns an infinite sequence into a finite one.
        self.upstream.bounded()
    }
}
