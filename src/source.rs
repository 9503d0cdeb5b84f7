//! Sequence sources: the producing end of a pipeline.

use std::sync::{Arc, Mutex, PoisonError};

use crate::error::PipelineError;
use crate::stage::{Cursor, Drive, SendCursor};

/// A finite, materialized source backed by a shared `Vec`.
///
/// Restartable: every cursor re-derives from the original collection, so
/// several pipelines cloned from the same builder can each be driven.
/// Chunking hands each worker a contiguous slice of the collection.
pub(crate) struct CollectionSource<T> {
    items: Arc<Vec<T>>,
}

impl<T> CollectionSource<T> {
    pub(crate) fn new(items: Vec<T>) -> Self {
        Self {
            items: Arc::new(items),
        }
    }
}

impl<T> Drive<T> for CollectionSource<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn cursor(&self) -> Result<Cursor<'_, T>, PipelineError> {
        Ok(Box::new(self.items.iter().cloned()))
    }

    fn chunk_cursors(
        &self,
        chunks: usize,
    ) -> Result<Option<Vec<SendCursor<'_, T>>>, PipelineError> {
        // Ceil division keeps the chunk count at or below the requested
        // worker count while still covering every element.
        let per_chunk = self.items.len().div_ceil(chunks.max(1)).max(1);
        Ok(Some(
            self.items
                .chunks(per_chunk)
                .map(|chunk| Box::new(chunk.iter().cloned()) as SendCursor<'_, T>)
                .collect(),
        ))
    }

    fn bounded(&self) -> bool {
        true
    }
}

/// A single-pass source backed by a generator iterator.
///
/// The iterator is taken out of the slot by the first terminal run; a
/// second run finds the slot empty and fails with a descriptive error
/// instead of hanging or silently yielding nothing.
pub(crate) struct GeneratorSource<T> {
    cursor: Mutex<Option<Box<dyn Iterator<Item = T> + Send>>>,
}

impl<T> GeneratorSource<T> {
    pub(crate) fn new(iter: impl Iterator<Item = T> + Send + 'static) -> Self {
        Self {
            cursor: Mutex::new(Some(Box::new(iter))),
        }
    }
}

impl<T: Send + 'static> Drive<T> for GeneratorSource<T> {
    fn cursor(&self) -> Result<Cursor<'_, T>, PipelineError> {
        let taken = self
            .cursor
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .ok_or(PipelineError::SourceConsumed)?;
        Ok(taken)
    }

    fn chunk_cursors(
        &self,
        _chunks: usize,
    ) -> Result<Option<Vec<SendCursor<'_, T>>>, PipelineError> {
        // A single-pass stream has no random access to partition over.
        Ok(None)
    }

    fn bounded(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collection_cursor_is_restartable() {
        let source = CollectionSource::new(vec![1, 2, 3]);
        let first: Vec<i32> = source.cursor().unwrap().collect();
        let second: Vec<i32> = source.cursor().unwrap().collect();
        assert_eq!(first, [1, 2, 3]);
        assert_eq!(second, [1, 2, 3]);
    }

    #[test]
    fn collection_chunks_cover_everything_in_order() {
        let source = CollectionSource::new((0..10).collect());
        let chunks = source.chunk_cursors(3).unwrap().unwrap();
        assert!(chunks.len() <= 3);
        let rejoined: Vec<i32> = chunks.into_iter().flatten().collect();
        assert_eq!(rejoined, (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn empty_collection_yields_no_chunks() {
        let source = CollectionSource::new(Vec::<i32>::new());
        let chunks = source.chunk_cursors(4).unwrap().unwrap();
        assert!(chunks.is_empty());
    }

    #[test]
    fn generator_is_single_pass() {
        let source = GeneratorSource::new(0..3);
        let first: Vec<i32> = source.cursor().unwrap().collect();
        assert_eq!(first, [0, 1, 2]);
        assert!(matches!(
            source.cursor().map(|_| ()),
            Err(PipelineError::SourceConsumed)
        ));
    }
}
