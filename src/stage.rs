//! Lazy intermediate stages.
//!
//! Every stage wraps its upstream behind the [`Drive`] abstraction and is
//! itself a [`Drive`], so a chain of stages is a linked list of trait
//! objects ending in a source. Nothing runs until a terminal operation
//! opens a cursor; each cursor pulls one element at a time through the
//! whole chain.

mod distinct;
mod filter;
mod flat_map;
mod limit;
mod map;
mod peek;
mod skip;
mod sorted;
mod take_while;

pub(crate) use distinct::{Distinct, DistinctBy};
pub(crate) use filter::Filter;
pub(crate) use flat_map::FlatMap;
pub(crate) use limit::Limit;
pub(crate) use map::Map;
pub(crate) use peek::Peek;
pub(crate) use skip::Skip;
pub(crate) use sorted::Sorted;
pub(crate) use take_while::TakeWhile;

use crate::error::PipelineError;

/// A pull cursor over the sequence as seen at some point of the chain.
pub(crate) type Cursor<'a, T> = Box<dyn Iterator<Item = T> + 'a>;

/// A cursor that can be handed to a worker thread.
pub(crate) type SendCursor<'a, T> = Box<dyn Iterator<Item = T> + Send + 'a>;

/// One point of a stage chain: a source, or a stage wrapping an upstream.
///
/// `cursor` opens a fresh sequential pass. `chunk_cursors` opens one pass
/// per contiguous source chunk so that workers can traverse independently;
/// a stage whose semantics need the whole sequence (sort, distinct, limit,
/// skip, take_while) answers `None`, which makes the engine fall back to a
/// single sequential pass.
pub(crate) trait Drive<T>: Send + Sync {
    fn cursor(&self) -> Result<Cursor<'_, T>, PipelineError>;

    fn chunk_cursors(
        &self,
        chunks: usize,
    ) -> Result<Option<Vec<SendCursor<'_, T>>>, PipelineError>;

    /// Whether a terminal operation over this chain can complete.
    fn bounded(&self) -> bool;
}
