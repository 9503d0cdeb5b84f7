//! The execution engine: drives a stage chain into a collector.
//!
//! A terminal operation hands the engine three things: the tip of the
//! stage chain (a [`Drive`]), a [`Collector`], and a run configuration
//! (mode + cancellation token). The engine decides between a single
//! sequential pull pass and a partitioned parallel run, and owns the
//! error boundary around user-supplied functions.

mod cancel;
mod parallel;
mod sequential;
pub(crate) mod trace;

use std::any::Any;
use std::num::NonZeroUsize;

pub use cancel::CancelToken;

use crate::collector::Collector;
use crate::error::{PipelineError, StageKind};
use crate::stage::Drive;

/// How a terminal operation traverses the sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecMode {
    /// One pull pass on the calling thread. Input order is preserved end
    /// to end, except where a `sorted` stage redefines it.
    #[default]
    Sequential,
    /// Partition the source into contiguous chunks, one scoped worker
    /// per chunk, then merge the partial accumulators left to right in
    /// chunk order. `None` workers means hardware parallelism.
    Parallel { workers: Option<NonZeroUsize> },
}

pub(crate) fn run<T, C>(
    drive: &dyn Drive<T>,
    collector: &C,
    mode: ExecMode,
    cancel: &CancelToken,
) -> Result<C::Output, PipelineError>
where
    T: Send + 'static,
    C: Collector<T>,
{
    if !drive.bounded() {
        return Err(PipelineError::UnboundedSequence);
    }
    match mode {
        ExecMode::Sequential => sequential::run(drive, collector, cancel),
        ExecMode::Parallel { workers } => parallel::run(drive, collector, workers, cancel),
    }
}

/// Wraps a caught panic payload with the stage marker and progress count
/// recorded by the failing pass.
pub(crate) fn processing_error(
    processed: usize,
    payload: Box<dyn Any + Send>,
) -> PipelineError {
    let detail = payload
        .downcast_ref::<&str>()
        .map(ToString::to_string)
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "non-string panic payload".to_owned());
    PipelineError::ElementProcessing {
        stage: trace::last().unwrap_or(StageKind::Terminal),
        processed,
        detail,
    }
}
