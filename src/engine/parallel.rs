//! Partitioned execution on a scoped worker pool.

use std::cell::Cell;
use std::num::NonZeroUsize;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use crate::collector::Collector;
use crate::engine::{CancelToken, processing_error, sequential, trace};
use crate::error::{PipelineError, StageKind};
use crate::stage::{Drive, SendCursor};

/// What a worker brought back from its chunk.
enum WorkerOutcome<A> {
    Finished(A),
    Cancelled,
    /// Stopped because a sibling failed and raised the abort flag.
    Aborted,
    Failed(PipelineError),
}

/// Partitions the source into contiguous chunks and drives the full stage
/// chain per chunk on its own worker, then merges the partial
/// accumulators left to right in chunk-index order.
///
/// Chains that cannot be partitioned (stateful stage, single-pass source)
/// run as one sequential pass instead; the final aggregate is the same
/// either way for a well-behaved collector.
pub(crate) fn run<T, C>(
    drive: &dyn Drive<T>,
    collector: &C,
    workers: Option<NonZeroUsize>,
    cancel: &CancelToken,
) -> Result<C::Output, PipelineError>
where
    T: Send + 'static,
    C: Collector<T>,
{
    let workers = workers
        .unwrap_or_else(|| thread::available_parallelism().unwrap_or(NonZeroUsize::MIN));

    let chunks = match drive.chunk_cursors(workers.get())? {
        Some(chunks) => chunks,
        None => {
            tracing::debug!(
                workers = workers.get(),
                "chain cannot be partitioned; running a single sequential pass"
            );
            return sequential::run(drive, collector, cancel);
        }
    };
    tracing::debug!(
        workers = workers.get(),
        partitions = chunks.len(),
        "dispatching parallel run"
    );

    let abort = AtomicBool::new(false);
    let abort = &abort;
    let outcomes: Vec<WorkerOutcome<C::Accum>> = thread::scope(|scope| {
        let handles: Vec<_> = chunks
            .into_iter()
            .map(|chunk| scope.spawn(move || drive_chunk(chunk, collector, cancel, abort)))
            .collect();
        // Joining in spawn order keeps the merge deterministic.
        handles
            .into_iter()
            .map(|handle| {
                handle
                    .join()
                    .unwrap_or_else(|payload| WorkerOutcome::Failed(processing_error(0, payload)))
            })
            .collect()
    });

    let mut partials = Vec::with_capacity(outcomes.len());
    let mut cancelled = false;
    for outcome in outcomes {
        match outcome {
            WorkerOutcome::Finished(acc) => partials.push(acc),
            WorkerOutcome::Cancelled => cancelled = true,
            WorkerOutcome::Aborted => {}
            // First failure in chunk order wins; siblings were told to stop.
            WorkerOutcome::Failed(err) => return Err(err),
        }
    }
    if cancelled {
        return Err(PipelineError::Cancelled);
    }

    let merged = partials
        .into_iter()
        .reduce(|left, right| collector.combine(left, right))
        .unwrap_or_else(|| collector.supply());
    Ok(collector.finish(merged))
}

fn drive_chunk<T, C>(
    cursor: SendCursor<'_, T>,
    collector: &C,
    cancel: &CancelToken,
    abort: &AtomicBool,
) -> WorkerOutcome<C::Accum>
where
    C: Collector<T>,
{
    enum Interrupted {
        Cancel,
        Abort,
    }

    trace::reset();
    let processed = Cell::new(0_usize);

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        let mut acc = collector.supply();
        for item in cursor {
            if cancel.is_cancelled() {
                return Err(Interrupted::Cancel);
            }
            if abort.load(Ordering::Relaxed) {
                return Err(Interrupted::Abort);
            }
            processed.set(processed.get() + 1);
            trace::enter(StageKind::Terminal);
            if collector.accumulate(&mut acc, item).is_break() {
                break;
            }
        }
        Ok(acc)
    }));

    match outcome {
        Ok(Ok(acc)) => WorkerOutcome::Finished(acc),
        Ok(Err(Interrupted::Cancel)) => WorkerOutcome::Cancelled,
        Ok(Err(Interrupted::Abort)) => WorkerOutcome::Aborted,
        Err(payload) => {
            // Tell the siblings to stop before reporting.
            abort.store(true, Ordering::Relaxed);
            WorkerOutcome::Failed(processing_error(processed.get(), payload))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::{Count, ToList};
    use crate::source::CollectionSource;
    use crate::stage::{Filter, Map};
    use std::sync::Arc;

    fn nz(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    #[test]
    fn merges_chunks_in_source_order() {
        let source = CollectionSource::new((0..100).collect());
        for workers in 1..=8 {
            let out = run(
                &source,
                &ToList::new(),
                Some(nz(workers)),
                &CancelToken::new(),
            )
            .unwrap();
            assert_eq!(out, (0..100).collect::<Vec<_>>(), "workers = {workers}");
        }
    }

    #[test]
    fn more_workers_than_elements() {
        let source = CollectionSource::new(vec![1, 2, 3]);
        let out = run(&source, &Count::new(), Some(nz(16)), &CancelToken::new()).unwrap();
        assert_eq!(out, 3);
    }

    #[test]
    fn empty_source_produces_the_empty_accumulator() {
        let source = CollectionSource::new(Vec::<i32>::new());
        let out = run(&source, &ToList::new(), Some(nz(4)), &CancelToken::new()).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn worker_panic_surfaces_one_processing_error() {
        let exploding = Map::new(
            Arc::new(CollectionSource::new((0..1000).collect())),
            |x: i32| {
                if x == 777 {
                    panic!("element 777 is cursed");
                }
                x
            },
        );

        let err = run(&exploding, &ToList::new(), Some(nz(4)), &CancelToken::new()).unwrap_err();
        match err {
            PipelineError::ElementProcessing { stage, detail, .. } => {
                assert_eq!(stage, StageKind::Map);
                assert!(detail.contains("cursed"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn cancellation_beats_completion() {
        let token = CancelToken::new();
        token.cancel();
        let source = CollectionSource::new((0..1000).collect::<Vec<i32>>());
        let err = run(&source, &Count::new(), Some(nz(4)), &token).unwrap_err();
        assert_eq!(err, PipelineError::Cancelled);
    }

    #[test]
    fn stateless_chain_is_partitioned_not_serialized() {
        // A filter+map chain over a collection source must report chunks.
        let chain = Map::new(
            Arc::new(Filter::new(
                Arc::new(CollectionSource::new((0..64).collect())),
                |x: &i32| x % 2 == 0,
            )),
            |x: i32| x * x,
        );
        assert!(chain.chunk_cursors(4).unwrap().is_some());

        let out = run(&chain, &ToList::new(), Some(nz(4)), &CancelToken::new()).unwrap();
        let expected: Vec<i32> = (0..64).filter(|x| x % 2 == 0).map(|x| x * x).collect();
        assert_eq!(out, expected);
    }
}
