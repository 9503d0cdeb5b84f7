//! Single-threaded pull evaluation.

use std::cell::Cell;
use std::panic::{self, AssertUnwindSafe};

use crate::collector::Collector;
use crate::engine::{CancelToken, processing_error, trace};
use crate::error::{PipelineError, StageKind};
use crate::stage::Drive;

/// Pulls one element at a time through the whole chain into a single
/// accumulator. Stops early when the collector signals `Break` or the
/// token is cancelled. Panics from user functions are caught here and
/// wrapped with stage/position context.
pub(crate) fn run<T, C>(
    drive: &dyn Drive<T>,
    collector: &C,
    cancel: &CancelToken,
) -> Result<C::Output, PipelineError>
where
    T: Send + 'static,
    C: Collector<T>,
{
    // The count lives outside the unwind boundary so a panic mid-element
    // still reports how far the pass got.
    let processed = Cell::new(0_usize);
    trace::reset();

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        let cursor = drive.cursor()?;
        let mut acc = collector.supply();
        for item in cursor {
            if cancel.is_cancelled() {
                tracing::debug!(processed = processed.get(), "sequential run cancelled");
                return Err(PipelineError::Cancelled);
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
        Ok(Ok(acc)) => Ok(collector.finish(acc)),
        Ok(Err(err)) => Err(err),
        Err(payload) => Err(processing_error(processed.get(), payload)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::{AnyMatch, Count, ToList};
    use crate::source::CollectionSource;
    use crate::stage::Map;
    use std::sync::Arc;

    #[test]
    fn drains_into_the_collector() {
        let source = CollectionSource::new(vec![1, 2, 3]);
        let out = run(&source, &Count::new(), &CancelToken::new()).unwrap();
        assert_eq!(out, 3);
    }

    #[test]
    fn break_stops_the_pull() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        let pulled = Arc::new(AtomicUsize::new(0));
        let counted = {
            let pulled = Arc::clone(&pulled);
            Map::new(
                Arc::new(CollectionSource::new((1..=100).collect())),
                move |x: i32| {
                    pulled.fetch_add(1, Ordering::Relaxed);
                    x
                },
            )
        };

        let found = run(
            &counted,
            &AnyMatch::new(|x: &i32| *x == 3),
            &CancelToken::new(),
        )
        .unwrap();
        assert!(found);
        assert_eq!(pulled.load(Ordering::Relaxed), 3);
    }

    #[test]
    fn panic_in_user_function_is_wrapped() {
        let exploding = Map::new(
            Arc::new(CollectionSource::new(vec![1, 2, 3])),
            |x: i32| {
                if x == 2 {
                    panic!("bad element");
                }
                x
            },
        );

        let err = run(&exploding, &ToList::new(), &CancelToken::new()).unwrap_err();
        match err {
            PipelineError::ElementProcessing {
                stage,
                processed,
                detail,
            } => {
                assert_eq!(stage, StageKind::Map);
                assert_eq!(processed, 1);
                assert!(detail.contains("bad element"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn pre_cancelled_token_short_circuits() {
        let token = CancelToken::new();
        token.cancel();
        let source = CollectionSource::new(vec![1, 2, 3]);
        let err = run(&source, &Count::new(), &token).unwrap_err();
        assert_eq!(err, PipelineError::Cancelled);
    }
}
