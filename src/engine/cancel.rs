use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// A shared flag for cooperatively cancelling a running pipeline.
///
/// Clone the token, hand one clone to the pipeline via
/// [`cancel_with`](crate::Pipeline::cancel_with), keep the other, and call
/// [`cancel`](CancelToken::cancel) from anywhere. Workers check the flag
/// between element-processing steps; a cancelled run surfaces
/// [`PipelineError::Cancelled`](crate::PipelineError::Cancelled) instead
/// of a partial result.
///
/// # Examples
///
/// ```
/// use rill::{CancelToken, Pipeline, PipelineError};
///
/// let token = CancelToken::new();
/// token.cancel();
///
/// let result = Pipeline::from(1..=100)
///     .cancel_with(&token)
///     .parallel()
///     .sum();
/// assert_eq!(result, Err(PipelineError::Cancelled));
/// ```
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// Creates a fresh, un-cancelled token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation. Idempotent; already-finished runs are
    /// unaffected.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}
