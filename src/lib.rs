//! A lazily evaluated, optionally parallel collection pipeline.
//!
//! [`Iterator`] describes *how to produce* data; this crate adds the
//! other two pieces a declarative pipeline needs: a [`Collector`]
//! describing *how to consume* data, and an engine that can drive the
//! same pipeline either as a single pull pass or partitioned across a
//! worker pool — without changing the result.
//!
//! # Motivation
//!
//! Suppose we have a batch of student records and want the squares of
//! the even scores. With iterators:
//!
//! ```
//! let scores = [1, 2, 3, 4, 5, 6];
//! let squares: Vec<i32> = scores
//!     .iter()
//!     .filter(|x| *x % 2 == 0)
//!     .map(|x| x * x)
//!     .collect();
//!
//! assert_eq!(squares, [4, 16, 36]);
//! ```
//!
//! Perfectly fine — sequentially. But the moment the same declarative
//! chain has to run across several workers, plain iterator adaptors
//! stop composing: each worker needs its own pass over its own slice of
//! the input, its own partial accumulator, and a well-defined way to
//! merge partials at the end.
//!
//! This crate's [`Pipeline`] keeps the declarative chain and makes the
//! execution strategy a one-word decision:
//!
//! ```
//! use rill::Pipeline;
//!
//! let scores = [1, 2, 3, 4, 5, 6];
//!
//! let sequential = Pipeline::from(scores)
//!     .filter(|x| x % 2 == 0)
//!     .map(|x| x * x)
//!     .to_list()?;
//!
//! let parallel = Pipeline::from(scores)
//!     .filter(|x| x % 2 == 0)
//!     .map(|x| x * x)
//!     .parallel()
//!     .to_list()?;
//!
//! assert_eq!(sequential, [4, 16, 36]);
//! assert_eq!(sequential, parallel);
//! # Ok::<_, rill::PipelineError>(())
//! ```
//!
//! The piece that makes this work is the [`Collector`] contract: an
//! empty-accumulator supplier, a per-element accumulate step, an
//! associative combine step for merging partial results, and a finish
//! step. Every built-in terminal — [`to_list`](Pipeline::to_list),
//! [`group_by`](Pipeline::group_by), [`joining`](Pipeline::joining),
//! [`statistics`](Pipeline::statistics), ... — is such a collector, and
//! user-defined ones plug into [`collect`](Pipeline::collect) the same
//! way.
//!
//! # Laziness
//!
//! Stages are recorded, not run. Elements are pulled one at a time by
//! the terminal operation, so short-circuiting works end to end:
//!
//! ```
//! use rill::Pipeline;
//!
//! // An infinite source is fine as long as something bounds it.
//! let first_squares = Pipeline::iterate(1_u64, |n| n + 1)
//!     .map(|n| n * n)
//!     .limit(5)
//!     .to_list()?;
//! assert_eq!(first_squares, [1, 4, 9, 16, 25]);
//! # Ok::<_, rill::PipelineError>(())
//! ```
//!
//! Forgetting the bound is caught, not hung: the terminal returns
//! [`PipelineError::UnboundedSequence`].
//!
//! # Errors and cancellation
//!
//! Terminal operations return `Result`. Emptiness is never an error
//! (`min`/`max`/`average`/`find_first` yield `Ok(None)`); duplicate map
//! keys, consumed single-pass sources, unbounded sequences, panicking
//! user functions, and cancelled runs each surface a dedicated
//! [`PipelineError`] variant. A parallel run can be cancelled
//! cooperatively through a shared [`CancelToken`].

mod engine;
mod error;
mod pipeline;
mod source;
mod stage;

pub mod collector;
pub mod prelude;

pub use collector::Collector;
pub use engine::{CancelToken, ExecMode};
pub use error::{PipelineError, StageKind};
pub use pipeline::Pipeline;

#[cfg(test)]
mod tests {
    use crate::Pipeline;

    // The crate-level happy path, end to end.
    #[test]
    fn filter_map_reduce_round_trip() {
        let total = Pipeline::from([1, 2, 3, 4, 5, 6])
            .filter(|x| x % 2 == 0)
            .map(|x| x * x)
            .reduce(0, |a, b| a + b)
            .unwrap();
        assert_eq!(total, 4 + 16 + 36);
    }
}
