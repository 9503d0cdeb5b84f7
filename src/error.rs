use std::fmt;

use thiserror::Error;

/// Identifies the point of a pipeline where a user-supplied function ran.
///
/// Carried by [`PipelineError::ElementProcessing`] so that a panicking
/// closure can be attributed to the stage that invoked it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageKind {
    /// A generator closure (`iterate`/`generate`).
    Source,
    Filter,
    Map,
    FlatMap,
    Sorted,
    Distinct,
    Limit,
    Skip,
    Peek,
    TakeWhile,
    /// A function owned by the terminal collector (reducer, classifier, ...).
    Terminal,
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Source => "source",
            Self::Filter => "filter",
            Self::Map => "map",
            Self::FlatMap => "flat_map",
            Self::Sorted => "sorted",
            Self::Distinct => "distinct",
            Self::Limit => "limit",
            Self::Skip => "skip",
            Self::Peek => "peek",
            Self::TakeWhile => "take_while",
            Self::Terminal => "terminal",
        };
        f.write_str(name)
    }
}

/// The error type returned by every terminal operation of a
/// [`Pipeline`](crate::Pipeline).
///
/// Empty-sequence outcomes (`min`, `max`, `reduce_with`, `find_first`,
/// `average` on nothing) are not errors; those operations signal emptiness
/// with `Ok(None)` instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum PipelineError {
    /// A terminal operation was invoked on an unbounded generator chain.
    ///
    /// Generator sources never end on their own; a `limit` or `take_while`
    /// stage must bound them before anything tries to drain the sequence.
    #[error("terminal operation on an unbounded source; bound it with `limit` or `take_while`")]
    UnboundedSequence,

    /// A single-pass generator source was driven a second time.
    ///
    /// Collection sources are restartable; generator sources are consumed
    /// by their first terminal operation.
    #[error("generator source was already consumed by an earlier terminal operation")]
    SourceConsumed,

    /// `to_map` saw the same key twice and no merge function was supplied.
    #[error("duplicate key {key} collected into a map without a merge function")]
    DuplicateKey {
        /// The offending key, captured via its `Debug` rendering.
        key: String,
    },

    /// A user-supplied function panicked while the sequence was being
    /// drained. The panic is caught at the run boundary and wrapped with
    /// the stage it was invoked from and how far the failing pass had
    /// progressed.
    #[error("user function panicked in the `{stage}` stage after {processed} elements: {detail}")]
    ElementProcessing {
        stage: StageKind,
        /// Elements the failing pass had already handed to the collector.
        processed: usize,
        /// The panic payload, when it was a string.
        detail: String,
    },

    /// A cooperative cancellation request was observed mid-run.
    #[error("pipeline run was cancelled")]
    Cancelled,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_stage_and_position() {
        let err = PipelineError::ElementProcessing {
            stage: StageKind::Map,
            processed: 3,
            detail: "boom".to_owned(),
        };
        let msg = err.to_string();
        assert!(msg.contains("`map` stage"), "{msg}");
        assert!(msg.contains("after 3 elements"), "{msg}");
        assert!(msg.contains("boom"), "{msg}");
    }

    #[test]
    fn duplicate_key_reports_the_key() {
        let err = PipelineError::DuplicateKey {
            key: "\"a\"".to_owned(),
        };
        assert!(err.to_string().contains("\"a\""));
    }
}
