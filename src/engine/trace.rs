//! Thread-local stage marker for panic attribution.
//!
//! Every invocation of a user-supplied function is preceded by an
//! [`enter`] call naming the stage it belongs to. When a panic unwinds
//! out of such a function, the catch boundary reads the marker to report
//! which stage failed. One plain thread-local store per invocation; no
//! synchronization.

use std::cell::Cell;

use crate::error::StageKind;

thread_local! {
    static LAST_STAGE: Cell<Option<StageKind>> = const { Cell::new(None) };
}

#[inline]
pub(crate) fn enter(kind: StageKind) {
    LAST_STAGE.set(Some(kind));
}

pub(crate) fn reset() {
    LAST_STAGE.set(None);
}

pub(crate) fn last() -> Option<StageKind> {
    LAST_STAGE.get()
}
