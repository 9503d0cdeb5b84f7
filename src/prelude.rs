//! Re-exports commonly used items from this crate.
//!
//! This module is intended to be imported with a wildcard, providing
//! convenient access to the most frequently used traits and types.
//!
//! # Example
//!
//! ```
//! use rill::prelude::*;
//! ```

pub use crate::collector::Collector;
pub use crate::engine::{CancelToken, ExecMode};
pub use crate::error::{PipelineError, StageKind};
pub use crate::pipeline::Pipeline;
