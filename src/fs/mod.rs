//! File system layer
//!
//! Tree traversal, extension classification, destination layout and
//! the per-file copy used by the worker pool.

mod classify;
mod operations;
mod scanner;

pub use classify::*;
pub use operations::*;
pub use scanner::*;
