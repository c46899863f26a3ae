//! Core sort engine module
//!
//! Provides the run orchestration, the bounded task queue feeding the
//! worker pool, and the report aggregated from per-file outcomes.

mod report;
mod scheduler;
mod sorter;

pub use report::*;
pub use scheduler::*;
pub use sorter::*;
