//! Configuration module for ExtSort
//!
//! CLI arguments and the runtime configuration handed to the sort engine.

mod settings;

pub use settings::*;
