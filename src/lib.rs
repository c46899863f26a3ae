//! # ExtSort - Concurrent File Sorting by Extension
//!
//! ExtSort walks a source directory tree and copies every regular file into
//! `target/<extension>/<file name>`, using a bounded pool of worker threads.
//! Source files are never modified.
//!
//! ## Pipeline
//!
//! - **Traverser** ([`fs::walk`]): lazy walk yielding regular files
//! - **Classifier** ([`fs::classify`]): lower-case extension key
//! - **Destination Resolver** ([`fs::DestinationResolver`]): per-key folder,
//!   created idempotently and safely under concurrent callers
//! - **Copier** ([`fs::FileCopier`]): byte copy keeping permissions,
//!   timestamps and extended attributes; same-name files are overwritten
//! - **Dispatcher** ([`core::SortEngine`]): worker pool, backpressure,
//!   drain, and the aggregated [`core::SortReport`]
//!
//! ## Quick Start
//!
//! ```no_run
//! use extsort::core::sort_files;
//! use std::path::Path;
//!
//! let report = sort_files(Path::new("/downloads"), Path::new("dist")).unwrap();
//!
//! println!("Sorted {} of {} files", report.files_succeeded, report.files_seen);
//! for failure in &report.failures {
//!     eprintln!("{}: {}", failure.path.display(), failure.reason);
//! }
//! ```
//!
//! ## Advanced Usage
//!
//! ```no_run
//! use extsort::config::SortConfig;
//! use extsort::core::SortEngine;
//! use std::path::PathBuf;
//!
//! let config = SortConfig {
//!     source: PathBuf::from("/downloads"),
//!     target: PathBuf::from("/sorted"),
//!     threads: 8,
//!     no_extension_dir: Some("misc".to_string()),
//!     ..Default::default()
//! };
//!
//! let engine = SortEngine::new(config);
//! let cancel = engine.cancellation_flag();
//! // hand `cancel` to a signal handler, then:
//! let report = engine.run().unwrap();
//! report.print_summary();
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod core;
pub mod error;
pub mod fs;

// Re-export commonly used types
pub use config::SortConfig;
pub use core::{sort_files, SortEngine, SortReport};
pub use error::{Result, SortError};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for convenient imports
pub mod prelude {
    //! Convenient re-exports for common usage
    //!
    //! ```no_run
    //! use extsort::prelude::*;
    //! ```

    pub use crate::config::SortConfig;
    pub use crate::core::{sort_files, sort_files_with_threads, FileFailure, SortEngine, SortReport};
    pub use crate::error::{Result, SortError};
    pub use crate::fs::{classify, walk, DestinationResolver, ExtensionKey, FileCopier};
}
