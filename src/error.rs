//! Error types for ExtSort
//!
//! Pre-flight and traversal failures abort a run and surface as `Err`.
//! Per-file failures are folded into the report instead; their category
//! label comes from [`SortError::category`].

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Main error type for ExtSort operations
#[derive(Error, Debug)]
pub enum SortError {
    /// Source root is missing or is not a directory
    #[error("No such directory: {0}")]
    NotFound(PathBuf),

    /// I/O error during file or directory operations
    #[error("I/O error at '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Directory walk failed part-way through
    #[error("Traversal failed at '{path}': {source}")]
    Traversal {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    /// Worker pool could not be started or joined
    #[error("Thread pool error: {0}")]
    ThreadPool(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl SortError {
    /// Create an I/O error with path context
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a traversal error, taking the path from the walk error when it has one
    pub fn traversal(root: &Path, source: walkdir::Error) -> Self {
        let path = source.path().unwrap_or(root).to_path_buf();
        Self::Traversal { path, source }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Check if this error is a permission issue
    pub fn is_permission_error(&self) -> bool {
        match self {
            Self::Io { source, .. } => source.kind() == std::io::ErrorKind::PermissionDenied,
            Self::Traversal { source, .. } => source
                .io_error()
                .map(|e| e.kind() == std::io::ErrorKind::PermissionDenied)
                .unwrap_or(false),
            _ => false,
        }
    }

    /// Short stable label used in reports
    pub fn category(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::Io { source, .. } if source.kind() == std::io::ErrorKind::NotFound => "not_found",
            _ if self.is_permission_error() => "permission_denied",
            Self::Io { .. } => "io",
            Self::Traversal { .. } => "traversal",
            Self::ThreadPool(_) => "thread_pool",
            Self::Config(_) => "config",
        }
    }

    /// Get the path associated with this error, if any
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::NotFound(path) | Self::Io { path, .. } | Self::Traversal { path, .. } => {
                Some(path)
            }
            _ => None,
        }
    }
}

/// Result type alias for ExtSort operations
pub type Result<T> = std::result::Result<T, SortError>;

/// Extension trait for adding path context to std::io::Result
pub trait IoResultExt<T> {
    /// Add path context to an I/O error
    fn with_path(self, path: impl Into<PathBuf>) -> Result<T>;
}

impl<T> IoResultExt<T> for std::io::Result<T> {
    fn with_path(self, path: impl Into<PathBuf>) -> Result<T> {
        self.map_err(|e| SortError::io(path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::ErrorKind;

    #[test]
    fn test_io_error_with_path() {
        let io_err = std::io::Error::new(ErrorKind::Other, "disk on fire");
        let err = SortError::io("/test/path", io_err);
        assert_eq!(err.path(), Some(Path::new("/test/path")));
        assert_eq!(err.category(), "io");
    }

    #[test]
    fn test_category_labels() {
        let missing = SortError::io("/a", std::io::Error::new(ErrorKind::NotFound, "gone"));
        assert_eq!(missing.category(), "not_found");

        let denied = SortError::io("/b", std::io::Error::new(ErrorKind::PermissionDenied, "no"));
        assert!(denied.is_permission_error());
        assert_eq!(denied.category(), "permission_denied");

        assert_eq!(SortError::NotFound(PathBuf::from("/c")).category(), "not_found");
        assert_eq!(SortError::config("bad").category(), "config");
        assert!(SortError::config("bad").path().is_none());
    }

    #[test]
    fn test_with_path() {
        let result: std::io::Result<()> = Err(std::io::Error::new(ErrorKind::Other, "boom"));
        let err = result.with_path("/x/y").unwrap_err();
        assert!(err.to_string().contains("/x/y"));
    }
}
