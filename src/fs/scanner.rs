//! Lazy directory traversal
//!
//! Wraps `walkdir` so that regular files are handed out one at a time
//! as the walk discovers them. Nothing is collected up front, so memory
//! stays flat no matter how large the tree is.

use crate::error::{IoResultExt, Result, SortError};
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// Start a walk over `root`.
///
/// Fails with [`SortError::NotFound`] when `root` is missing or is not a
/// directory. Each call starts an independent walk.
pub fn walk(root: &Path) -> Result<FileWalker> {
    FileWalker::new(root)
}

/// Check that `root` exists and is a directory
pub fn check_root(root: &Path) -> Result<()> {
    let metadata = match std::fs::metadata(root) {
        Ok(m) => m,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(SortError::NotFound(root.to_path_buf()));
        }
        Err(e) => return Err(SortError::io(root, e)),
    };
    if !metadata.is_dir() {
        return Err(SortError::NotFound(root.to_path_buf()));
    }
    Ok(())
}

/// Iterator over every regular file below a root directory.
///
/// Symlinks are never followed into directories. A symlink that resolves to
/// a regular file is yielded (its content is what gets copied); links to
/// directories, dangling links, sockets, fifos and devices are skipped.
/// Order is whatever the filesystem returns.
pub struct FileWalker {
    root: PathBuf,
    inner: walkdir::FilterEntry<walkdir::IntoIter, Box<dyn FnMut(&DirEntry) -> bool + Send>>,
    done: bool,
}

impl FileWalker {
    /// Create a walker for `root`
    pub fn new(root: &Path) -> Result<Self> {
        Self::build(root, None)
    }

    /// Create a walker that prunes `excluded` and everything below it.
    ///
    /// Used when the target directory lives inside the source tree.
    pub fn excluding(root: &Path, excluded: &Path) -> Result<Self> {
        Self::build(root, Some(excluded))
    }

    fn build(root: &Path, excluded: Option<&Path>) -> Result<Self> {
        check_root(root)?;

        let root = root.canonicalize().with_path(root)?;

        // The excluded dir may not exist yet; compare against its canonical
        // form when it does, its literal form otherwise.
        let excluded = excluded.map(|p| p.canonicalize().unwrap_or_else(|_| p.to_path_buf()));
        let filter: Box<dyn FnMut(&DirEntry) -> bool + Send> = match excluded {
            Some(excluded) => Box::new(move |entry: &DirEntry| {
                !(entry.file_type().is_dir() && entry.path() == excluded)
            }),
            None => Box::new(|_: &DirEntry| true),
        };

        let inner = WalkDir::new(&root)
            .follow_links(false)
            .into_iter()
            .filter_entry(filter);

        Ok(Self {
            root,
            inner,
            done: false,
        })
    }

    /// Canonical root this walker was started on
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Decide whether an entry is a file to hand out
    fn accept(entry: &DirEntry) -> bool {
        let file_type = entry.file_type();
        if file_type.is_file() {
            return true;
        }
        if file_type.is_symlink() {
            // Resolve once; only links onto regular files count.
            return match std::fs::metadata(entry.path()) {
                Ok(target) => target.is_file(),
                Err(_) => {
                    tracing::debug!("Skipping dangling symlink {:?}", entry.path());
                    false
                }
            };
        }
        if !file_type.is_dir() {
            tracing::debug!("Skipping special file {:?}", entry.path());
        }
        false
    }
}

impl Iterator for FileWalker {
    type Item = Result<PathBuf>;

    /// Next regular file, or the error that ended the walk.
    ///
    /// After an error the walker is exhausted: a tree that could not be read
    /// completely is not walked any further.
    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        loop {
            match self.inner.next()? {
                Ok(entry) => {
                    if Self::accept(&entry) {
                        return Some(Ok(entry.into_path()));
                    }
                }
                Err(err) => {
                    self.done = true;
                    return Some(Err(SortError::traversal(&self.root, err)));
                }
            }
        }
    }
}
