//! Destination layout and metadata-preserving copy
//!
//! [`DestinationResolver`] turns an extension key into a folder under the
//! target root and makes sure it exists. [`FileCopier`] copies one file into
//! that folder, keeping permissions, timestamps and extended attributes.

use crate::error::{IoResultExt, Result, SortError};
use crate::fs::ExtensionKey;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Create `dir` and any missing ancestors.
///
/// Succeeds if the directory already exists, including when another thread
/// creates it concurrently. Fails if something that is not a directory
/// occupies the path.
pub fn ensure_dir_exists(dir: &Path) -> Result<()> {
    match std::fs::create_dir_all(dir) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists && dir.is_dir() => Ok(()),
        Err(e) => Err(SortError::io(dir, e)),
    }
}

/// Compute `target_root/<key>`; the empty key maps to `target_root` itself.
///
/// An extensionless file named like an extension (`txt`) therefore lands on
/// the same path as that extension's folder. Whichever is created first wins
/// and every file of the other kind fails. Use
/// [`DestinationResolver::with_no_extension_dir`] to keep them apart.
pub fn resolve_dir(target_root: &Path, key: &ExtensionKey) -> PathBuf {
    if key.is_empty() {
        target_root.to_path_buf()
    } else {
        target_root.join(key.as_str())
    }
}

/// Maps extension keys to destination folders
#[derive(Debug, Clone)]
pub struct DestinationResolver {
    target_root: PathBuf,
    no_extension_dir: Option<String>,
}

impl DestinationResolver {
    /// Create a resolver rooted at `target_root`
    pub fn new(target_root: impl Into<PathBuf>) -> Self {
        Self {
            target_root: target_root.into(),
            no_extension_dir: None,
        }
    }

    /// Send extensionless files to `target_root/<name>` instead of the root
    pub fn with_no_extension_dir(mut self, name: Option<String>) -> Self {
        self.no_extension_dir = name.filter(|n| !n.is_empty());
        self
    }

    /// Destination folder for `key`. Pure; touches nothing on disk.
    pub fn resolve_dir(&self, key: &ExtensionKey) -> PathBuf {
        match (&self.no_extension_dir, key.is_empty()) {
            (Some(name), true) => self.target_root.join(name),
            _ => resolve_dir(&self.target_root, key),
        }
    }

    /// Resolve and create the destination folder for `key`
    pub fn ensure_exists(&self, key: &ExtensionKey) -> Result<PathBuf> {
        let dir = self.resolve_dir(key);
        ensure_dir_exists(&dir)?;
        Ok(dir)
    }
}

/// Copy operation statistics
#[derive(Debug, Clone)]
pub struct CopyStats {
    /// Final path of the copied file
    pub destination: PathBuf,
    /// Bytes copied
    pub bytes_copied: u64,
    /// Duration of the copy
    pub duration: Duration,
}

/// Options for file copy operations
#[derive(Debug, Clone)]
pub struct CopyOptions {
    /// Buffer size for buffered operations
    pub buffer_size: usize,
    /// Preserve file permissions
    pub preserve_permissions: bool,
    /// Preserve modification and access time
    pub preserve_times: bool,
    /// Preserve extended attributes (Unix only, best effort)
    pub preserve_xattrs: bool,
}

impl Default for CopyOptions {
    fn default() -> Self {
        Self {
            buffer_size: 1024 * 1024, // 1MB
            preserve_permissions: true,
            preserve_times: true,
            preserve_xattrs: true,
        }
    }
}

/// Copies single files into a destination folder
pub struct FileCopier {
    options: CopyOptions,
}

impl FileCopier {
    /// Create a new file copier with the given options
    pub fn new(options: CopyOptions) -> Self {
        Self { options }
    }

    /// Create with default options
    pub fn default_copier() -> Self {
        Self::new(CopyOptions::default())
    }

    /// Copy `source` into `dest_dir`, keeping its base name.
    ///
    /// An existing file with the same name is replaced; last writer wins.
    /// Two different sources sharing a base name and extension therefore
    /// overwrite each other.
    pub fn copy(&self, source: &Path, dest_dir: &Path) -> Result<CopyStats> {
        let start = Instant::now();

        let file_name = source.file_name().ok_or_else(|| {
            SortError::io(
                source,
                std::io::Error::new(std::io::ErrorKind::InvalidInput, "path has no file name"),
            )
        })?;
        let destination = dest_dir.join(file_name);

        let metadata = std::fs::metadata(source).with_path(source)?;

        // Stage next to the destination so the final rename never crosses
        // a filesystem boundary.
        let staged = tempfile::Builder::new()
            .prefix(".extsort-")
            .suffix(".part")
            .tempfile_in(dest_dir)
            .with_path(dest_dir)?;

        let bytes_copied = self.copy_buffered(source, staged.as_file(), staged.path())?;

        if self.options.preserve_xattrs {
            self.copy_xattr(source, staged.path());
        }
        if self.options.preserve_permissions {
            std::fs::set_permissions(staged.path(), metadata.permissions())
                .with_path(staged.path())?;
        } else {
            // Staging files are created owner-only; widen to a regular file mode
            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                std::fs::set_permissions(staged.path(), std::fs::Permissions::from_mode(0o644))
                    .with_path(staged.path())?;
            }
        }
        if self.options.preserve_times {
            self.copy_times(&metadata, staged.path())?;
        }

        staged
            .persist(&destination)
            .map_err(|e| SortError::io(&destination, e.error))?;

        Ok(CopyStats {
            destination,
            bytes_copied,
            duration: start.elapsed(),
        })
    }

    /// Buffered byte copy into an already open destination
    fn copy_buffered(&self, source: &Path, dest: &File, dest_path: &Path) -> Result<u64> {
        let src_file = File::open(source).with_path(source)?;

        let reader = BufReader::with_capacity(self.options.buffer_size, src_file);
        let writer = BufWriter::with_capacity(self.options.buffer_size, dest);

        copy_stream(reader, writer, source, dest_path)
    }

    /// Copy modification and access time
    fn copy_times(&self, metadata: &std::fs::Metadata, dest: &Path) -> Result<()> {
        let mtime = filetime::FileTime::from_last_modification_time(metadata);
        let atime = filetime::FileTime::from_last_access_time(metadata);
        filetime::set_file_times(dest, atime, mtime).with_path(dest)
    }

    /// Copy extended attributes; filesystems without xattr support are skipped
    #[cfg(unix)]
    fn copy_xattr(&self, source: &Path, dest: &Path) {
        let names = match xattr::list(source) {
            Ok(names) => names,
            Err(e) => {
                tracing::debug!("Cannot list xattrs of {:?}: {}", source, e);
                return;
            }
        };

        for name in names {
            if let Ok(Some(value)) = xattr::get(source, &name) {
                if let Err(e) = xattr::set(dest, &name, &value) {
                    tracing::debug!("Cannot set xattr {:?} on {:?}: {}", name, dest, e);
                }
            }
        }
    }

    #[cfg(not(unix))]
    fn copy_xattr(&self, _source: &Path, _dest: &Path) {}
}

/// Pump `reader` into `writer`, blaming read failures on `source` and
/// write failures on `dest_path`
fn copy_stream<R: BufRead, W: Write>(
    mut reader: R,
    mut writer: W,
    source: &Path,
    dest_path: &Path,
) -> Result<u64> {
    let mut bytes_copied = 0u64;

    loop {
        let chunk = match reader.fill_buf() {
            Ok([]) => break,
            Ok(chunk) => chunk,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(SortError::io(source, e)),
        };
        let len = chunk.len();
        writer.write_all(chunk).with_path(dest_path)?;
        reader.consume(len);
        bytes_copied += len as u64;
    }

    writer.flush().with_path(dest_path)?;

    Ok(bytes_copied)
}
