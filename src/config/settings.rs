//! Configuration settings for ExtSort
//!
//! CLI arguments, the runtime configuration derived from them, and defaults.

use crate::error::{Result, SortError};
use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default target directory when none is given on the command line
pub const DEFAULT_TARGET: &str = "dist";

/// Largest per-worker copy buffer accepted
pub const MAX_BUFFER_SIZE: usize = 256 * 1024 * 1024;

/// Largest task queue accepted; the queue is allocated up front
pub const MAX_QUEUE_SIZE: usize = 1 << 20;

/// ExtSort - copy a directory tree into per-extension folders
#[derive(Parser, Debug, Clone)]
#[command(name = "extsort")]
#[command(author = "ExtSort Team")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Sort files into folders by extension, copying in parallel")]
#[command(long_about = r#"
ExtSort walks SOURCE recursively and copies every regular file into
TARGET/<extension>/<file name>, lower-casing the extension. Files without an
extension land directly in TARGET unless --no-extension-dir is given.

Permissions, timestamps and extended attributes are preserved. Existing files
with the same name are overwritten. Source files are never modified.

Examples:
  extsort ~/Downloads                 # Sort into ./dist
  extsort ~/Downloads ~/Sorted -t 8   # Eight workers
  extsort photos out --output-format json
"#)]
pub struct CliArgs {
    /// Source directory to sort
    #[arg(value_name = "SOURCE")]
    pub source: PathBuf,

    /// Target directory (created if missing)
    #[arg(value_name = "TARGET", default_value = DEFAULT_TARGET)]
    pub target: PathBuf,

    /// Number of parallel workers (0 = auto-detect)
    #[arg(short = 't', long, default_value = "0", value_name = "NUM")]
    pub threads: usize,

    /// Pending task queue size (0 = 4 per worker)
    #[arg(long, default_value = "0", value_name = "NUM")]
    pub queue_size: usize,

    /// Buffer size for file copies (e.g., 1M, 64K)
    #[arg(short = 'b', long, default_value = "1M", value_name = "SIZE")]
    pub buffer_size: String,

    /// Do not preserve permissions and timestamps
    #[arg(long)]
    pub no_preserve: bool,

    /// Do not copy extended attributes
    #[arg(long)]
    pub no_xattrs: bool,

    /// Folder name for files without an extension (default: TARGET itself)
    #[arg(long, value_name = "NAME")]
    pub no_extension_dir: Option<String>,

    /// Output format for the final report
    #[arg(long, value_enum, default_value = "text")]
    pub output_format: OutputFormat,

    /// Log output format
    #[arg(long, value_enum, default_value = "text", env = "EXTSORT_LOG_FORMAT")]
    pub log_format: LogFormat,

    /// Verbose output (can be repeated: -v, -vv)
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress the summary)
    #[arg(short = 'q', long)]
    pub quiet: bool,
}

/// Report output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
pub enum OutputFormat {
    /// Human-readable summary
    Text,
    /// JSON report on stdout
    Json,
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
pub enum LogFormat {
    /// Plain text lines
    Text,
    /// One JSON object per event
    Json,
}

/// Runtime configuration derived from CLI args
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SortConfig {
    /// Source directory
    pub source: PathBuf,
    /// Target root
    pub target: PathBuf,
    /// Worker count (0 = one per CPU)
    pub threads: usize,
    /// Task queue capacity (0 = 4 per worker)
    pub queue_size: usize,
    /// Buffer size in bytes
    pub buffer_size: usize,
    /// Preserve permissions and timestamps
    pub preserve: bool,
    /// Preserve extended attributes (only when `preserve` is set)
    pub preserve_xattrs: bool,
    /// Folder for extensionless files; `None` puts them in the target root
    pub no_extension_dir: Option<String>,
}

impl Default for SortConfig {
    fn default() -> Self {
        Self {
            source: PathBuf::new(),
            target: PathBuf::from(DEFAULT_TARGET),
            threads: 0, // Auto-detect
            queue_size: 0,
            buffer_size: 1024 * 1024, // 1MB
            preserve: true,
            preserve_xattrs: true,
            no_extension_dir: None,
        }
    }
}

/// Parse human-readable size string to bytes
pub fn parse_size(size: &str) -> std::result::Result<u64, String> {
    let size = size.trim().to_uppercase();

    if size.is_empty() {
        return Err("Empty size string".to_string());
    }

    let (num_str, multiplier) = if size.ends_with("GB") || size.ends_with('G') {
        (size.trim_end_matches(|c| c == 'G' || c == 'B'), 1024u64 * 1024 * 1024)
    } else if size.ends_with("MB") || size.ends_with('M') {
        (size.trim_end_matches(|c| c == 'M' || c == 'B'), 1024u64 * 1024)
    } else if size.ends_with("KB") || size.ends_with('K') {
        (size.trim_end_matches(|c| c == 'K' || c == 'B'), 1024u64)
    } else if size.ends_with('B') {
        (size.trim_end_matches('B'), 1u64)
    } else {
        // Assume bytes if no suffix
        (size.as_str(), 1u64)
    };

    let num: f64 = num_str
        .trim()
        .parse()
        .map_err(|_| format!("Invalid number: {}", num_str))?;

    if num < 0.0 {
        return Err(format!("Negative size: {}", num_str));
    }

    Ok((num * multiplier as f64) as u64)
}

impl SortConfig {
    /// Create config from CLI arguments
    pub fn from_cli(args: &CliArgs) -> Result<Self> {
        let buffer_size = parse_size(&args.buffer_size)
            .map_err(|e| SortError::config(format!("Invalid buffer size: {}", e)))?;
        let buffer_size = usize::try_from(buffer_size)
            .ok()
            .filter(|&size| size <= MAX_BUFFER_SIZE)
            .ok_or_else(|| buffer_too_large(buffer_size))?;

        let config = Self {
            source: args.source.clone(),
            target: args.target.clone(),
            threads: args.threads,
            queue_size: args.queue_size,
            buffer_size,
            preserve: !args.no_preserve,
            preserve_xattrs: !args.no_xattrs,
            no_extension_dir: args.no_extension_dir.clone(),
        };

        config.validate()?;
        Ok(config)
    }

    /// Reject configurations a run cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.source.as_os_str().is_empty() {
            return Err(SortError::config("Source path is empty"));
        }
        if self.target.as_os_str().is_empty() {
            return Err(SortError::config("Target path is empty"));
        }
        if self.buffer_size == 0 {
            return Err(SortError::config("Buffer size must be greater than zero"));
        }
        if self.buffer_size > MAX_BUFFER_SIZE {
            return Err(buffer_too_large(self.buffer_size as u64));
        }
        if self.queue_size > MAX_QUEUE_SIZE {
            return Err(SortError::config(format!(
                "Queue size {} exceeds the maximum of {}",
                self.queue_size, MAX_QUEUE_SIZE
            )));
        }
        if let Some(name) = &self.no_extension_dir {
            if name.contains(['/', '\\']) || name == "." || name == ".." {
                return Err(SortError::config(format!(
                    "No-extension folder must be a single folder name, got '{}'",
                    name
                )));
            }
        }
        if same_location(&self.source, &self.target) {
            return Err(SortError::config(format!(
                "Source and target are the same directory: {}",
                self.source.display()
            )));
        }
        Ok(())
    }

    /// Worker count after auto-detection
    pub fn effective_threads(&self) -> usize {
        if self.threads == 0 {
            num_cpus::get().max(1)
        } else {
            self.threads
        }
    }

    /// Queue capacity after defaulting
    pub fn effective_queue_size(&self) -> usize {
        if self.queue_size == 0 {
            self.effective_threads().saturating_mul(4).min(MAX_QUEUE_SIZE)
        } else {
            self.queue_size
        }
    }
}

fn buffer_too_large(size: u64) -> SortError {
    SortError::config(format!(
        "Buffer size {} exceeds the maximum of {}",
        humansize::format_size(size, humansize::BINARY),
        humansize::format_size(MAX_BUFFER_SIZE as u64, humansize::BINARY)
    ))
}

/// Compare two paths, canonically when both exist
fn same_location(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}
