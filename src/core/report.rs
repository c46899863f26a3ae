//! Per-file outcomes and the aggregated run report

use crate::error::SortError;
use crate::fs::ExtensionKey;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

/// Result of one copy task
#[derive(Debug)]
pub enum Outcome {
    /// File landed at `destination`
    Success {
        /// Source file
        source: PathBuf,
        /// Final path under the target root
        destination: PathBuf,
        /// Extension key the file was sorted under
        key: ExtensionKey,
        /// Bytes written
        bytes: u64,
    },
    /// File could not be sorted
    Failure {
        /// Source file
        source: PathBuf,
        /// What went wrong
        error: SortError,
    },
    /// Task was dequeued after cancellation and never started
    Cancelled {
        /// Source file
        source: PathBuf,
    },
}

/// One failed file in a report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileFailure {
    /// Source path that failed
    pub path: PathBuf,
    /// Short error label (see [`SortError::category`])
    pub category: String,
    /// Human readable reason
    pub reason: String,
}

/// Outcome accumulator owned by a single worker.
///
/// Workers never share one; the dispatcher merges them after the drain.
#[derive(Debug, Default)]
pub struct ReportBuilder {
    files_succeeded: u64,
    files_failed: u64,
    files_cancelled: u64,
    bytes_copied: u64,
    by_extension: BTreeMap<String, u64>,
    failures: Vec<FileFailure>,
}

impl ReportBuilder {
    /// Create an empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one outcome in
    pub fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Success { key, bytes, .. } => {
                self.files_succeeded += 1;
                self.bytes_copied += bytes;
                *self.by_extension.entry(key.as_str().to_string()).or_insert(0) += 1;
            }
            Outcome::Failure { source, error } => {
                self.files_failed += 1;
                self.failures.push(FileFailure {
                    path: source,
                    category: error.category().to_string(),
                    reason: error.to_string(),
                });
            }
            Outcome::Cancelled { .. } => {
                self.files_cancelled += 1;
            }
        }
    }

    /// Absorb another builder
    pub fn merge(&mut self, other: ReportBuilder) {
        self.files_succeeded += other.files_succeeded;
        self.files_failed += other.files_failed;
        self.files_cancelled += other.files_cancelled;
        self.bytes_copied += other.bytes_copied;
        for (key, count) in other.by_extension {
            *self.by_extension.entry(key).or_insert(0) += count;
        }
        self.failures.extend(other.failures);
    }

    /// Outcomes recorded so far
    pub fn recorded(&self) -> u64 {
        self.files_succeeded + self.files_failed + self.files_cancelled
    }

    /// Freeze into a report
    pub fn finish(
        self,
        files_seen: u64,
        cancelled: bool,
        started_at: DateTime<Utc>,
        duration: Duration,
    ) -> SortReport {
        let finished_at = Utc::now();
        SortReport {
            files_seen,
            files_succeeded: self.files_succeeded,
            files_failed: self.files_failed,
            files_cancelled: self.files_cancelled,
            bytes_copied: self.bytes_copied,
            by_extension: self.by_extension,
            failures: self.failures,
            cancelled,
            started_at,
            finished_at,
            duration,
        }
    }
}

/// Aggregated result of a sort run.
///
/// `files_seen == files_succeeded + files_failed + files_cancelled`.
/// The order of `failures` carries no meaning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SortReport {
    /// Files handed to the worker pool
    pub files_seen: u64,
    /// Files copied into the target tree
    pub files_succeeded: u64,
    /// Files that failed
    pub files_failed: u64,
    /// Files skipped because the run was cancelled
    pub files_cancelled: u64,
    /// Total bytes written
    pub bytes_copied: u64,
    /// Succeeded files per extension key ("" = no extension)
    pub by_extension: BTreeMap<String, u64>,
    /// Failed files with reasons
    pub failures: Vec<FileFailure>,
    /// Run was cancelled before completion
    pub cancelled: bool,
    /// Run start
    pub started_at: DateTime<Utc>,
    /// Run end
    pub finished_at: DateTime<Utc>,
    /// Wall-clock duration
    pub duration: Duration,
}

impl SortReport {
    /// Every discovered file was sorted
    pub fn is_success(&self) -> bool {
        self.files_failed == 0 && !self.cancelled
    }

    /// Average throughput in bytes/second
    pub fn throughput(&self) -> f64 {
        let secs = self.duration.as_secs_f64();
        if secs > 0.0 {
            self.bytes_copied as f64 / secs
        } else {
            0.0
        }
    }

    /// Print summary to console
    pub fn print_summary(&self) {
        println!("\n=== Sort Summary ===");
        println!("Files seen:      {}", self.files_seen);
        println!("Succeeded:       {}", self.files_succeeded);
        println!("Failed:          {}", self.files_failed);
        if self.cancelled {
            println!("Cancelled:       {}", self.files_cancelled);
        }
        println!("Bytes copied:    {}", humansize::format_size(self.bytes_copied, humansize::BINARY));
        println!("Duration:        {}", humantime::format_duration(truncate_to_millis(self.duration)));
        println!("Throughput:      {}/s", humansize::format_size(self.throughput() as u64, humansize::BINARY));

        if !self.by_extension.is_empty() {
            println!("\nBy extension:");
            for (key, count) in &self.by_extension {
                let label = if key.is_empty() { "(none)" } else { key.as_str() };
                println!("  {:<12} {}", label, count);
            }
        }

        if !self.failures.is_empty() {
            println!("\nFailures: {}", self.failures.len());
            for failure in &self.failures {
                println!("  {} - {}", failure.path.display(), failure.reason);
            }
        }
    }
}

fn truncate_to_millis(d: Duration) -> Duration {
    Duration::from_millis(d.as_millis() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn success(name: &str, bytes: u64) -> Outcome {
        Outcome::Success {
            source: PathBuf::from(format!("/src/{}", name)),
            destination: PathBuf::from(format!("/dst/{}", name)),
            key: crate::fs::classify(Path::new(name)),
            bytes,
        }
    }

    fn failure(name: &str) -> Outcome {
        Outcome::Failure {
            source: PathBuf::from(format!("/src/{}", name)),
            error: SortError::io(
                format!("/src/{}", name),
                std::io::Error::new(std::io::ErrorKind::NotFound, "vanished"),
            ),
        }
    }

    #[test]
    fn test_record_and_finish() {
        let mut builder = ReportBuilder::new();
        builder.record(success("a.TXT", 10));
        builder.record(success("b.txt", 5));
        builder.record(success("c", 1));
        builder.record(failure("d.md"));

        let report = builder.finish(4, false, Utc::now(), Duration::from_millis(5));

        assert_eq!(report.files_seen, 4);
        assert_eq!(report.files_succeeded, 3);
        assert_eq!(report.files_failed, 1);
        assert_eq!(report.bytes_copied, 16);
        assert_eq!(report.by_extension.get("txt"), Some(&2));
        assert_eq!(report.by_extension.get(""), Some(&1));
        assert_eq!(report.failures[0].category, "not_found");
        assert!(!report.is_success());
    }

    #[test]
    fn test_merge_worker_buffers() {
        let mut first = ReportBuilder::new();
        first.record(success("a.rs", 1));
        first.record(Outcome::Cancelled { source: PathBuf::from("/src/z") });

        let mut second = ReportBuilder::new();
        second.record(success("b.rs", 2));
        second.record(failure("c.rs"));

        first.merge(second);
        assert_eq!(first.recorded(), 4);

        let report = first.finish(4, true, Utc::now(), Duration::ZERO);
        assert_eq!(report.by_extension.get("rs"), Some(&2));
        assert_eq!(report.files_cancelled, 1);
        assert_eq!(
            report.files_seen,
            report.files_succeeded + report.files_failed + report.files_cancelled
        );
        assert_eq!(report.throughput(), 0.0);
    }

    #[test]
    fn test_report_serializes() {
        let mut builder = ReportBuilder::new();
        builder.record(failure("x.bin"));
        let report = builder.finish(1, false, Utc::now(), Duration::from_secs(1));

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["files_failed"], 1);
        assert_eq!(json["failures"][0]["category"], "not_found");
    }
}
