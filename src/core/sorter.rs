//! Sort engine
//!
//! Walks the source tree on the calling thread and feeds every file to a
//! bounded pool of worker threads. Each worker classifies, resolves and
//! copies its file, folding the outcome into a worker-local report buffer.
//! The buffers are merged once the pool has drained.

use crate::config::SortConfig;
use crate::core::{CopyTask, Outcome, ReportBuilder, SchedulerConfig, SortReport, TaskScheduler};
use crate::error::{Result, SortError};
use crate::fs::{check_root, classify, ensure_dir_exists, CopyOptions, CopyStats, DestinationResolver, FileCopier, FileWalker};
use crossbeam::channel::Receiver;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Instant;

/// Main sort engine
pub struct SortEngine {
    /// Configuration
    config: SortConfig,
    /// File copier
    copier: FileCopier,
    /// Cancellation flag
    cancelled: Arc<AtomicBool>,
}

impl SortEngine {
    /// Create a new sort engine
    pub fn new(config: SortConfig) -> Self {
        let copy_options = CopyOptions {
            buffer_size: config.buffer_size,
            preserve_permissions: config.preserve,
            preserve_times: config.preserve,
            preserve_xattrs: config.preserve && config.preserve_xattrs,
        };

        Self {
            config,
            copier: FileCopier::new(copy_options),
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Get cancellation flag for external control
    pub fn cancellation_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancelled)
    }

    /// Cancel the run. Copies already in progress finish; nothing new starts.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Check if cancelled
    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Execute the sort.
    ///
    /// Fails only when the source is missing, the target cannot be created,
    /// the worker pool cannot start, or the walk breaks part-way. Per-file
    /// failures end up in the returned report.
    pub fn run(&self) -> Result<SortReport> {
        self.config.validate()?;

        let source = &self.config.source;
        let target = &self.config.target;

        // Fail fast on the source before touching the target
        check_root(source)?;
        ensure_dir_exists(target)?;
        let walker = FileWalker::excluding(source, target)?;

        tracing::info!(
            "Sorting {:?} into {:?} with {} workers",
            walker.root(),
            target,
            self.config.effective_threads()
        );

        self.dispatch(walker)
    }

    /// Feed `files` through the worker pool and wait for every task.
    ///
    /// An `Err` item stops the feed; queued and in-flight tasks still drain
    /// before the error is returned.
    pub(crate) fn dispatch<I>(&self, files: I) -> Result<SortReport>
    where
        I: IntoIterator<Item = Result<PathBuf>>,
    {
        let started_at = chrono::Utc::now();
        let start = Instant::now();

        let sched_config = SchedulerConfig {
            threads: self.config.effective_threads(),
            queue_size: self.config.effective_queue_size(),
        };
        let (scheduler, task_rx) = TaskScheduler::new(sched_config, self.cancellation_flag());
        let resolver = DestinationResolver::new(&self.config.target)
            .with_no_extension_dir(self.config.no_extension_dir.clone());

        let (feed_result, merged) = thread::scope(|scope| {
            let workers = match self.spawn_workers(scope, &scheduler, task_rx, &resolver) {
                Ok(workers) => workers,
                Err(e) => {
                    // Release the workers that did start
                    scheduler.close();
                    return Err(e);
                }
            };

            let feed_result = self.feed(&scheduler, files);
            let pending = scheduler.pending_count();
            let files_seen = scheduler.close();

            tracing::debug!("Draining {} of {} submitted tasks", pending, files_seen);

            let mut merged = ReportBuilder::new();
            for worker in workers {
                let local = worker
                    .join()
                    .map_err(|_| SortError::ThreadPool("worker thread panicked".to_string()))?;
                merged.merge(local);
            }

            Ok::<_, SortError>((feed_result.map(|()| files_seen), merged))
        })?;

        let files_seen = match feed_result {
            Ok(files_seen) => files_seen,
            Err(e) => {
                tracing::error!("Sort aborted: {}", e);
                return Err(e);
            }
        };

        let report = merged.finish(files_seen, self.is_cancelled(), started_at, start.elapsed());

        tracing::info!(
            "Sorted {} of {} files ({} failed) in {:.2?}",
            report.files_succeeded,
            report.files_seen,
            report.files_failed,
            report.duration
        );

        Ok(report)
    }

    /// Push files into the queue until the source is exhausted, fails, or the
    /// run is cancelled
    fn feed<I>(&self, scheduler: &TaskScheduler, files: I) -> Result<()>
    where
        I: IntoIterator<Item = Result<PathBuf>>,
    {
        for file in files {
            if scheduler.is_shutdown() {
                tracing::info!("Cancellation requested; stopping traversal");
                break;
            }
            scheduler.submit(file?)?;
        }
        Ok(())
    }

    /// Start the worker pool. Each worker returns its own report buffer.
    fn spawn_workers<'scope, 'env>(
        &'env self,
        scope: &'scope thread::Scope<'scope, 'env>,
        scheduler: &TaskScheduler,
        task_rx: Receiver<CopyTask>,
        resolver: &'env DestinationResolver,
    ) -> Result<Vec<thread::ScopedJoinHandle<'scope, ReportBuilder>>> {
        let threads = scheduler.config().threads;
        let mut handles = Vec::with_capacity(threads);

        for worker_id in 0..threads {
            let task_rx = task_rx.clone();
            let shutdown = scheduler.shutdown_flag();

            let handle = thread::Builder::new()
                .name(format!("extsort-worker-{}", worker_id))
                .spawn_scoped(scope, move || {
                    let mut local = ReportBuilder::new();

                    for task in task_rx.iter() {
                        if shutdown.load(Ordering::SeqCst) {
                            local.record(Outcome::Cancelled { source: task.source });
                            continue;
                        }
                        local.record(self.process(&task, resolver));
                    }

                    tracing::debug!("Worker {} shutting down after {} tasks", worker_id, local.recorded());
                    local
                })
                .map_err(|e| SortError::ThreadPool(format!("failed to spawn worker {}: {}", worker_id, e)))?;

            handles.push(handle);
        }

        // Workers hold the only receivers from here on
        drop(task_rx);

        Ok(handles)
    }

    /// Classify, resolve, ensure and copy one file
    fn process(&self, task: &CopyTask, resolver: &DestinationResolver) -> Outcome {
        let key = classify(&task.source);

        let copied = resolver
            .ensure_exists(&key)
            .and_then(|dir| self.copier.copy(&task.source, &dir));

        match copied {
            Ok(CopyStats { destination, bytes_copied, duration }) => {
                tracing::debug!("[{}] {:?} -> {:?} in {:.2?}", task.id, task.source, destination, duration);
                Outcome::Success {
                    source: task.source.clone(),
                    destination,
                    key,
                    bytes: bytes_copied,
                }
            }
            Err(error) => {
                tracing::warn!("Failed to sort {:?}: {}", task.source, error);
                Outcome::Failure {
                    source: task.source.clone(),
                    error,
                }
            }
        }
    }
}

/// Sort `source` into `target` with default settings
pub fn sort_files(source: &Path, target: &Path) -> Result<SortReport> {
    sort_files_with_threads(source, target, 0)
}

/// Sort with an explicit worker count (0 = one per CPU)
pub fn sort_files_with_threads(source: &Path, target: &Path, threads: usize) -> Result<SortReport> {
    let config = SortConfig {
        source: source.to_path_buf(),
        target: target.to_path_buf(),
        threads,
        ..Default::default()
    };

    SortEngine::new(config).run()
}
