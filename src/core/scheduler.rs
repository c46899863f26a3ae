//! Task queue between the directory walker and the worker pool
//!
//! A bounded channel: when every worker is busy and the queue is full,
//! `submit` blocks the walker until a slot frees up. Memory is therefore
//! bounded by threads + queue size, not by the number of files.

use crate::error::{Result, SortError};
use crossbeam::channel::{bounded, Receiver, Sender};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

/// A single copy task
#[derive(Debug, Clone)]
pub struct CopyTask {
    /// Unique task ID, in discovery order
    pub id: u64,
    /// Source file
    pub source: PathBuf,
}

impl CopyTask {
    /// Create a new copy task
    pub fn new(id: u64, source: PathBuf) -> Self {
        Self { id, source }
    }
}

/// Task scheduler configuration
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Number of worker threads
    pub threads: usize,
    /// Maximum queued tasks not yet picked up by a worker
    pub queue_size: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        let threads = num_cpus::get();
        Self {
            threads,
            queue_size: threads * 4,
        }
    }
}

/// Feeds copy tasks to the worker pool
pub struct TaskScheduler {
    /// Configuration
    config: SchedulerConfig,
    /// Task sender
    task_sender: Sender<CopyTask>,
    /// Shutdown flag
    shutdown: Arc<AtomicBool>,
    /// Next task ID
    next_task_id: AtomicU64,
}

impl TaskScheduler {
    /// Create a new task scheduler and the receiving end of its queue.
    ///
    /// `shutdown` is the run's cancellation flag. Hand clones of the receiver
    /// to the workers and drop the original; once every receiver is gone,
    /// `submit` fails instead of blocking.
    pub fn new(config: SchedulerConfig, shutdown: Arc<AtomicBool>) -> (Self, Receiver<CopyTask>) {
        let (task_sender, task_receiver) = bounded(config.queue_size.max(1));

        let scheduler = Self {
            config,
            task_sender,
            shutdown,
            next_task_id: AtomicU64::new(0),
        };
        (scheduler, task_receiver)
    }

    /// Configuration in use
    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Get the shutdown flag
    pub fn shutdown_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.shutdown)
    }

    /// Check if shutdown was signaled
    pub fn is_shutdown(&self) -> bool {
        self.shutdown.load(Ordering::SeqCst)
    }

    /// Queue a file. Blocks while the queue is full.
    pub fn submit(&self, source: PathBuf) -> Result<u64> {
        let task_id = self.next_task_id.fetch_add(1, Ordering::Relaxed);

        self.task_sender
            .send(CopyTask::new(task_id, source))
            .map_err(|_| SortError::ThreadPool("all workers exited; cannot submit task".to_string()))?;

        Ok(task_id)
    }

    /// Tasks submitted so far
    pub fn submitted(&self) -> u64 {
        self.next_task_id.load(Ordering::Relaxed)
    }

    /// Get number of pending tasks
    pub fn pending_count(&self) -> usize {
        self.task_sender.len()
    }

    /// Close the queue. Workers finish what is queued, then exit.
    ///
    /// Returns the number of tasks submitted.
    pub fn close(self) -> u64 {
        self.submitted()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn scheduler(queue_size: usize) -> (TaskScheduler, Receiver<CopyTask>) {
        TaskScheduler::new(
            SchedulerConfig { threads: 1, queue_size },
            Arc::new(AtomicBool::new(false)),
        )
    }

    #[test]
    fn test_submit_assigns_sequential_ids() {
        let (sched, rx) = scheduler(8);

        assert_eq!(sched.submit(PathBuf::from("/a")).unwrap(), 0);
        assert_eq!(sched.submit(PathBuf::from("/b")).unwrap(), 1);
        assert_eq!(sched.pending_count(), 2);

        let first = rx.recv().unwrap();
        assert_eq!(first.id, 0);
        assert_eq!(first.source, PathBuf::from("/a"));
    }

    #[test]
    fn test_close_disconnects_workers() {
        let (sched, rx) = scheduler(4);
        sched.submit(PathBuf::from("/a")).unwrap();

        assert_eq!(sched.close(), 1);

        // Queued work is still delivered, then the channel reports closed
        assert!(rx.recv().is_ok());
        assert!(rx.recv().is_err());
    }

    #[test]
    fn test_submit_blocks_when_full() {
        let (sched, rx) = scheduler(1);
        let sched = Arc::new(sched);
        sched.submit(PathBuf::from("/first")).unwrap();

        let producer = {
            let sched = Arc::clone(&sched);
            std::thread::spawn(move || sched.submit(PathBuf::from("/second")))
        };

        std::thread::sleep(Duration::from_millis(50));
        assert!(!producer.is_finished());

        rx.recv().unwrap();
        assert_eq!(producer.join().unwrap().unwrap(), 1);
    }

    #[test]
    fn test_submit_fails_without_workers() {
        let (sched, rx) = scheduler(1);
        drop(rx);

        let err = sched.submit(PathBuf::from("/x")).unwrap_err();
        assert_eq!(err.category(), "thread_pool");
    }

    #[test]
    fn test_zero_queue_size_is_clamped() {
        let (sched, _rx) = scheduler(0);
        sched.submit(PathBuf::from("/a")).unwrap();
        assert_eq!(sched.pending_count(), 1);
    }
}
