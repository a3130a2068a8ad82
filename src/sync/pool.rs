//! Sync pool (spec component D) - executes a pass's work items across a
//! bounded set of tokio tasks, generalizing the teacher's dispatcher/worker
//! inbox design to actually perform copies and deletes instead of only
//! counting jobs.

use crate::ops::{atomic_copy, retry, safe_delete};
use crate::pathutil;
use crate::sync::plan::{RETRY_ATTEMPTS, RETRY_DELAY};
use crate::types::{KopyError, WorkItem};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::runtime::{Builder, Runtime};
use tokio::sync::{mpsc, OwnedSemaphorePermit, Semaphore};

/// Counts produced by one completed pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassCounts {
    pub copies: u64,
    pub deletions: u64,
    pub failures: u64,
}

struct Counters {
    copies: AtomicU64,
    deletions: AtomicU64,
    failures: AtomicU64,
}

impl Counters {
    fn new() -> Self {
        Self {
            copies: AtomicU64::new(0),
            deletions: AtomicU64::new(0),
            failures: AtomicU64::new(0),
        }
    }

    fn snapshot(&self) -> PassCounts {
        PassCounts {
            copies: self.copies.load(Ordering::Relaxed),
            deletions: self.deletions.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
        }
    }
}

/// A scoped pool draining `workers` tokio tasks, gated by a `2*workers`
/// semaphore so the dispatcher never queues more in-flight work than that.
pub struct SyncPool {
    runtime: Runtime,
    workers: usize,
}

impl SyncPool {
    pub fn new(workers: usize) -> Result<Self, KopyError> {
        let workers = workers.max(1);
        let runtime = Builder::new_multi_thread()
            .worker_threads(workers)
            .enable_all()
            .build()
            .map_err(KopyError::Io)?;
        Ok(Self { runtime, workers })
    }

    /// Execute every item in `items` against `source_root`/`target_root`,
    /// returning aggregated counts for the pass. Work dispatches only after
    /// the full walk has produced `items`, so a pass never deletes a path
    /// it is about to recreate under a different relative name.
    pub fn run(
        &self,
        items: Vec<WorkItem>,
        source_root: &std::path::Path,
        target_root: &std::path::Path,
    ) -> PassCounts {
        let counters = Arc::new(Counters::new());
        let semaphore = Arc::new(Semaphore::new(self.workers * 2));
        let (tx, rx) = mpsc::channel::<(WorkItem, OwnedSemaphorePermit)>(self.workers * 2);

        let source_root = source_root.to_path_buf();
        let target_root = target_root.to_path_buf();
        let workers = self.workers;

        self.runtime.block_on(async move {
            let rx = Arc::new(tokio::sync::Mutex::new(rx));
            let mut handles = Vec::with_capacity(workers);
            for _ in 0..workers {
                let rx = Arc::clone(&rx);
                let counters = Arc::clone(&counters);
                let source_root = source_root.clone();
                let target_root = target_root.clone();
                handles.push(tokio::spawn(async move {
                    loop {
                        let received = {
                            let mut guard = rx.lock().await;
                            guard.recv().await
                        };
                        let Some((item, permit)) = received else { break };
                        execute_item(item, &source_root, &target_root, &counters);
                        drop(permit);
                    }
                }));
            }

            for item in items {
                let permit = semaphore.clone().acquire_owned().await.expect("semaphore open");
                if tx.send((item, permit)).await.is_err() {
                    break;
                }
            }
            drop(tx);

            for handle in handles {
                let _ = handle.await;
            }
        });

        counters.snapshot()
    }
}

fn execute_item(
    item: WorkItem,
    source_root: &std::path::Path,
    target_root: &std::path::Path,
    counters: &Counters,
) {
    match item {
        WorkItem::Copy { relative, .. } => {
            let rel = pathutil::to_posix_string(&relative);
            let src = source_root.join(&relative);
            let dst = target_root.join(&relative);
            let result = retry(RETRY_ATTEMPTS, RETRY_DELAY, || atomic_copy(&src, &dst));
            match result {
                Ok(_) => {
                    counters.copies.fetch_add(1, Ordering::Relaxed);
                }
                Err(err) => {
                    tracing::warn!(path = %rel, error = %err, "copy failed after retries");
                    counters.failures.fetch_add(1, Ordering::Relaxed);
                }
            }
        }
        WorkItem::Delete { relative } => {
            let rel = pathutil::to_posix_string(&relative);
            let dst = target_root.join(&relative);
            let result = retry(RETRY_ATTEMPTS, RETRY_DELAY, || safe_delete(&dst));
            match result {
                Ok(()) => {
                    counters.deletions.fetch_add(1, Ordering::Relaxed);
                }
                Err(err) => {
                    tracing::warn!(path = %rel, error = %err, "delete failed after retries");
                    counters.failures.fetch_add(1, Ordering::Relaxed);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FileEntry;
    use std::fs;
    use std::path::PathBuf;
    use std::time::SystemTime;
    use tempfile::tempdir;

    #[test]
    fn test_pool_executes_copy_and_delete() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("src");
        let dst = dir.path().join("dst");
        fs::create_dir_all(&src).unwrap();
        fs::create_dir_all(&dst).unwrap();
        fs::write(src.join("a.txt"), b"hello").unwrap();
        fs::write(dst.join("stale.txt"), b"old").unwrap();

        let items = vec![
            WorkItem::Copy {
                relative: PathBuf::from("a.txt"),
                src_entry: FileEntry::new(PathBuf::from("a.txt"), 5, SystemTime::now(), 0o644),
            },
            WorkItem::Delete {
                relative: PathBuf::from("stale.txt"),
            },
        ];

        let pool = SyncPool::new(2).unwrap();
        let counts = pool.run(items, &src, &dst);

        assert_eq!(counts.copies, 1);
        assert_eq!(counts.deletions, 1);
        assert_eq!(counts.failures, 0);
        assert!(dst.join("a.txt").exists());
        assert!(!dst.join("stale.txt").exists());
    }

    #[test]
    fn test_pool_empty_plan_is_noop() {
        let dir = tempdir().unwrap();
        let pool = SyncPool::new(2).unwrap();
        let counts = pool.run(vec![], dir.path(), dir.path());
        assert_eq!(counts, PassCounts::default());
    }
}
