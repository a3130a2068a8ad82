//! Task: one configured sync job, its pass lock, pending-path accumulator,
//! watchers, and heartbeat.

use crate::config::TaskConfig;
use crate::ops::cleanup_tmp_files;
use crate::pathutil::{self, compile_patterns};
use crate::sync::{run_pass, Pair, PassCounts, SyncPool};
use crate::types::KopyError;
use crate::watch::TaskWatcher;
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, TryLockError, Weak};
use std::thread;
use std::time::Duration;

pub const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(3600);
const HEARTBEAT_POLL: Duration = Duration::from_secs(1);

/// One configured synchronization job: its pairs, pool, pass lock, pending
/// changes, watchers, and heartbeat.
pub struct Task {
    config: TaskConfig,
    excludes: Vec<glob::Pattern>,
    pairs: Vec<Pair>,
    pool: SyncPool,
    pass_lock: Mutex<()>,
    pending: AtomicBool,
    pending_paths: Mutex<HashSet<PathBuf>>,
    watchers: Mutex<Vec<TaskWatcher>>,
    heartbeat_stop: Arc<AtomicBool>,
    heartbeat_handle: Mutex<Option<thread::JoinHandle<()>>>,
}

impl Task {
    pub fn new(config: TaskConfig) -> Result<Arc<Self>, KopyError> {
        config.validate()?;
        let excludes = compile_patterns(&config.exclude)?;
        let pairs = config.pairs()?;
        let pool = SyncPool::new(config.workers)?;

        Ok(Arc::new(Self {
            config,
            excludes,
            pairs,
            pool,
            pass_lock: Mutex::new(()),
            pending: AtomicBool::new(false),
            pending_paths: Mutex::new(HashSet::new()),
            watchers: Mutex::new(Vec::new()),
            heartbeat_stop: Arc::new(AtomicBool::new(false)),
            heartbeat_handle: Mutex::new(None),
        }))
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// Run exactly one pass and return its counts, without the reentrancy
    /// dance `sync()` does for watch mode - used by `--once`, where there
    /// are no concurrent watcher callbacks to guard against.
    pub fn run_once_pass(&self) -> Result<PassCounts, KopyError> {
        for (_, target) in &self.pairs {
            cleanup_tmp_files(target)?;
        }
        run_pass(&self.pairs, &self.excludes, &self.pool).map_err(|err| KopyError::Pass {
            task: self.name().to_string(),
            message: err.to_string(),
        })
    }

    /// Run an initial full sync, begin watching every source root, and
    /// spawn the heartbeat. `self` must be wrapped in an `Arc` so the
    /// watcher callbacks can hold a non-owning `Weak` back-reference.
    pub fn start(self: &Arc<Self>) -> Result<(), KopyError> {
        for (_, target) in &self.pairs {
            cleanup_tmp_files(target)?;
        }

        tracing::info!(task = self.name(), "initial sync");
        self.sync();

        let mut watchers = self.watchers.lock().expect("watcher lock poisoned");
        let mut seen_roots = HashSet::new();
        for (source, _) in &self.pairs {
            if !seen_roots.insert(source.clone()) {
                continue;
            }
            let weak: Weak<Task> = Arc::downgrade(self);
            let source_clone = source.clone();
            let watcher = TaskWatcher::new(source, crate::watch::fswatch::DEBOUNCE, move |paths| {
                if let Some(task) = weak.upgrade() {
                    task.record_changes(&source_clone, paths);
                    task.sync();
                }
            })?;
            watchers.push(watcher);
        }
        drop(watchers);

        self.spawn_heartbeat();
        Ok(())
    }

    /// Stop every watcher and cancel the heartbeat. Watchers are dropped,
    /// which releases `notify`'s platform subscription.
    pub fn stop(&self) {
        self.heartbeat_stop.store(true, Ordering::SeqCst);
        if let Some(handle) = self.heartbeat_handle.lock().expect("poisoned").take() {
            let _ = handle.join();
        }
        self.watchers.lock().expect("poisoned").clear();
    }

    fn record_changes(&self, root: &std::path::Path, paths: Vec<PathBuf>) {
        let mut pending = self.pending_paths.lock().expect("poisoned");
        for path in paths {
            if let Some(relative) = pathutil::relative_posix(&path, root) {
                pending.insert(PathBuf::from(relative));
            }
        }
    }

    /// Non-blocking reentrant pass trigger: attempts `try_lock`; on
    /// contention, sets the pending flag and returns immediately instead of
    /// blocking, so a watcher callback never stalls waiting on an
    /// in-flight pass. The holder checks the flag before releasing and
    /// loops if another change arrived mid-pass, guaranteeing no event is
    /// ever silently dropped.
    pub fn sync(&self) {
        let guard = match self.pass_lock.try_lock() {
            Ok(guard) => guard,
            Err(TryLockError::WouldBlock) => {
                self.pending.store(true, Ordering::SeqCst);
                return;
            }
            Err(TryLockError::Poisoned(_)) => {
                tracing::error!(task = self.name(), "pass lock poisoned, recovering");
                return;
            }
        };

        loop {
            let changed = {
                let mut pending = self.pending_paths.lock().expect("poisoned");
                let n = pending.len();
                pending.clear();
                n
            };
            tracing::info!(task = self.name(), changed, "detected {changed} changes");

            match run_pass(&self.pairs, &self.excludes, &self.pool) {
                Ok(counts) => {
                    tracing::info!(
                        task = self.name(),
                        copies = counts.copies,
                        deletions = counts.deletions,
                        failures = counts.failures,
                        "pass complete"
                    );
                }
                Err(err) => {
                    let pass_err = KopyError::Pass {
                        task: self.name().to_string(),
                        message: err.to_string(),
                    };
                    tracing::error!(task = self.name(), error = %pass_err, "pass failed");
                }
            }

            if self.pending.swap(false, Ordering::SeqCst) {
                continue;
            }
            break;
        }

        drop(guard);
    }

    fn spawn_heartbeat(self: &Arc<Self>) {
        let stop = Arc::clone(&self.heartbeat_stop);
        let name = self.config.name.clone();
        let handle = thread::Builder::new()
            .name(format!("heartbeat-{name}"))
            .spawn(move || {
                let mut elapsed = Duration::from_secs(0);
                while !stop.load(Ordering::SeqCst) {
                    thread::sleep(HEARTBEAT_POLL);
                    elapsed += HEARTBEAT_POLL;
                    if elapsed >= HEARTBEAT_INTERVAL {
                        tracing::info!(task = name.as_str(), "task alive");
                        elapsed = Duration::from_secs(0);
                    }
                }
            })
            .expect("spawn heartbeat thread");
        *self.heartbeat_handle.lock().expect("poisoned") = Some(handle);
    }
}
