//! Filesystem watcher (spec component E) - wraps `notify` +
//! `notify-debouncer-mini` to deliver coalesced batches of changed paths.

use crate::types::KopyError;
use notify::{Config, RecursiveMode};
use notify_debouncer_mini::{new_debouncer_opt, DebounceEventResult, Debouncer};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEBOUNCE: Duration = Duration::from_secs(1);

#[cfg(target_os = "macos")]
type PlatformWatcher = notify::PollWatcher;
#[cfg(not(target_os = "macos"))]
type PlatformWatcher = notify::RecommendedWatcher;

/// A live subscription on one directory root. Dropping it stops delivery -
/// `notify`'s own unsubscribe-on-drop releases the platform watch handle.
pub struct TaskWatcher {
    _debouncer: Debouncer<PlatformWatcher>,
}

impl TaskWatcher {
    /// Watch `root` recursively, invoking `on_batch` with the deduplicated
    /// set of changed paths once events have been quiet for `debounce`.
    ///
    /// On macOS, `notify`'s native FSEvents backend can coalesce or drop
    /// events under rapid churn, so this crate pins the polling backend
    /// there explicitly rather than trusting the platform default.
    pub fn new<F>(root: &Path, debounce: Duration, on_batch: F) -> Result<Self, KopyError>
    where
        F: Fn(Vec<PathBuf>) + Send + 'static,
    {
        let handler = move |result: DebounceEventResult| match result {
            Ok(events) => {
                let paths: Vec<PathBuf> = events.into_iter().map(|e| e.path).collect();
                if !paths.is_empty() {
                    on_batch(paths);
                }
            }
            Err(errors) => {
                for error in errors {
                    tracing::warn!(error = %error, "watcher delivery error");
                }
            }
        };

        let mut debouncer =
            new_debouncer_opt::<_, PlatformWatcher>(debounce, None, handler, Config::default())
                .map_err(|e| KopyError::Watcher(e.to_string()))?;

        debouncer
            .watcher()
            .watch(root, RecursiveMode::Recursive)
            .map_err(|e| KopyError::Watcher(e.to_string()))?;

        Ok(Self {
            _debouncer: debouncer,
        })
    }
}
