//! Controller: owns the live task set and the config-file watcher,
//! encapsulating what would otherwise be module-level global state.

use crate::config::{load_tasks, TaskConfig};
use crate::task::Task;
use crate::types::KopyError;
use crate::watch::ConfigReloader;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Owns every running `Task` and the watcher on the config file itself.
/// `reload()` stops and rebuilds the whole task set without dropping
/// in-flight work in any individual pass (each task's own pass lock is
/// independent of the controller's rebuild).
pub struct Controller {
    config_path: PathBuf,
    tasks: Mutex<Vec<Arc<Task>>>,
    reloader: Mutex<Option<ConfigReloader>>,
}

impl Controller {
    pub fn new(config_path: PathBuf) -> Arc<Self> {
        Arc::new(Self {
            config_path,
            tasks: Mutex::new(Vec::new()),
            reloader: Mutex::new(None),
        })
    }

    /// Build and start every task from the config file, then begin
    /// watching the config file itself for changes.
    pub fn start(self: &Arc<Self>) -> Result<(), KopyError> {
        self.rebuild()?;

        let weak = Arc::downgrade(self);
        let reloader = ConfigReloader::new(&self.config_path, move || {
            if let Some(controller) = weak.upgrade() {
                tracing::info!("config file changed, reloading tasks");
                if let Err(err) = controller.reload() {
                    tracing::error!(error = %err, "config reload failed");
                }
            }
        })?;
        *self.reloader.lock().expect("poisoned") = Some(reloader);

        Ok(())
    }

    /// Stop every task and the config watcher.
    pub fn stop(&self) {
        self.reloader.lock().expect("poisoned").take();
        let mut tasks = self.tasks.lock().expect("poisoned");
        for task in tasks.drain(..) {
            task.stop();
        }
    }

    /// Stop all current tasks and rebuild from the config file on disk.
    /// A task that fails to validate is logged and skipped; the rest
    /// still start.
    pub fn reload(&self) -> Result<(), KopyError> {
        {
            let mut tasks = self.tasks.lock().expect("poisoned");
            for task in tasks.drain(..) {
                task.stop();
            }
        }
        self.rebuild()
    }

    fn rebuild(&self) -> Result<(), KopyError> {
        let configs = load_tasks(&self.config_path)?;
        let mut started = Vec::with_capacity(configs.len());

        for config in configs {
            match self.start_one(config) {
                Ok(task) => started.push(task),
                Err(err) => {
                    tracing::error!(error = %err, "task failed to start, skipping");
                }
            }
        }

        *self.tasks.lock().expect("poisoned") = started;
        Ok(())
    }

    fn start_one(&self, config: TaskConfig) -> Result<Arc<Task>, KopyError> {
        let task = Task::new(config)?;
        task.start()?;
        Ok(task)
    }

    /// Run a single pass per task and return without starting watchers;
    /// used for `--once`.
    pub fn run_once(config_path: &Path) -> Result<(), KopyError> {
        let configs = load_tasks(config_path)?;
        for config in configs {
            let name = config.name.clone();
            let reporter = crate::ui::PassReporter::start(&name);
            match Task::new(config).and_then(|task| task.run_once_pass()) {
                Ok(counts) => reporter.finish(counts.copies, counts.deletions, counts.failures),
                Err(err) => {
                    tracing::error!(task = name.as_str(), error = %err, "task failed");
                    reporter.finish_error(&err.to_string());
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_controller_run_once_syncs_task() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("src");
        let target = dir.path().join("dst");
        fs::create_dir_all(&source).unwrap();
        fs::write(source.join("a.txt"), b"data").unwrap();

        let config_path = dir.path().join("config.json");
        fs::write(
            &config_path,
            serde_json::json!({
                "tasks": [{
                    "name": "t",
                    "source": source.to_string_lossy(),
                    "target": target.to_string_lossy(),
                }]
            })
            .to_string(),
        )
        .unwrap();

        Controller::run_once(&config_path).unwrap();

        assert!(target.join("a.txt").exists());
    }

    #[test]
    fn test_controller_skips_invalid_task_without_aborting() {
        let dir = tempdir().unwrap();
        let good_source = dir.path().join("good_src");
        let good_target = dir.path().join("good_dst");
        fs::create_dir_all(&good_source).unwrap();
        fs::write(good_source.join("x.txt"), b"x").unwrap();

        let config_path = dir.path().join("config.json");
        fs::write(
            &config_path,
            serde_json::json!({
                "tasks": [
                    {
                        "name": "missing",
                        "source": dir.path().join("does_not_exist").to_string_lossy(),
                        "target": dir.path().join("dst_missing").to_string_lossy(),
                    },
                    {
                        "name": "good",
                        "source": good_source.to_string_lossy(),
                        "target": good_target.to_string_lossy(),
                    }
                ]
            })
            .to_string(),
        )
        .unwrap();

        let controller = Controller::new(config_path);
        let result = controller.rebuild();

        assert!(result.is_ok());
        assert!(good_target.join("x.txt").exists());
    }
}
