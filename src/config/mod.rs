//! Task configuration: loading, validation, and pair derivation.

mod cli;

pub use cli::Cli;

use crate::types::KopyError;
use serde::{Deserialize, Deserializer};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

fn default_workers() -> usize {
    4
}

/// Accept either a single path or a list of paths in the same JSON field,
/// so `"source"`/`"target"` singular aliases can carry one value without
/// requiring callers to wrap it in an array.
fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<PathBuf>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(PathBuf),
        Many(Vec<PathBuf>),
    }

    match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(path) => Ok(vec![path]),
        OneOrMany::Many(paths) => Ok(paths),
    }
}

/// One task's configuration as parsed from `config.json`.
#[derive(Debug, Clone, Deserialize)]
pub struct TaskConfig {
    pub name: String,

    #[serde(alias = "source", deserialize_with = "one_or_many")]
    pub sources: Vec<PathBuf>,

    #[serde(alias = "target", deserialize_with = "one_or_many")]
    pub targets: Vec<PathBuf>,

    #[serde(default)]
    pub exclude: Vec<String>,

    #[serde(default = "default_workers")]
    pub workers: usize,

    #[serde(default)]
    pub log: Option<PathBuf>,
}

impl TaskConfig {
    /// Log path for this task, defaulting to `logs/{name}.log`.
    pub fn log_path(&self) -> PathBuf {
        self.log
            .clone()
            .unwrap_or_else(|| PathBuf::from("logs").join(format!("{}.log", self.name)))
    }

    /// Derive (source, target) pairs per the zip / fan-out / fan-in rule:
    /// equal lengths zip positionally; one source with many targets fans
    /// out; many sources with one target fan in. Any other length mismatch
    /// is rejected.
    pub fn pairs(&self) -> Result<Vec<(PathBuf, PathBuf)>, KopyError> {
        match (self.sources.len(), self.targets.len()) {
            (0, _) | (_, 0) => Err(KopyError::Config(format!(
                "task '{}' must declare at least one source and one target",
                self.name
            ))),
            (s, t) if s == t => Ok(self
                .sources
                .iter()
                .cloned()
                .zip(self.targets.iter().cloned())
                .collect()),
            (1, _) => Ok(self
                .targets
                .iter()
                .cloned()
                .map(|target| (self.sources[0].clone(), target))
                .collect()),
            (_, 1) => Ok(self
                .sources
                .iter()
                .cloned()
                .map(|source| (source, self.targets[0].clone()))
                .collect()),
            (s, t) => Err(KopyError::Config(format!(
                "task '{}' has {} sources and {} targets; lengths must match, or one side must be singular",
                self.name, s, t
            ))),
        }
    }

    /// Validate that every source exists and is a directory, and that every
    /// target is writable (created if missing, then probed).
    pub fn validate(&self) -> Result<(), KopyError> {
        for source in &self.sources {
            if !source.is_dir() {
                return Err(KopyError::Validation(format!(
                    "task '{}': source '{}' does not exist or is not a directory",
                    self.name,
                    source.display()
                )));
            }
        }

        for target in &self.targets {
            fs::create_dir_all(target).map_err(|e| KopyError::from_io_at(target, e))?;
            probe_writable(target).map_err(|_| {
                KopyError::Validation(format!(
                    "task '{}': target '{}' is not writable",
                    self.name,
                    target.display()
                ))
            })?;
        }

        Ok(())
    }
}

/// Write and remove a `.sync_test_{epoch}` marker file to confirm a target
/// directory actually accepts writes, grounded on the original
/// implementation's write-probe validation.
fn probe_writable(target: &Path) -> Result<(), KopyError> {
    let epoch = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    let probe = target.join(format!(".sync_test_{epoch}"));
    fs::write(&probe, b"probe").map_err(|e| KopyError::from_io_at(&probe, e))?;
    fs::remove_file(&probe).map_err(|e| KopyError::from_io_at(&probe, e))
}

#[derive(Debug, Deserialize)]
struct ConfigFile {
    tasks: Vec<TaskConfig>,
}

/// Parse `config.json` at `path` into its task list. Does not validate
/// individual tasks - that is `Controller::rebuild`'s job, since one
/// invalid task should not abort the whole reload.
pub fn load_tasks(path: &Path) -> Result<Vec<TaskConfig>, KopyError> {
    let raw = fs::read_to_string(path).map_err(|e| KopyError::from_io_at(path, e))?;
    let parsed: ConfigFile = serde_json::from_str(&raw)
        .map_err(|e| KopyError::Config(format!("failed to parse {}: {e}", path.display())))?;
    Ok(parsed.tasks)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(sources: &[&str], targets: &[&str]) -> TaskConfig {
        TaskConfig {
            name: "t".to_string(),
            sources: sources.iter().map(PathBuf::from).collect(),
            targets: targets.iter().map(PathBuf::from).collect(),
            exclude: vec![],
            workers: 4,
            log: None,
        }
    }

    #[test]
    fn test_pairs_zip_equal_lengths() {
        let cfg = config(&["a", "b"], &["x", "y"]);
        let pairs = cfg.pairs().unwrap();
        assert_eq!(
            pairs,
            vec![
                (PathBuf::from("a"), PathBuf::from("x")),
                (PathBuf::from("b"), PathBuf::from("y")),
            ]
        );
    }

    #[test]
    fn test_pairs_fan_out_one_source() {
        let cfg = config(&["a"], &["x", "y", "z"]);
        let pairs = cfg.pairs().unwrap();
        assert_eq!(pairs.len(), 3);
        assert!(pairs.iter().all(|(s, _)| s == &PathBuf::from("a")));
    }

    #[test]
    fn test_pairs_fan_in_one_target() {
        let cfg = config(&["a", "b", "c"], &["x"]);
        let pairs = cfg.pairs().unwrap();
        assert_eq!(pairs.len(), 3);
        assert!(pairs.iter().all(|(_, t)| t == &PathBuf::from("x")));
    }

    #[test]
    fn test_pairs_mismatch_rejected() {
        let cfg = config(&["a", "b"], &["x", "y", "z"]);
        assert!(cfg.pairs().is_err());
    }

    #[test]
    fn test_deserialize_singular_aliases() {
        let json = r#"{"name":"t","source":"/a","target":"/b"}"#;
        let cfg: TaskConfig = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.sources, vec![PathBuf::from("/a")]);
        assert_eq!(cfg.targets, vec![PathBuf::from("/b")]);
        assert_eq!(cfg.workers, 4);
    }

    #[test]
    fn test_log_path_default() {
        let cfg = config(&["a"], &["b"]);
        assert_eq!(cfg.log_path(), PathBuf::from("logs/t.log"));
    }
}
