//! Pass orchestration (spec component C) - runs one sync pass across every
//! pair belonging to a task.

use crate::sync::plan::build_plan;
use crate::sync::pool::{PassCounts, SyncPool};
use crate::types::KopyError;
use std::path::PathBuf;

/// A resolved (source_root, target_root) derived from `TaskConfig::pairs()`.
pub type Pair = (PathBuf, PathBuf);

/// Run one full pass over every pair: walk, diff, then execute. Returns the
/// summed counts across all pairs so the caller can log a single per-task
/// summary line.
pub fn run_pass(
    pairs: &[Pair],
    excludes: &[glob::Pattern],
    pool: &SyncPool,
) -> Result<PassCounts, KopyError> {
    let mut total = PassCounts::default();

    for (source, target) in pairs {
        let items = build_plan(source, target, excludes)?;
        let counts = pool.run(items, source, target);
        total.copies += counts.copies;
        total.deletions += counts.deletions;
        total.failures += counts.failures;
    }

    Ok(total)
}
