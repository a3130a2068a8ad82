//! Diff walk (spec component C) - compares a source tree against a target
//! tree and produces the work items a pass must execute.

use crate::hash::{compute_hash, HashAlgo};
use crate::pathutil;
use crate::scanner::scan_directory;
use crate::types::{FileTree, KopyError, WorkItem};
use std::path::Path;
use std::time::Duration;

/// Walk `source` and `target`, returning the work items needed to bring
/// `target` in line with `source`: copies for new/changed/drifted files and
/// deletions for target entries with no surviving (non-excluded) source
/// counterpart.
pub fn build_plan(
    source: &Path,
    target: &Path,
    excludes: &[glob::Pattern],
) -> Result<Vec<WorkItem>, KopyError> {
    let src_tree = scan_directory(source, excludes)?;
    let dst_tree = scan_directory(target, excludes)?;

    let mut items = Vec::new();
    items.extend(copy_plan(source, &src_tree, &dst_tree)?);
    items.extend(delete_plan(&src_tree, &dst_tree));
    Ok(items)
}

fn copy_plan(
    source: &Path,
    src_tree: &FileTree,
    dst_tree: &FileTree,
) -> Result<Vec<WorkItem>, KopyError> {
    let mut items = Vec::new();

    for (relative, src_entry) in src_tree.iter() {
        let needs_copy = match dst_tree.get(relative) {
            None => true,
            Some(dst_entry) => {
                if src_entry.is_symlink || dst_entry.is_symlink {
                    src_entry.symlink_target != dst_entry.symlink_target
                } else if src_entry.mtime > dst_entry.mtime {
                    let src_path = pathutil::join_relative(source, &pathutil::to_posix_string(relative));
                    let dst_path = pathutil::join_relative(&dst_tree.root_path, &pathutil::to_posix_string(relative));
                    content_differs(&src_path, &dst_path)?
                } else {
                    false
                }
            }
        };

        if needs_copy {
            items.push(WorkItem::Copy {
                relative: relative.clone(),
                src_entry: src_entry.clone(),
            });
        }
    }

    Ok(items)
}

fn delete_plan(src_tree: &FileTree, dst_tree: &FileTree) -> Vec<WorkItem> {
    dst_tree
        .paths()
        .filter(|relative| !src_tree.contains(relative))
        .map(|relative| WorkItem::Delete {
            relative: relative.clone(),
        })
        .collect()
}

/// Only reached when src's mtime is strictly newer: hash both sides to
/// avoid a copy when a newer mtime doesn't actually carry new content.
fn content_differs(src_path: &Path, dst_path: &Path) -> Result<bool, KopyError> {
    let src_hash = compute_hash(src_path, HashAlgo::Blake3)?;
    let dst_hash = compute_hash(dst_path, HashAlgo::Blake3)?;
    Ok(src_hash != dst_hash)
}

pub const RETRY_ATTEMPTS: u32 = 3;
pub const RETRY_DELAY: Duration = Duration::from_millis(300);
