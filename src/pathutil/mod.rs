//! Path and pattern utilities (spec component A)

use crate::types::KopyError;
use std::path::{Path, PathBuf};

/// Compile a list of glob patterns, surfacing the first invalid one as a
/// `KopyError::Config`.
pub fn compile_patterns(patterns: &[String]) -> Result<Vec<glob::Pattern>, KopyError> {
    patterns
        .iter()
        .map(|pattern| {
            glob::Pattern::new(pattern)
                .map_err(|e| KopyError::Config(format!("invalid exclude pattern '{pattern}': {e}")))
        })
        .collect()
}

/// Render a relative path using forward slashes regardless of platform, so
/// glob patterns written with POSIX separators match consistently.
pub fn to_posix_string(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// Compute `path`'s location relative to `base` and return it POSIX-normalized.
pub fn relative_posix(path: &Path, base: &Path) -> Option<String> {
    path.strip_prefix(base).ok().map(to_posix_string)
}

/// Decide whether `relative` (already POSIX-normalized, relative to its sync
/// root) is excluded by any of `patterns`.
///
/// Per spec 4.A this is a pure glob match against the relative path; it does
/// not consult `.gitignore`/`.ignore` files (that precedence layering was a
/// teacher-specific feature not called for in the mirror/no-orphan
/// invariants, which only mention the task's own `exclude` patterns).
pub fn should_exclude(relative: &str, patterns: &[glob::Pattern]) -> bool {
    patterns.iter().any(|pattern| pattern.matches(relative))
}

/// Convenience wrapper combining `relative_posix` + `should_exclude` for a
/// path known to live under `base`.
pub fn is_excluded(path: &Path, base: &Path, patterns: &[glob::Pattern]) -> bool {
    match relative_posix(path, base) {
        Some(relative) => should_exclude(&relative, patterns),
        None => false,
    }
}

/// Join a POSIX-style relative path string back into a PathBuf rooted at `base`.
pub fn join_relative(base: &Path, relative: &str) -> PathBuf {
    let mut out = base.to_path_buf();
    for part in relative.split('/') {
        if !part.is_empty() {
            out.push(part);
        }
    }
    out
}
