//! Path normalization utilities
//!
//! Ensures all candidate paths use '/' as separator regardless of host.

use std::fs;
use std::path::{Component, Path, PathBuf};

/// Normalize a path to use '/' as separator (for cross-platform consistency)
pub fn normalize_path(path: &Path) -> String {
    normalize_separators(&path.to_string_lossy())
}

/// Replace every backslash with '/'
pub fn normalize_separators(s: &str) -> String {
    s.replace('\\', "/")
}

/// Make a path relative to the root directory
pub fn make_relative(path: &Path, root: &Path) -> Option<String> {
    path.strip_prefix(root).ok().map(normalize_path)
}

/// Resolve `path` against `cwd` without touching the filesystem.
pub fn absolutize(path: &Path, cwd: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    }
}

/// Lexically drop `.` segments and fold `..` into the preceding segment.
/// `..` directly under the root stays at the root.
pub fn clean_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other),
        }
    }
    out
}

/// Absolute output path with its parent canonicalized when it exists, so it
/// compares equal to walked candidate paths.
pub fn resolve_output_path(path: &Path, cwd: &Path) -> PathBuf {
    let absolute = absolutize(path, cwd);
    match (absolute.parent(), absolute.file_name()) {
        (Some(parent), Some(name)) => match fs::canonicalize(parent) {
            Ok(parent) => parent.join(name),
            Err(_) => absolute,
        },
        _ => absolute,
    }
}

/// True when the input contains glob metacharacters.
pub fn is_glob_pattern(s: &str) -> bool {
    s.contains(['*', '?', '[', ']'])
}

/// Heading path for a rendered file: relative to `cwd` when beneath it,
/// otherwise the candidate's own relative path.
pub fn display_path(absolute: &Path, cwd: &Path, fallback: &str) -> String {
    match make_relative(absolute, cwd) {
        Some(rel) if !rel.is_empty() => rel,
        _ => fallback.to_string(),
    }
}

/// Final path component as a string (empty for roots).
pub fn base_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}
