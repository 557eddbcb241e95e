//! Classpath discovery of class snapshots.
//!
//! A classpath directory holds one `<Class>.class.json` snapshot per class,
//! laid out by package (`pkg/sub/App.class.json` for `pkg.sub.App`).

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use walkdir::WalkDir;

/// File suffix of a class snapshot.
pub const SNAPSHOT_SUFFIX: &str = ".class.json";

/// Directories never holding snapshots.
const EXCLUDED_DIRS: &[&str] = &[".git", ".idea", "META-INF"];

#[inline]
fn is_excluded_dir(entry: &walkdir::DirEntry, excludes: &HashSet<&str>) -> bool {
    entry.depth() > 0
        && entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| excludes.contains(name))
}

fn is_snapshot(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.ends_with(SNAPSHOT_SUFFIX) && n.len() > SNAPSHOT_SUFFIX.len())
}

/// Gathers all snapshot files below `classpath`, sorted by path.
pub fn gather_class_files(classpath: &Path) -> Result<Vec<PathBuf>> {
    let excludes: HashSet<&str> = EXCLUDED_DIRS.iter().copied().collect();

    let mut files = WalkDir::new(classpath)
        .into_iter()
        .filter_entry(|e| !is_excluded_dir(e, &excludes))
        .filter_map(|entry| match entry {
            Ok(e) => {
                let path = e.path();
                if e.file_type().is_file() && is_snapshot(path) {
                    Some(Ok(path.to_path_buf()))
                } else {
                    None
                }
            }
            Err(e) => Some(Err(e.into())),
        })
        .collect::<Result<Vec<_>>>()
        .with_context(|| format!("Failed to gather class snapshots from {}", classpath.display()))?;

    files.sort();
    Ok(files)
}

/// Dotted class name of a snapshot file relative to its classpath.
///
/// Returns `None` if `file` is not below `classpath` or is not a snapshot.
pub fn class_name_for(classpath: &Path, file: &Path) -> Option<String> {
    let relative = file.strip_prefix(classpath).ok()?;
    let mut parts: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();

    let last = parts.pop()?;
    let stem = last.strip_suffix(SNAPSHOT_SUFFIX)?;
    if stem.is_empty() {
        return None;
    }
    parts.push(stem.to_string());
    Some(parts.join("."))
}

/// Class names available on `classpath`, in path order.
pub fn gather_class_names(classpath: &Path) -> Result<Vec<String>> {
    Ok(gather_class_files(classpath)?
        .iter()
        .filter_map(|f| class_name_for(classpath, f))
        .collect())
}
