//! Parallel, deterministic C# source discovery with directory pruning.
//!
//! Performance optimizations:
//! - Early directory pruning via `WalkDir::filter_entry` (O(1) subtree skip)
//! - Parallel file processing via Rayon's `par_bridge`
//! - Output sorted by path so downstream order never depends on scheduling

use rayon::prelude::*;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::error::{HierError, HierResult};

/// Directories excluded by default: build output, VCS/IDE metadata and
/// Unity's generated folders.
pub const EXCLUDED_DIRS: &[&str] = &["bin", "obj", ".git", ".vs", "Library", "Temp", "node_modules"];

/// Source file extension, compared case-insensitively.
const SOURCE_EXTENSION: &str = "cs";

#[inline]
fn is_excluded_dir(entry: &walkdir::DirEntry, excludes: &HashSet<&str>) -> bool {
    entry.depth() > 0
        && entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| excludes.contains(name))
}

#[inline]
fn is_source_file(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(SOURCE_EXTENSION))
}

/// Gather all `.cs` files under `root`, skipping [`EXCLUDED_DIRS`].
pub fn gather_cs_files(root: &Path) -> HierResult<Vec<PathBuf>> {
    gather_cs_files_with_excludes::<&str>(root, &[])
}

/// Gather all `.cs` files under `root`, skipping the default directories
/// plus `excludes`. A `root` that is itself a `.cs` file yields just that
/// file.
pub fn gather_cs_files_with_excludes<S: AsRef<str>>(
    root: &Path,
    excludes: &[S],
) -> HierResult<Vec<PathBuf>> {
    if !root.exists() {
        return Err(HierError::io(
            root,
            std::io::Error::new(std::io::ErrorKind::NotFound, "path does not exist"),
        ));
    }
    if root.is_file() {
        return if is_source_file(root) {
            Ok(vec![root.to_path_buf()])
        } else {
            Err(HierError::invalid_argument(format!(
                "{} is not a .cs file or directory",
                root.display()
            )))
        };
    }

    let all_excludes: HashSet<&str> = EXCLUDED_DIRS
        .iter()
        .copied()
        .chain(excludes.iter().map(|s| s.as_ref()))
        .collect();

    let mut files = WalkDir::new(root)
        .into_iter()
        .filter_entry(|e| !is_excluded_dir(e, &all_excludes))
        .par_bridge()
        .filter_map(|entry| match entry {
            Ok(e) => is_source_file(e.path()).then(|| Ok(e.path().to_path_buf())),
            Err(e) => {
                let path = e.path().unwrap_or(root).to_path_buf();
                let io = e
                    .into_io_error()
                    .unwrap_or_else(|| std::io::Error::other("directory walk failed"));
                Some(Err(HierError::io(path, io)))
            }
        })
        .collect::<HierResult<Vec<_>>>()?;

    files.sort();
    Ok(files)
}
