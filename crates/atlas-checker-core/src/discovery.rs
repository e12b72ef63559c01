use std::path::{Path, PathBuf};

use log::warn;
use walkdir::WalkDir;

use crate::error::{Error, Result};

/// Reserved name identifying a label directory.
pub const LABEL_DIR_NAME: &str = "atlaslabel_def_origspace";

/// Recursively locate label directories under the given root.
///
/// An entry matches if its name is exactly [`LABEL_DIR_NAME`] and it is a
/// directory; files coincidentally sharing the name are ignored. Matches
/// are collected at any depth, returned as absolute paths in sorted order.
///
/// Symlinks are not followed, so a symlink cycle cannot trap the walk;
/// behavior for trees that reach the same directory through multiple
/// symlinked routes is unspecified.
pub fn find_label_directories(root: &Path) -> Result<Vec<PathBuf>> {
    if !root.is_dir() {
        return Err(Error::InvalidRootPath(root.to_path_buf()));
    }

    let mut found = Vec::new();
    for entry in WalkDir::new(root) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                // Unreadable subtrees are skipped, not fatal
                warn!("Skipping unreadable entry during scan: {}", e);
                continue;
            }
        };

        if entry.file_type().is_dir() && entry.file_name() == LABEL_DIR_NAME {
            found.push(absolute(entry.path()));
        }
    }

    found.sort();
    Ok(found)
}

/// Absolute form of a walked path, for use as a stable report key.
fn absolute(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| {
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    })
}

// -- Tests --
