// src/recipe/kitchen/copy.rs

//! Filtered copy from build output into the install tree
//!
//! Used for both header installation (`.h`) and library installation
//! (`.a` / `.lib`). Copies are additive: nothing already in the destination
//! is removed, so files left over from an older upstream layout stay behind.

use crate::error::{Error, Result};
use std::fs;
use std::path::Path;
use tracing::debug;
use walkdir::WalkDir;

/// Recursively copy regular files whose name ends with `filter` (or every
/// regular file when `filter` is `None`), preserving relative paths
///
/// Returns the number of files copied.
pub fn filter_copy(src: &Path, dst: &Path, filter: Option<&str>) -> Result<usize> {
    if !src.is_dir() {
        return Err(Error::IoError(format!(
            "Copy source {} is not a directory",
            src.display()
        )));
    }
    fs::create_dir_all(dst)?;

    let mut copied = 0;
    for entry in WalkDir::new(src).min_depth(1) {
        let entry = entry.map_err(|e| {
            Error::IoError(format!("Failed to walk {}: {}", src.display(), e))
        })?;
        if !entry.file_type().is_file() || !matches_filter(entry.file_name(), filter) {
            continue;
        }

        let relative = entry.path().strip_prefix(src).map_err(|e| {
            Error::IoError(format!("Unexpected path {}: {}", entry.path().display(), e))
        })?;
        let target = dst.join(relative);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(entry.path(), &target)?;
        copied += 1;
    }

    debug!(
        "Copied {} file(s) from {} to {}",
        copied,
        src.display(),
        dst.display()
    );
    Ok(copied)
}

/// Copy only the regular files directly inside `src`
pub fn copy_top_level(src: &Path, dst: &Path) -> Result<usize> {
    if !src.is_dir() {
        return Err(Error::IoError(format!(
            "Copy source {} is not a directory",
            src.display()
        )));
    }
    fs::create_dir_all(dst)?;

    let mut copied = 0;
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            fs::copy(entry.path(), dst.join(entry.file_name()))?;
            copied += 1;
        }
    }
    Ok(copied)
}

fn matches_filter(name: &std::ffi::OsStr, filter: Option<&str>) -> bool {
    match filter {
        None => true,
        Some(suffix) => name.to_string_lossy().ends_with(suffix),
    }
}
