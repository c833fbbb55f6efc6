// src/recipe/kitchen/acquire.rs

//! Turning a recipe's URL into an unpacked source tree
//!
//! The unpacked directory under `sources_dir` is the local idempotency
//! guard: once it exists, acquisition is a no-op. Extraction goes through a
//! staging directory next to it and is moved into place only when the
//! expected top-level directory appeared, so an interrupted or mismatched
//! extraction never leaves a directory that a later run would trust.

use super::archive::{archive_filename, extract_archive};
use super::fetch::Fetcher;
use crate::error::{Error, Result};
use crate::recipe::{ArchiveLayout, Recipe};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

pub struct SourceAcquirer {
    fetcher: Arc<dyn Fetcher>,
}

impl SourceAcquirer {
    pub fn new(fetcher: Arc<dyn Fetcher>) -> Self {
        Self { fetcher }
    }

    /// Make sure the recipe's sources are unpacked and return their directory
    pub fn acquire(&self, recipe: &dyn Recipe) -> Result<PathBuf> {
        let unpacked = recipe.unpacked_sources_dir();
        if unpacked.is_dir() {
            debug!("Sources for {} already at {}", recipe.package_name(), unpacked.display());
            return Ok(unpacked);
        }

        let url = recipe.url();
        let filename = archive_filename(&url)?;

        if !recipe.is_archive() {
            fs::create_dir_all(&unpacked)?;
            let target = unpacked.join(&filename);
            if let Err(e) = self.fetcher.fetch(&url, &target) {
                // An empty directory would satisfy the short-circuit next time
                let _ = fs::remove_dir_all(&unpacked);
                return Err(e);
            }
            return Ok(unpacked);
        }

        let sources_dir = &recipe.settings().sources_dir;
        fs::create_dir_all(sources_dir)?;

        let archive = sources_dir.join(stored_archive_name(recipe, &filename));
        if archive.is_file() {
            info!("Reusing downloaded {}", archive.display());
        } else {
            self.fetcher.fetch(&url, &archive)?;
        }

        if let Err(e) = self.unpack(recipe, &archive, sources_dir, &unpacked) {
            // The next attempt downloads a fresh copy
            if let Err(rm) = fs::remove_file(&archive) {
                warn!("Failed to remove {}: {}", archive.display(), rm);
            }
            return Err(e);
        }
        Ok(unpacked)
    }

    fn unpack(
        &self,
        recipe: &dyn Recipe,
        archive: &Path,
        sources_dir: &Path,
        unpacked: &Path,
    ) -> Result<()> {
        let dir_name = recipe.unpacked_dir_name();
        let staging = tempfile::Builder::new()
            .prefix(".unpack-")
            .tempdir_in(sources_dir)?;

        let expected = staging.path().join(&dir_name);
        let target = match recipe.archive_layout() {
            ArchiveLayout::Rooted => staging.path().to_path_buf(),
            ArchiveLayout::Flat => expected.clone(),
        };

        info!("Unpacking {} for {}", archive.display(), recipe.package_name());
        extract_archive(archive, &target)?;

        if !expected.is_dir() {
            return Err(Error::ArchiveError {
                archive: archive.display().to_string(),
                reason: format!(
                    "expected top-level directory {}, found [{}]",
                    dir_name,
                    top_level_entries(staging.path()).join(", ")
                ),
            });
        }

        fs::rename(&expected, unpacked).map_err(|e| {
            Error::IoError(format!(
                "Failed to move unpacked sources to {}: {}",
                unpacked.display(),
                e
            ))
        })?;
        Ok(())
    }
}

/// File name of the downloaded archive under `sources_dir`
///
/// Tag archives such as `.../archive/v3.0.1.zip` do not name their package,
/// so the package name is prefixed unless the file name already starts with it.
fn stored_archive_name(recipe: &dyn Recipe, filename: &str) -> String {
    let package = recipe.package_name();
    if filename.starts_with(&package) {
        filename.to_string()
    } else {
        format!("{}-{}", package, filename)
    }
}

fn top_level_entries(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .map(|entries| {
            entries
                .filter_map(|e| e.ok())
                .map(|e| e.file_name().to_string_lossy().to_string())
                .collect()
        })
        .unwrap_or_default();
    names.sort();
    names
}
