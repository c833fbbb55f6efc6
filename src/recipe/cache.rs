// src/recipe/cache.rs

//! Revision fingerprint cache
//!
//! Rebuilding a native dependency can take tens of minutes, so before doing
//! anything else the kitchen asks this cache whether the recipe's current
//! fingerprint (`version` plus script revision) was already installed.
//!
//! One marker file per recipe lives beside the install trees:
//! `<common_build_dir>/<name>.revision`. The marker is the only thing
//! trusted; the install tree itself is not hashed. A marker is only written
//! after a pipeline reached COMMITTED.

use crate::error::{Error, Result};
use crate::recipe::Recipe;
use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

const MARKER_EXTENSION: &str = "revision";

/// Outcome of comparing the recorded fingerprint with the recipe's
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheStatus {
    /// Recorded fingerprint matches and the install tree exists
    Fresh,
    /// Nothing recorded for this recipe
    Missing,
    /// A different fingerprint was recorded
    Stale { recorded: String },
    /// Fingerprint matches but the install tree is gone
    Inconsistent { reason: String },
}

impl CacheStatus {
    pub fn is_fresh(&self) -> bool {
        matches!(self, Self::Fresh)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Fresh => "up to date",
            Self::Missing => "not built",
            Self::Stale { .. } => "outdated",
            Self::Inconsistent { .. } => "inconsistent",
        }
    }
}

/// Per-recipe fingerprint markers on disk
#[derive(Debug, Clone)]
pub struct RevisionCache {
    dir: PathBuf,
}

impl RevisionCache {
    /// Cache storing markers in `dir`
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn marker_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}.{}", name, MARKER_EXTENSION))
    }

    /// The fingerprint recorded for a recipe name, if any
    pub fn recorded(&self, name: &str) -> Result<Option<String>> {
        match fs::read_to_string(self.marker_path(name)) {
            Ok(content) => Ok(Some(content.trim().to_string())),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::IoError(format!(
                "Failed to read revision marker for {}: {}",
                name, e
            ))),
        }
    }

    /// Compare the recorded fingerprint with the recipe's current one
    pub fn status(&self, recipe: &dyn Recipe) -> Result<CacheStatus> {
        let current = recipe.revision_string();

        let status = match self.recorded(recipe.name())? {
            None => CacheStatus::Missing,
            Some(recorded) if recorded != current => CacheStatus::Stale { recorded },
            Some(_) if !recipe.install_dir().is_dir() => {
                let err = Error::CacheInconsistency {
                    package: recipe.package_name(),
                    reason: format!(
                        "fingerprint {} recorded but {} is missing",
                        current,
                        recipe.install_dir().display()
                    ),
                };
                warn!("{}; rebuilding", err);
                CacheStatus::Inconsistent {
                    reason: err.to_string(),
                }
            }
            Some(_) => CacheStatus::Fresh,
        };

        debug!(
            "Revision cache for {} ({}): {}",
            recipe.name(),
            current,
            status.label()
        );
        Ok(status)
    }

    /// True iff the recorded fingerprint equals the recipe's and the install
    /// tree it describes is present
    pub fn should_skip(&self, recipe: &dyn Recipe) -> Result<bool> {
        Ok(self.status(recipe)?.is_fresh())
    }

    /// Record the recipe's fingerprint after a successful install
    pub fn commit(&self, recipe: &dyn Recipe) -> Result<()> {
        fs::create_dir_all(&self.dir)?;

        let fingerprint = recipe.revision_string();
        let mut tmp = tempfile::NamedTempFile::new_in(&self.dir)?;
        writeln!(tmp, "{}", fingerprint)?;
        tmp.persist(self.marker_path(recipe.name())).map_err(|e| {
            Error::IoError(format!(
                "Failed to write revision marker for {}: {}",
                recipe.name(),
                e.error
            ))
        })?;

        info!("Recorded {} revision {}", recipe.name(), fingerprint);
        Ok(())
    }

    /// Forget a recipe's fingerprint so the next run rebuilds it
    ///
    /// Returns whether a marker existed.
    pub fn invalidate(&self, name: &str) -> Result<bool> {
        match fs::remove_file(self.marker_path(name)) {
            Ok(()) => {
                info!("Invalidated revision marker for {}", name);
                Ok(true)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Every recorded fingerprint, keyed by recipe name
    pub fn entries(&self) -> Result<BTreeMap<String, String>> {
        let mut entries = BTreeMap::new();

        let dir = match fs::read_dir(&self.dir) {
            Ok(dir) => dir,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(entries),
            Err(e) => return Err(e.into()),
        };

        for entry in dir {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(MARKER_EXTENSION) {
                continue;
            }
            if let Some(name) = path.file_stem().and_then(|s| s.to_str())
                && let Some(fingerprint) = self.recorded(name)?
            {
                entries.insert(name.to_string(), fingerprint);
            }
        }

        Ok(entries)
    }
}
