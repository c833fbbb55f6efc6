// src/recipe/mod.rs

//! Recipe system for building third-party native dependencies
//!
//! A recipe describes one upstream library: where its source archive lives,
//! which version and script revision it is at, and how to configure, build
//! and install it. Recipes are declarative; the kitchen drives them.
//!
//! # Culinary Terminology
//!
//! - **Recipe**: how to fetch, build and install one package
//! - **Kitchen**: the orchestrator that cooks recipes in dependency order
//! - **Cook**: one pipeline run for one recipe
//! - **Prep**: acquire the unpacked sources
//! - **Simmer**: run the config and make stages
//! - **Plate**: run the install stage and record the fingerprint
//!
//! # Pipeline
//!
//! ```text
//! PENDING -> CACHED_SKIP
//!         -> ACQUIRING -> CONFIGURING -> BUILDING -> INSTALLING -> COMMITTED
//!                     \___________\___________\___________\-> FAILED
//! ```
//!
//! The fingerprint (`revision_string`) is only written once a pipeline
//! reaches COMMITTED, so a half-built package is always retried.

pub mod cache;
mod format;
pub mod graph;
pub mod kitchen;
mod registry;

pub use cache::{CacheStatus, RevisionCache};
pub use format::{
    ArchiveLayout, BuildCommand, CopySpec, PlatformPlan, Stage, StagePlan, Step,
};
pub use graph::RecipeGraph;
pub use kitchen::{
    BuildReport, CommandRunner, CommandStatus, CookResult, Fetcher, HttpFetcher, Kitchen,
    KitchenConfig, PipelineState, PlatformDispatcher, ProcessRunner, SourceAcquirer,
};
pub use registry::RecipeRegistry;

use crate::settings::ProjectSettings;
use std::path::PathBuf;

/// The contract every concrete recipe implements
///
/// Recipes are constructed once per run from the shared `ProjectSettings`
/// and hold no mutable state: the source, build and install directories and
/// the revision marker on disk are the only state of a build.
pub trait Recipe: Send + Sync {
    /// Settings this recipe was constructed with
    fn settings(&self) -> &ProjectSettings;

    /// Stable identifier used by the dependency graph and the revision cache
    fn name(&self) -> &str;

    /// Upstream version
    fn version(&self) -> &str;

    /// Revision of the build logic itself (flags, patches)
    ///
    /// Bumping it forces a rebuild even when the upstream version is unchanged.
    fn script_revision(&self) -> Option<&str> {
        None
    }

    /// Filesystem-safe package identifier, typically `name-version`
    fn package_name(&self) -> String {
        format!("{}-{}", self.name(), self.version())
    }

    /// Fingerprint of this exact recipe output
    fn revision_string(&self) -> String {
        match self.script_revision() {
            Some(rev) => format!("{}-{}", self.version(), rev),
            None => self.version().to_string(),
        }
    }

    /// Where the source archive (or plain file) is downloaded from
    fn url(&self) -> String;

    /// Whether the download must be extracted
    fn is_archive(&self) -> bool {
        true
    }

    /// Directory name the sources unpack to under `sources_dir`
    fn unpacked_dir_name(&self) -> String {
        self.package_name()
    }

    fn archive_layout(&self) -> ArchiveLayout {
        ArchiveLayout::Rooted
    }

    /// Directory name of the install tree under `common_build_dir`
    fn install_dir_name(&self) -> String {
        self.name().to_string()
    }

    /// Final `include/` + `lib/` tree consumed by downstream builds
    fn install_dir(&self) -> PathBuf {
        self.settings().common_build_dir.join(self.install_dir_name())
    }

    fn unpacked_sources_dir(&self) -> PathBuf {
        self.settings().sources_dir.join(self.unpacked_dir_name())
    }

    /// Where config and make run; in-tree recipes return the sources dir
    fn build_dir(&self) -> PathBuf {
        self.settings()
            .common_build_dir
            .join(format!("{}-build", self.package_name()))
    }

    /// Recipes whose install trees this recipe reads while building
    fn dependencies(&self) -> Vec<&dyn Recipe> {
        Vec::new()
    }

    fn config(&self) -> PlatformPlan;

    fn make(&self) -> PlatformPlan;

    fn install(&self) -> PlatformPlan;

    /// The plan for a given stage
    fn stage(&self, stage: Stage) -> PlatformPlan {
        match stage {
            Stage::Config => self.config(),
            Stage::Make => self.make(),
            Stage::Install => self.install(),
        }
    }
}

impl std::fmt::Debug for dyn Recipe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Recipe")
            .field("name", &self.name())
            .field("version", &self.version())
            .field("revision", &self.revision_string())
            .finish()
    }
}
