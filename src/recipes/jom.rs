// src/recipes/jom.rs

//! jom, the parallel nmake replacement used to build Qt on Windows
//!
//! Distributed as a prebuilt zip without a top-level directory.

use crate::recipe::{ArchiveLayout, PlatformPlan, Recipe, StagePlan};
use crate::settings::ProjectSettings;
use std::path::PathBuf;
use std::sync::Arc;

const VERSION: &str = "1_1_3";

pub struct Jom {
    settings: Arc<ProjectSettings>,
}

impl Jom {
    pub fn new(settings: Arc<ProjectSettings>) -> Self {
        Self { settings }
    }

    /// The installed `jom.exe`
    pub fn executable_path(&self) -> PathBuf {
        self.install_dir().join("jom.exe")
    }
}

impl Recipe for Jom {
    fn settings(&self) -> &ProjectSettings {
        &self.settings
    }

    fn name(&self) -> &str {
        "jom"
    }

    fn version(&self) -> &str {
        VERSION
    }

    fn url(&self) -> String {
        format!("https://download.qt.io/official_releases/jom/jom_{}.zip", VERSION)
    }

    fn archive_layout(&self) -> ArchiveLayout {
        ArchiveLayout::Flat
    }

    fn config(&self) -> PlatformPlan {
        PlatformPlan::noop("prebuilt binary")
    }

    fn make(&self) -> PlatformPlan {
        PlatformPlan::noop("prebuilt binary")
    }

    fn install(&self) -> PlatformPlan {
        PlatformPlan::split(
            StagePlan::new().then_copy(self.unpacked_sources_dir(), self.install_dir(), Some(".exe")),
            // Keeps the install tree present so the recorded revision stays valid
            StagePlan::new().then_create_dir(self.install_dir()),
        )
    }
}
