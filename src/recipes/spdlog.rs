// src/recipes/spdlog.rs

//! spdlog, header-only
//!
//! The whole unpacked tree is the install tree; there is nothing to
//! configure or build.

use crate::recipe::{PlatformPlan, Recipe, StagePlan};
use crate::settings::ProjectSettings;
use std::sync::Arc;

const VERSION: &str = "0.16.3";

pub struct Spdlog {
    settings: Arc<ProjectSettings>,
}

impl Spdlog {
    pub fn new(settings: Arc<ProjectSettings>) -> Self {
        Self { settings }
    }
}

impl Recipe for Spdlog {
    fn settings(&self) -> &ProjectSettings {
        &self.settings
    }

    fn name(&self) -> &str {
        "spdlog"
    }

    fn version(&self) -> &str {
        VERSION
    }

    /// Downstream builds look for `SPDLog` under the build root
    fn package_name(&self) -> String {
        "SPDLog".to_string()
    }

    fn install_dir_name(&self) -> String {
        self.package_name()
    }

    fn unpacked_dir_name(&self) -> String {
        format!("spdlog-{}", VERSION)
    }

    fn url(&self) -> String {
        format!("https://github.com/gabime/spdlog/archive/v{}.zip", VERSION)
    }

    fn config(&self) -> PlatformPlan {
        PlatformPlan::noop("header-only library")
    }

    fn make(&self) -> PlatformPlan {
        PlatformPlan::noop("header-only library")
    }

    fn install(&self) -> PlatformPlan {
        StagePlan::new()
            .then_copy(self.unpacked_sources_dir(), self.install_dir(), None)
            .into()
    }
}
