// src/recipes/mpir.rs

//! MPIR, the big-integer library libbtc links against
//!
//! Built in-tree. On Windows the solution shipped with the sources is used
//! and its output directory carries both the static library and the headers.

use super::parallel_make;
use crate::recipe::{BuildCommand, PlatformPlan, Recipe, StagePlan};
use crate::settings::{LinkMode, ProjectSettings};
use std::path::PathBuf;
use std::sync::Arc;

const VERSION: &str = "3.0.0";

pub struct Mpir {
    settings: Arc<ProjectSettings>,
}

impl Mpir {
    pub fn new(settings: Arc<ProjectSettings>) -> Self {
        Self { settings }
    }

    /// Where the MSVC solution places `mpir.lib` and `gmp.h`
    fn windows_output_dir(&self) -> PathBuf {
        self.unpacked_sources_dir()
            .join("lib")
            .join("x64")
            .join(self.settings.build_mode.win_configuration())
    }
}

impl Recipe for Mpir {
    fn settings(&self) -> &ProjectSettings {
        &self.settings
    }

    fn name(&self) -> &str {
        "mpir"
    }

    fn version(&self) -> &str {
        VERSION
    }

    fn url(&self) -> String {
        format!("https://mpir.org/mpir-{}.tar.bz2", VERSION)
    }

    fn build_dir(&self) -> PathBuf {
        self.unpacked_sources_dir()
    }

    fn config(&self) -> PlatformPlan {
        let configure = BuildCommand::path(&self.unpacked_sources_dir().join("configure"))
            .arg("--enable-cxx")
            .arg("--with-pic")
            .arg(match self.settings.link_mode {
                LinkMode::Static => "--disable-shared",
                LinkMode::Dynamic => "--disable-static",
            })
            .arg(format!("--prefix={}", self.install_dir().display()));

        PlatformPlan::split(
            StagePlan::noop("the MSVC solution ships with the sources"),
            StagePlan::run(configure),
        )
    }

    fn make(&self) -> PlatformPlan {
        let solution = self
            .unpacked_sources_dir()
            .join("build.vc15")
            .join("mpir.sln");
        let devenv = BuildCommand::new("devenv")
            .arg(solution.to_string_lossy())
            .arg("/build")
            .arg(format!("{}|x64", self.settings.build_mode.win_configuration()))
            .arg("/project")
            .arg("lib_mpir_gc");

        PlatformPlan::split(
            StagePlan::run(devenv),
            StagePlan::run(parallel_make(self.settings.jobs)),
        )
    }

    fn install(&self) -> PlatformPlan {
        let install = self.install_dir();
        PlatformPlan::split(
            StagePlan::new()
                .then_copy(self.windows_output_dir(), install.join("lib"), Some(".lib"))
                .then_copy(self.windows_output_dir(), install.join("include"), Some(".h")),
            StagePlan::run(BuildCommand::new("make").arg("install")),
        )
    }
}
