// src/recipes/openssl.rs

//! OpenSSL, consumed by libwebsockets

use super::parallel_make;
use crate::recipe::{BuildCommand, PlatformPlan, Recipe, StagePlan};
use crate::settings::{BuildMode, ProjectSettings};
use std::path::PathBuf;
use std::sync::Arc;

const VERSION: &str = "1.1.1k";

pub struct OpenSsl {
    settings: Arc<ProjectSettings>,
}

impl OpenSsl {
    pub fn new(settings: Arc<ProjectSettings>) -> Self {
        Self { settings }
    }
}

impl Recipe for OpenSsl {
    fn settings(&self) -> &ProjectSettings {
        &self.settings
    }

    fn name(&self) -> &str {
        "openssl"
    }

    fn version(&self) -> &str {
        VERSION
    }

    fn url(&self) -> String {
        format!("https://www.openssl.org/source/openssl-{}.tar.gz", VERSION)
    }

    // Configured and built inside its source tree
    fn build_dir(&self) -> PathBuf {
        self.unpacked_sources_dir()
    }

    fn config(&self) -> PlatformPlan {
        let debug = self.settings.build_mode == BuildMode::Debug;
        let prefix = format!("--prefix={}", self.install_dir().display());
        let openssldir = format!("--openssldir={}", self.install_dir().join("ssl").display());

        let windows = BuildCommand::new("perl")
            .arg("Configure")
            .arg("VC-WIN64A")
            .arg("no-shared")
            .arg_if(debug, "--debug")
            .arg(prefix.as_str())
            .arg(openssldir.as_str());

        let unix = BuildCommand::path(&self.unpacked_sources_dir().join("config"))
            .arg("no-shared")
            .arg_if(debug, "-d")
            .arg(prefix)
            .arg(openssldir);

        PlatformPlan::split(StagePlan::run(windows), StagePlan::run(unix))
    }

    fn make(&self) -> PlatformPlan {
        PlatformPlan::split(
            StagePlan::run(BuildCommand::new("nmake")),
            StagePlan::run(parallel_make(self.settings.jobs)),
        )
    }

    /// `install_sw` skips the manual pages
    fn install(&self) -> PlatformPlan {
        PlatformPlan::split(
            StagePlan::run(BuildCommand::new("nmake").arg("install_sw")),
            StagePlan::run(BuildCommand::new("make").arg("install_sw")),
        )
    }
}
