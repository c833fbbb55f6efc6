// src/recipes/libusb.rs

//! libusb, built with autotools
//!
//! Nothing is built on Windows, where the system driver stack is used; the
//! install stage only creates the empty install tree there.

use crate::recipe::{BuildCommand, PlatformPlan, Recipe, StagePlan};
use crate::settings::ProjectSettings;
use std::sync::Arc;

const VERSION: &str = "1.0.23";
const SCRIPT_REVISION: &str = "3";

pub struct Libusb {
    settings: Arc<ProjectSettings>,
}

impl Libusb {
    pub fn new(settings: Arc<ProjectSettings>) -> Self {
        Self { settings }
    }
}

impl Recipe for Libusb {
    fn settings(&self) -> &ProjectSettings {
        &self.settings
    }

    fn name(&self) -> &str {
        "libusb"
    }

    fn version(&self) -> &str {
        VERSION
    }

    fn script_revision(&self) -> Option<&str> {
        Some(SCRIPT_REVISION)
    }

    fn url(&self) -> String {
        format!(
            "https://github.com/libusb/libusb/releases/download/v{0}/libusb-{0}.tar.bz2",
            VERSION
        )
    }

    fn config(&self) -> PlatformPlan {
        PlatformPlan::split(
            StagePlan::noop("not built on Windows"),
            StagePlan::run(BuildCommand::path(
                &self.unpacked_sources_dir().join("configure"),
            )),
        )
    }

    fn make(&self) -> PlatformPlan {
        PlatformPlan::split(
            StagePlan::noop("not built on Windows"),
            StagePlan::run(BuildCommand::new("make")),
        )
    }

    fn install(&self) -> PlatformPlan {
        let install = self.install_dir();
        PlatformPlan::split(
            StagePlan::new().then_create_dir(&install),
            StagePlan::new()
                .then_create_dir(&install)
                .then_copy(
                    self.build_dir().join("libusb").join(".libs"),
                    install.join("lib"),
                    None,
                )
                .then_copy(
                    self.unpacked_sources_dir().join("libusb"),
                    install.join("include"),
                    None,
                ),
        )
    }
}
