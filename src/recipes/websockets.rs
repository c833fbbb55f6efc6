// src/recipes/websockets.rs

//! libwebsockets, client-only static build against OpenSSL

use super::{OpenSsl, cmake_configure, devenv_build, parallel_make};
use crate::recipe::{BuildCommand, PlatformPlan, Recipe, StagePlan};
use crate::settings::ProjectSettings;
use std::sync::Arc;

const VERSION: &str = "3.0.1";

const CMAKE_OPTIONS: [&str; 6] = [
    "-DLWS_WITH_SHARED=OFF",
    "-DLWS_WITHOUT_SERVER=ON",
    "-DLWS_WITHOUT_TESTAPPS=ON",
    "-DLWS_WITHOUT_TEST_SERVER=ON",
    "-DLWS_WITHOUT_TEST_PING=ON",
    "-DLWS_WITHOUT_TEST_CLIENT=ON",
];

pub struct Websockets {
    settings: Arc<ProjectSettings>,
    openssl: OpenSsl,
}

impl Websockets {
    pub fn new(settings: Arc<ProjectSettings>) -> Self {
        Self {
            openssl: OpenSsl::new(Arc::clone(&settings)),
            settings,
        }
    }

    fn cmake(&self) -> BuildCommand {
        let ssl_root = self.openssl.install_dir();
        cmake_configure(&self.settings, &self.unpacked_sources_dir(), CMAKE_OPTIONS)
            .env("OPENSSL_ROOT_DIR", ssl_root.to_string_lossy())
            .env("OPENSSL_INCLUDE_DIR", ssl_root.join("include").to_string_lossy())
    }
}

impl Recipe for Websockets {
    fn settings(&self) -> &ProjectSettings {
        &self.settings
    }

    fn name(&self) -> &str {
        "libwebsockets"
    }

    fn version(&self) -> &str {
        VERSION
    }

    fn url(&self) -> String {
        format!("https://github.com/warmcat/libwebsockets/archive/v{}.zip", VERSION)
    }

    fn dependencies(&self) -> Vec<&dyn Recipe> {
        vec![&self.openssl as &dyn Recipe]
    }

    fn config(&self) -> PlatformPlan {
        StagePlan::run(self.cmake()).into()
    }

    fn make(&self) -> PlatformPlan {
        PlatformPlan::split(
            StagePlan::run(devenv_build(&self.settings, "libwebsockets.sln")),
            StagePlan::run(parallel_make(self.settings.jobs)),
        )
    }

    fn install(&self) -> PlatformPlan {
        let build = self.build_dir();
        let install = self.install_dir();
        let lib = install.join("lib");
        let include = install.join("include");

        PlatformPlan::split(
            StagePlan::new()
                .then_copy(
                    build.join("lib").join(self.settings.build_mode.win_configuration()),
                    &lib,
                    Some(".lib"),
                )
                .then_copy(build.join("include"), &include, None),
            StagePlan::new()
                .then_copy(build.join("lib"), &lib, Some(".a"))
                .then_copy(build.join("include"), &include, None),
        )
    }
}
