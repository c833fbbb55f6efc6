// src/recipes/libbtc.rs

//! libbtc, pinned to a commit of the maintained fork
//!
//! Configured with CMake against MPIR's install tree. Besides its own
//! headers, the install tree gets the bundled secp256k1 headers flattened
//! into `include/`.

use super::{Mpir, cmake_configure, devenv_build, parallel_make};
use crate::recipe::{PlatformPlan, Recipe, StagePlan};
use crate::settings::ProjectSettings;
use std::sync::Arc;

const VERSION: &str = "43ed4c7d95bfb666ee009311e8f48b6a30bda464";

pub struct LibBtc {
    settings: Arc<ProjectSettings>,
    mpir: Mpir,
}

impl LibBtc {
    pub fn new(settings: Arc<ProjectSettings>) -> Self {
        Self {
            mpir: Mpir::new(Arc::clone(&settings)),
            settings,
        }
    }

    /// Append the header copies shared by both platforms
    fn with_headers(&self, plan: StagePlan) -> StagePlan {
        let sources = self.unpacked_sources_dir();
        let include = self.install_dir().join("include");
        plan.then_copy(sources.join("include"), &include, Some(".h"))
            .then_copy_top_level(sources.join("src").join("secp256k1").join("include"), include)
    }
}

impl Recipe for LibBtc {
    fn settings(&self) -> &ProjectSettings {
        &self.settings
    }

    fn name(&self) -> &str {
        "libbtc"
    }

    fn version(&self) -> &str {
        VERSION
    }

    fn url(&self) -> String {
        format!("https://github.com/sergey-chernikov/libbtc/archive/{}.zip", VERSION)
    }

    fn dependencies(&self) -> Vec<&dyn Recipe> {
        vec![&self.mpir as &dyn Recipe]
    }

    fn config(&self) -> PlatformPlan {
        let cmake = cmake_configure(
            &self.settings,
            &self.unpacked_sources_dir(),
            [format!("-DGMP_INSTALL_DIR={}", self.mpir.install_dir().display())],
        );

        PlatformPlan::split(
            StagePlan::run(
                cmake
                    .clone()
                    .arg("-DCMAKE_CXX_FLAGS_DEBUG=/MTd")
                    .arg("-DCMAKE_CXX_FLAGS_RELEASE=/MT"),
            ),
            StagePlan::run(cmake),
        )
    }

    fn make(&self) -> PlatformPlan {
        PlatformPlan::split(
            StagePlan::run(
                devenv_build(&self.settings, "libbtc.sln")
                    .arg("/project")
                    .arg("libbtc"),
            ),
            StagePlan::run(parallel_make(self.settings.jobs)),
        )
    }

    fn install(&self) -> PlatformPlan {
        let lib = self.install_dir().join("lib");
        let windows_output = self
            .build_dir()
            .join(self.settings.build_mode.win_configuration());

        PlatformPlan::split(
            self.with_headers(StagePlan::new().then_copy(windows_output, &lib, Some(".lib"))),
            self.with_headers(StagePlan::new().then_copy(self.build_dir(), &lib, Some(".a"))),
        )
    }
}
