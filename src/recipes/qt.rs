// src/recipes/qt.rs

//! Qt 5, built from the single-archive source release
//!
//! Only the modules the application uses are built. On Windows the build is
//! driven by jom, which makes jom a dependency there.

use super::{Jom, parallel_make};
use crate::recipe::{BuildCommand, PlatformPlan, Recipe, StagePlan};
use crate::settings::{BuildMode, LinkMode, OsClass, ProjectSettings};
use std::sync::Arc;

const RELEASE: &str = "5.12";
const VERSION: &str = "5.12.2";
const SCRIPT_REVISION: &str = "7";

const SKIPPED_MODULES: [&str; 18] = [
    "doc",
    "webchannel",
    "webview",
    "sensors",
    "serialport",
    "script",
    "multimedia",
    "wayland",
    "location",
    "webglplugin",
    "gamepad",
    "purchasing",
    "canvas3d",
    "speech",
    "3d",
    "androidextras",
    "connectivity",
    "virtualkeyboard",
];

const SKIPPED_SQL_DRIVERS: [&str; 7] = ["db2", "oci", "tds", "sqlite2", "odbc", "ibase", "psql"];

const FEATURE_FLAGS: [&str; 9] = [
    "-confirm-license",
    "-opensource",
    "-no-opengl",
    "-qt-pcre",
    "-qt-harfbuzz",
    "-sql-sqlite",
    "-sql-mysql",
    "-no-feature-vulkan",
    "-no-openssl",
];

const MYSQL_CONNECTOR_WINDOWS: &str = r"C:\Program Files\MySQL\MySQL Connector C 6.1";
const MYSQL_OSX: &str = "/usr/local/opt/mysql@5.7";

pub struct Qt {
    settings: Arc<ProjectSettings>,
    jom: Jom,
}

impl Qt {
    pub fn new(settings: Arc<ProjectSettings>) -> Self {
        Self {
            jom: Jom::new(Arc::clone(&settings)),
            settings,
        }
    }

    /// Flags shared by every platform's configure invocation, after the
    /// script and its platform selection
    fn configure_flags(&self, command: BuildCommand) -> BuildCommand {
        let settings = &self.settings;
        let is_static = settings.link_mode == LinkMode::Static;

        let mut command = match settings.build_mode {
            BuildMode::Release => command.arg("-release").arg("-no-qml-debug"),
            BuildMode::Debug => command.arg("-debug"),
        };

        command = command
            .arg(if settings.on_linux() { "-dbus" } else { "-no-dbus" })
            .arg_if(is_static, "-static")
            .arg_if(is_static && settings.on_windows(), "-static-runtime")
            .args(FEATURE_FLAGS);

        command = match settings.os {
            OsClass::Osx => command
                .arg(format!("-L{}/lib", MYSQL_OSX))
                .arg(format!("-I{}/include", MYSQL_OSX))
                .arg(format!("-I{}/include/mysql", MYSQL_OSX))
                .args(["-qt-libpng", "-no-freetype"]),
            OsClass::Linux => command.args([
                "-system-freetype",
                "-fontconfig",
                "-no-glib",
                "-cups",
                "-no-icu",
                "-nomake",
                "tools",
            ]),
            OsClass::Windows => command
                .args(["-qt-libpng", "-no-freetype"])
                .arg(format!(r"-I{}\include", MYSQL_CONNECTOR_WINDOWS))
                .arg(format!(r"-L{}\lib", MYSQL_CONNECTOR_WINDOWS)),
        };

        command = command.args(["-nomake", "tests", "-nomake", "examples"]);

        for driver in SKIPPED_SQL_DRIVERS {
            command = command.arg(format!("-no-sql-{}", driver));
        }
        for module in SKIPPED_MODULES {
            command = command.arg("-skip").arg(module);
        }
        if is_static {
            command = command.arg("-skip").arg("imageformats");
        }

        command
            .arg("-prefix")
            .arg(self.install_dir().to_string_lossy())
    }
}

impl Recipe for Qt {
    fn settings(&self) -> &ProjectSettings {
        &self.settings
    }

    fn name(&self) -> &str {
        "qt"
    }

    fn version(&self) -> &str {
        VERSION
    }

    fn script_revision(&self) -> Option<&str> {
        Some(SCRIPT_REVISION)
    }

    fn package_name(&self) -> String {
        format!("qt-everywhere-src-{}", VERSION)
    }

    fn revision_string(&self) -> String {
        format!("{}_{}", VERSION, SCRIPT_REVISION)
    }

    fn url(&self) -> String {
        let extension = if self.settings.on_windows() { "zip" } else { "tar.xz" };
        format!(
            "https://download.qt.io/official_releases/qt/{}/{}/single/{}.{}",
            RELEASE,
            VERSION,
            self.package_name(),
            extension
        )
    }

    fn install_dir_name(&self) -> String {
        "Qt5".to_string()
    }

    fn dependencies(&self) -> Vec<&dyn Recipe> {
        if self.settings.on_windows() {
            vec![&self.jom as &dyn Recipe]
        } else {
            Vec::new()
        }
    }

    fn config(&self) -> PlatformPlan {
        let sources = self.unpacked_sources_dir();
        let windows = BuildCommand::path(&sources.join("configure.bat"))
            .arg("-platform")
            .arg(format!("win32-msvc{}", self.settings.vs_year));
        let unix = BuildCommand::path(&sources.join("configure"));

        PlatformPlan::split(
            StagePlan::run(self.configure_flags(windows)),
            StagePlan::run(self.configure_flags(unix)),
        )
    }

    fn make(&self) -> PlatformPlan {
        let jom = BuildCommand::path(&self.jom.executable_path())
            .arg_if(self.settings.link_mode == LinkMode::Static, "mode=static");
        // One core is left for the machine
        let make = parallel_make(self.settings.jobs.saturating_sub(1));

        PlatformPlan::split(StagePlan::run(jom), StagePlan::run(make))
    }

    fn install(&self) -> PlatformPlan {
        PlatformPlan::split(
            StagePlan::run(BuildCommand::new("nmake").arg("install")),
            StagePlan::run(BuildCommand::new("make").arg("install")),
        )
    }
}
