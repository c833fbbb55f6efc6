// src/settings.rs

//! Project-wide build settings
//!
//! A `ProjectSettings` value describes the target platform and the
//! directory layout for one orchestration run. It is created once (from
//! host defaults, an optional TOML file and command-line overrides),
//! wrapped in an `Arc`, and handed to every recipe at construction time.
//! Nothing mutates it afterwards.
//!
//! # Example settings file
//!
//! ```toml
//! os = "linux"
//! build_mode = "release"
//! link_mode = "static"
//! common_build_dir = "build"
//! sources_dir = "build/sources"
//! cmake_generator = "Unix Makefiles"
//! ```

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Operating system class the dependencies are built for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OsClass {
    Windows,
    Linux,
    Osx,
}

impl OsClass {
    /// The OS class of the machine running this process
    pub fn host() -> Self {
        if cfg!(windows) {
            Self::Windows
        } else if cfg!(target_os = "macos") {
            Self::Osx
        } else {
            Self::Linux
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Windows => "windows",
            Self::Linux => "linux",
            Self::Osx => "osx",
        }
    }

    /// Whether Unix-style `configure && make` builds apply
    pub fn is_unix(&self) -> bool {
        !matches!(self, Self::Windows)
    }
}

impl fmt::Display for OsClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OsClass {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "windows" => Ok(Self::Windows),
            "linux" => Ok(Self::Linux),
            "osx" | "macos" | "darwin" => Ok(Self::Osx),
            other => Err(Error::ParseError(format!("Unknown OS class: {}", other))),
        }
    }
}

/// Debug or optimized builds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BuildMode {
    Debug,
    #[default]
    Release,
}

impl BuildMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Release => "release",
        }
    }

    /// Visual Studio solution configuration name
    pub fn win_configuration(&self) -> &'static str {
        match self {
            Self::Debug => "Debug",
            Self::Release => "Release",
        }
    }
}

impl fmt::Display for BuildMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the host application links its native dependencies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LinkMode {
    #[default]
    Static,
    Dynamic,
}

impl LinkMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Static => "static",
            Self::Dynamic => "dynamic",
        }
    }
}

impl fmt::Display for LinkMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Read-only settings for one orchestration run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectSettings {
    /// Target operating system class
    pub os: OsClass,
    /// Debug or release builds
    pub build_mode: BuildMode,
    /// Static or dynamic linking
    pub link_mode: LinkMode,
    /// Root under which every package gets its install directory
    pub common_build_dir: PathBuf,
    /// Downloaded archives and unpacked source trees (shared by all recipes)
    pub sources_dir: PathBuf,
    /// CMake generator passed with `-G`
    pub cmake_generator: String,
    /// Visual Studio release year, used for Qt's `win32-msvc<year>` platform
    pub vs_year: String,
    /// Parallel jobs handed to `make -j`
    pub jobs: u32,
}

impl ProjectSettings {
    /// Settings for the host platform rooted at `common_build_dir`
    pub fn new(common_build_dir: impl Into<PathBuf>) -> Self {
        let common_build_dir = common_build_dir.into();
        let os = OsClass::host();
        let vs_year = DEFAULT_VS_YEAR.to_string();
        Self {
            os,
            build_mode: BuildMode::default(),
            link_mode: LinkMode::default(),
            sources_dir: common_build_dir.join("sources"),
            common_build_dir,
            cmake_generator: default_generator(os, &vs_year),
            vs_year,
            jobs: default_jobs(),
        }
    }

    /// Switch the target OS. A generator still at the old OS's default
    /// follows the new OS; an explicitly chosen one is kept.
    pub fn with_os(mut self, os: OsClass) -> Self {
        if self.cmake_generator == default_generator(self.os, &self.vs_year) {
            self.cmake_generator = default_generator(os, &self.vs_year);
        }
        self.os = os;
        self
    }

    pub fn with_build_mode(mut self, mode: BuildMode) -> Self {
        self.build_mode = mode;
        self
    }

    pub fn with_link_mode(mut self, mode: LinkMode) -> Self {
        self.link_mode = mode;
        self
    }

    pub fn with_sources_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.sources_dir = dir.into();
        self
    }

    pub fn with_generator(mut self, generator: impl Into<String>) -> Self {
        self.cmake_generator = generator.into();
        self
    }

    pub fn with_jobs(mut self, jobs: u32) -> Self {
        self.jobs = jobs.max(1);
        self
    }

    /// Load settings from a TOML file
    ///
    /// Unset fields fall back to host defaults. Relative paths are resolved
    /// against the directory containing the file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::IoError(format!("Failed to read settings file {}: {}", path.display(), e))
        })?;
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        SettingsFile::parse(&content)?.resolve(base)
    }

    pub fn on_windows(&self) -> bool {
        self.os == OsClass::Windows
    }

    pub fn on_linux(&self) -> bool {
        self.os == OsClass::Linux
    }

    pub fn on_osx(&self) -> bool {
        self.os == OsClass::Osx
    }

    /// File extension of static libraries on the target OS
    pub fn static_lib_extension(&self) -> &'static str {
        if self.on_windows() { ".lib" } else { ".a" }
    }

    /// Sanity checks run once before any recipe is constructed
    pub fn validate(&self) -> Result<()> {
        if self.common_build_dir.as_os_str().is_empty() {
            return Err(Error::ConfigError("common build directory is empty".to_string()));
        }
        if self.sources_dir.as_os_str().is_empty() {
            return Err(Error::ConfigError("sources directory is empty".to_string()));
        }
        if self.cmake_generator.trim().is_empty() {
            return Err(Error::ConfigError("CMake generator is empty".to_string()));
        }
        Ok(())
    }
}

const DEFAULT_VS_YEAR: &str = "2019";

fn default_generator(os: OsClass, vs_year: &str) -> String {
    match os {
        OsClass::Windows => match vs_year {
            "2017" => "Visual Studio 15 2017 Win64".to_string(),
            "2022" => "Visual Studio 17 2022".to_string(),
            _ => "Visual Studio 16 2019".to_string(),
        },
        OsClass::Linux | OsClass::Osx => "Unix Makefiles".to_string(),
    }
}

fn default_jobs() -> u32 {
    std::thread::available_parallelism()
        .map(|p| p.get() as u32)
        .unwrap_or(4)
}

/// On-disk shape of a settings file; every field is optional
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct SettingsFile {
    os: Option<OsClass>,
    build_mode: Option<BuildMode>,
    link_mode: Option<LinkMode>,
    common_build_dir: Option<PathBuf>,
    sources_dir: Option<PathBuf>,
    cmake_generator: Option<String>,
    vs_year: Option<String>,
    jobs: Option<u32>,
}

impl SettingsFile {
    fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::ParseError(format!("Invalid settings: {}", e)))
    }

    fn resolve(self, base: &Path) -> Result<ProjectSettings> {
        let absolutize = |p: PathBuf| if p.is_relative() { base.join(p) } else { p };

        let common_build_dir = absolutize(self.common_build_dir.unwrap_or_else(|| "build".into()));
        let mut settings = ProjectSettings::new(common_build_dir);

        if let Some(year) = self.vs_year {
            settings.cmake_generator = default_generator(settings.os, &year);
            settings.vs_year = year;
        }
        let os = self.os.unwrap_or(settings.os);
        settings = settings.with_os(os);
        if let Some(mode) = self.build_mode {
            settings.build_mode = mode;
        }
        if let Some(mode) = self.link_mode {
            settings.link_mode = mode;
        }
        if let Some(dir) = self.sources_dir {
            settings.sources_dir = absolutize(dir);
        }
        if let Some(generator) = self.cmake_generator {
            settings.cmake_generator = generator;
        }
        if let Some(jobs) = self.jobs {
            settings = settings.with_jobs(jobs);
        }

        settings.validate()?;
        Ok(settings)
    }
}
