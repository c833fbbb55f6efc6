// tests/common/mod.rs

//! Shared test utilities and helpers for integration tests.
//!
//! Nothing here touches the network or spawns build tools: commands are
//! recorded by `RecordingRunner` and downloads are served from memory by
//! `MemoryFetcher`.

#![allow(dead_code)]

use flate2::Compression;
use flate2::write::GzEncoder;
use larder::recipe::{
    ArchiveLayout, BuildCommand, CommandRunner, CommandStatus, Fetcher, PlatformPlan, StagePlan,
};
use larder::{Error, Kitchen, KitchenConfig, ProjectSettings, Recipe, Result};
use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::io::Write;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// Records every command as `"<package>: <command line>"` and exits 0,
/// except for entries registered with `fail_on`, which exit 2, and entries
/// registered with `time_out_on`, which report a timeout
#[derive(Default)]
pub struct RecordingRunner {
    log: Mutex<Vec<String>>,
    failures: Mutex<BTreeSet<String>>,
    timeouts: Mutex<BTreeSet<String>>,
}

impl RecordingRunner {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn fail_on(&self, entry: &str) {
        self.failures.lock().unwrap().insert(entry.to_string());
    }

    pub fn time_out_on(&self, entry: &str) {
        self.timeouts.lock().unwrap().insert(entry.to_string());
    }

    pub fn clear_failures(&self) {
        self.failures.lock().unwrap().clear();
    }

    pub fn log(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.log.lock().unwrap().len()
    }

    /// Position of the first log entry equal to `entry`
    pub fn position(&self, entry: &str) -> Option<usize> {
        self.log.lock().unwrap().iter().position(|e| e == entry)
    }
}

impl CommandRunner for RecordingRunner {
    fn run(&self, command: &BuildCommand, cwd: &Path) -> Result<CommandStatus> {
        let dir = cwd
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let package = dir.trim_end_matches("-build");
        let entry = format!("{}: {}", package, command);

        let fails = self.failures.lock().unwrap().contains(&entry);
        let times_out = self.timeouts.lock().unwrap().contains(&entry);
        self.log.lock().unwrap().push(entry);

        Ok(if times_out {
            CommandStatus::TimedOut
        } else if fails {
            CommandStatus::Exited(2)
        } else {
            CommandStatus::Exited(0)
        })
    }
}

/// Serves registered URLs from memory and counts downloads
#[derive(Default)]
pub struct MemoryFetcher {
    files: Mutex<HashMap<String, Vec<u8>>>,
    fetches: AtomicUsize,
}

impl MemoryFetcher {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn serve(&self, url: &str, bytes: Vec<u8>) {
        self.files.lock().unwrap().insert(url.to_string(), bytes);
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

impl Fetcher for MemoryFetcher {
    fn fetch(&self, url: &str, dest: &Path) -> Result<()> {
        let bytes = self
            .files
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .ok_or_else(|| Error::FetchError {
                url: url.to_string(),
                reason: "HTTP 404 Not Found".to_string(),
            })?;

        self.fetches.fetch_add(1, Ordering::SeqCst);
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(dest, bytes)?;
        Ok(())
    }
}

/// A `.tar.gz` containing `files` (paths relative to the archive root)
pub fn tar_gz(files: &[(&str, &str)]) -> Vec<u8> {
    let mut builder = tar::Builder::new(GzEncoder::new(Vec::new(), Compression::default()));
    for (name, content) in files {
        let mut header = tar::Header::new_gnu();
        header.set_size(content.len() as u64);
        header.set_mode(0o755);
        header.set_cksum();
        builder
            .append_data(&mut header, name, content.as_bytes())
            .unwrap();
    }
    builder.into_inner().unwrap().finish().unwrap()
}

/// A `.zip` containing `files`
pub fn zip(files: &[(&str, &str)]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
    for (name, content) in files {
        writer
            .start_file(*name, zip::write::FileOptions::default())
            .unwrap();
        writer.write_all(content.as_bytes()).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

/// Configurable recipe: `configure`, `make`, `make install` plus a header copy
#[derive(Clone)]
pub struct TestRecipe {
    pub settings: Arc<ProjectSettings>,
    pub name: String,
    pub version: String,
    pub revision: Option<String>,
    pub deps: Vec<TestRecipe>,
    /// Download URL; derived from the package name when unset
    pub url: Option<String>,
    pub archive: bool,
    pub layout: ArchiveLayout,
    pub make_noop: bool,
}

impl TestRecipe {
    pub fn new(settings: &Arc<ProjectSettings>, name: &str, version: &str) -> Self {
        Self {
            settings: Arc::clone(settings),
            name: name.to_string(),
            version: version.to_string(),
            revision: None,
            deps: Vec::new(),
            url: None,
            archive: true,
            layout: ArchiveLayout::Rooted,
            make_noop: false,
        }
    }

    pub fn revision(mut self, revision: &str) -> Self {
        self.revision = Some(revision.to_string());
        self
    }

    pub fn depends_on(mut self, dep: TestRecipe) -> Self {
        self.deps.push(dep);
        self
    }

    /// Archive listing for this recipe's expected layout
    pub fn archive_bytes(&self) -> Vec<u8> {
        let configure = format!("{}/configure", self.package_name());
        let header = format!("{}/include/{}.h", self.package_name(), self.name);
        tar_gz(&[
            (configure.as_str(), "#!/bin/sh\n"),
            (header.as_str(), "#pragma once\n"),
        ])
    }

    pub fn arc(self) -> Arc<dyn Recipe> {
        Arc::new(self)
    }
}

impl Recipe for TestRecipe {
    fn settings(&self) -> &ProjectSettings {
        &self.settings
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn version(&self) -> &str {
        &self.version
    }

    fn script_revision(&self) -> Option<&str> {
        self.revision.as_deref()
    }

    fn url(&self) -> String {
        if let Some(url) = &self.url {
            return url.clone();
        }
        let extension = if self.archive { "tar.gz" } else { "bin" };
        format!("https://example.com/{}.{}", self.package_name(), extension)
    }

    fn is_archive(&self) -> bool {
        self.archive
    }

    fn archive_layout(&self) -> ArchiveLayout {
        self.layout
    }

    fn dependencies(&self) -> Vec<&dyn Recipe> {
        self.deps.iter().map(|d| d as &dyn Recipe).collect()
    }

    fn config(&self) -> PlatformPlan {
        StagePlan::run(BuildCommand::new("configure")).into()
    }

    fn make(&self) -> PlatformPlan {
        if self.make_noop {
            return PlatformPlan::noop("nothing to build");
        }
        PlatformPlan::split(
            StagePlan::run(BuildCommand::new("devenv").arg(format!("{}.sln", self.name))),
            StagePlan::run(BuildCommand::new("make")),
        )
    }

    fn install(&self) -> PlatformPlan {
        let include = self.install_dir().join("include");
        StagePlan::run(BuildCommand::new("make").arg("install"))
            .then_create_dir(&include)
            .then_copy(self.unpacked_sources_dir().join("include"), include, Some(".h"))
            .into()
    }
}

/// Temporary build root with recording tools
pub struct Fixture {
    pub temp: TempDir,
    pub settings: Arc<ProjectSettings>,
    pub runner: Arc<RecordingRunner>,
    pub fetcher: Arc<MemoryFetcher>,
}

impl Fixture {
    pub fn new() -> Self {
        let temp = TempDir::new().unwrap();
        let settings = Arc::new(ProjectSettings::new(temp.path().join("build")).with_jobs(2));
        Self {
            temp,
            settings,
            runner: RecordingRunner::new(),
            fetcher: MemoryFetcher::new(),
        }
    }

    /// A recipe whose archive is served by the fetcher
    pub fn recipe(&self, name: &str, version: &str) -> TestRecipe {
        let recipe = TestRecipe::new(&self.settings, name, version);
        self.serve(&recipe);
        recipe
    }

    pub fn serve(&self, recipe: &TestRecipe) {
        self.fetcher.serve(&recipe.url(), recipe.archive_bytes());
    }

    pub fn kitchen(&self) -> Kitchen {
        self.kitchen_with(KitchenConfig::default())
    }

    pub fn kitchen_with(&self, config: KitchenConfig) -> Kitchen {
        Kitchen::with_tools(
            &self.settings,
            config,
            self.runner.clone(),
            self.fetcher.clone(),
        )
    }
}
