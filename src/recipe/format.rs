// src/recipe/format.rs

//! Declarative stage descriptions returned by recipes
//!
//! A recipe never spawns processes itself. Each stage (config, make,
//! install) describes what should happen as a `PlatformPlan`, which the
//! kitchen's dispatcher narrows to one `StagePlan` for the target OS and
//! then executes step by step.

use std::fmt;
use std::path::{Path, PathBuf};

/// One of the three build stages every recipe implements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Config,
    Make,
    Install,
}

impl Stage {
    pub const ALL: [Stage; 3] = [Stage::Config, Stage::Make, Stage::Install];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Config => "config",
            Self::Make => "make",
            Self::Install => "install",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the top level of a source archive is laid out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ArchiveLayout {
    /// The archive contains a single top-level directory named after the
    /// recipe's unpacked directory name
    #[default]
    Rooted,
    /// The archive contents are extracted into the unpacked directory
    Flat,
}

/// A single external command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildCommand {
    /// Program name (looked up on PATH) or path to an executable
    pub program: String,
    /// Arguments, passed verbatim
    pub args: Vec<String>,
    /// Extra environment variables on top of the inherited environment
    pub env: Vec<(String, String)>,
    /// Working directory; the recipe's build directory when unset
    pub cwd: Option<PathBuf>,
}

impl BuildCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            env: Vec::new(),
            cwd: None,
        }
    }

    /// Command for a script or executable at a path
    pub fn path(program: &Path) -> Self {
        Self::new(program.to_string_lossy())
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Append an argument only when `condition` holds
    pub fn arg_if(self, condition: bool, arg: impl Into<String>) -> Self {
        if condition { self.arg(arg) } else { self }
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }
}

impl fmt::Display for BuildCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Copy files from a build output tree into the install tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopySpec {
    pub src: PathBuf,
    pub dst: PathBuf,
    /// File-name suffix to match (e.g. `.h`, `.a`); every file when unset
    pub filter: Option<String>,
    /// Walk subdirectories, or only copy regular files directly in `src`
    pub recursive: bool,
}

/// One unit of work inside a stage
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Spawn an external process and require exit code zero
    Run(BuildCommand),
    /// Filtered copy into the install tree
    Copy(CopySpec),
    /// Make sure a directory exists
    CreateDir(PathBuf),
}

/// The steps of one stage on one platform
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StagePlan {
    steps: Vec<Step>,
    noop_reason: Option<String>,
}

impl StagePlan {
    /// An empty plan; add steps with the builder methods
    pub fn new() -> Self {
        Self::default()
    }

    /// A stage that is meaningless here and succeeds without doing anything
    pub fn noop(reason: impl Into<String>) -> Self {
        Self {
            steps: Vec::new(),
            noop_reason: Some(reason.into()),
        }
    }

    /// A plan running a single command
    pub fn run(command: BuildCommand) -> Self {
        Self::new().then_run(command)
    }

    pub fn then_run(mut self, command: BuildCommand) -> Self {
        self.steps.push(Step::Run(command));
        self
    }

    /// Recursive copy of files whose name ends with `filter`
    pub fn then_copy(
        mut self,
        src: impl Into<PathBuf>,
        dst: impl Into<PathBuf>,
        filter: Option<&str>,
    ) -> Self {
        self.steps.push(Step::Copy(CopySpec {
            src: src.into(),
            dst: dst.into(),
            filter: filter.map(str::to_string),
            recursive: true,
        }));
        self
    }

    /// Copy only the regular files directly inside `src`
    pub fn then_copy_top_level(mut self, src: impl Into<PathBuf>, dst: impl Into<PathBuf>) -> Self {
        self.steps.push(Step::Copy(CopySpec {
            src: src.into(),
            dst: dst.into(),
            filter: None,
            recursive: false,
        }));
        self
    }

    pub fn then_create_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.steps.push(Step::CreateDir(dir.into()));
        self
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Why this stage does nothing, if it is an explicit no-op
    pub fn noop_reason(&self) -> Option<&str> {
        self.noop_reason.as_deref()
    }

    /// Number of external processes this plan spawns
    pub fn command_count(&self) -> usize {
        self.steps
            .iter()
            .filter(|s| matches!(s, Step::Run(_)))
            .count()
    }
}

/// A stage description, optionally split per platform
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlatformPlan {
    /// Same steps on every OS
    Common(StagePlan),
    /// Separate Windows and Unix variants
    Split { windows: StagePlan, unix: StagePlan },
}

impl PlatformPlan {
    pub fn split(windows: StagePlan, unix: StagePlan) -> Self {
        Self::Split { windows, unix }
    }

    /// Explicit no-op on every platform
    pub fn noop(reason: impl Into<String>) -> Self {
        Self::Common(StagePlan::noop(reason))
    }
}

impl From<StagePlan> for PlatformPlan {
    fn from(plan: StagePlan) -> Self {
        Self::Common(plan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_command_display() {
        let cmd = BuildCommand::new("make")
            .arg("-j")
            .arg("8")
            .arg_if(false, "V=1");
        assert_eq!(cmd.to_string(), "make -j 8");
        assert!(cmd.cwd.is_none());
    }

    #[test]
    fn test_stage_plan_builder() {
        let plan = StagePlan::run(BuildCommand::new("cmake").arg(".."))
            .then_create_dir("/install")
            .then_copy("/build/lib", "/install/lib", Some(".a"))
            .then_copy_top_level("/src/include", "/install/include");

        assert_eq!(plan.steps().len(), 4);
        assert_eq!(plan.command_count(), 1);
        assert!(plan.noop_reason().is_none());

        match &plan.steps()[2] {
            Step::Copy(spec) => {
                assert_eq!(spec.filter.as_deref(), Some(".a"));
                assert!(spec.recursive);
            }
            other => panic!("unexpected step {:?}", other),
        }
        match &plan.steps()[3] {
            Step::Copy(spec) => assert!(!spec.recursive),
            other => panic!("unexpected step {:?}", other),
        }
    }

    #[test]
    fn test_noop_plan_is_explicit() {
        let plan = StagePlan::noop("header-only library");
        assert!(plan.steps().is_empty());
        assert_eq!(plan.noop_reason(), Some("header-only library"));
        assert_eq!(plan.command_count(), 0);
    }
}
