// src/recipe/kitchen/config.rs

//! Configuration and result types for the Kitchen

use crate::error::Error;
use crate::recipe::Stage;
use std::fmt;
use std::time::Duration;

/// Configuration for the Kitchen
#[derive(Debug, Clone)]
pub struct KitchenConfig {
    /// Kill an external command that runs longer than this (no limit when unset)
    pub timeout: Option<Duration>,
    /// Cook mutually independent recipes concurrently, one dependency level at a time
    pub parallel: bool,
    /// Ignore recorded fingerprints and rebuild
    ///
    /// The fingerprint is still recorded after a successful rebuild.
    pub force: bool,
    /// Keep cooking independent recipes after a failure
    pub keep_going: bool,
}

impl Default for KitchenConfig {
    fn default() -> Self {
        Self {
            timeout: None,
            parallel: false,
            force: false,
            keep_going: true,
        }
    }
}

impl KitchenConfig {
    /// Stop scheduling new recipes as soon as one fails
    pub fn fail_fast() -> Self {
        Self {
            keep_going: false,
            ..Self::default()
        }
    }
}

/// Pipeline states of one recipe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipelineState {
    Pending,
    CachedSkip,
    Acquiring,
    Configuring,
    Building,
    Installing,
    Committed,
    Failed,
}

impl PipelineState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::CachedSkip => "CACHED_SKIP",
            Self::Acquiring => "ACQUIRING",
            Self::Configuring => "CONFIGURING",
            Self::Building => "BUILDING",
            Self::Installing => "INSTALLING",
            Self::Committed => "COMMITTED",
            Self::Failed => "FAILED",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::CachedSkip | Self::Committed | Self::Failed)
    }

    /// Terminal states a dependent recipe may build on
    pub fn is_success(&self) -> bool {
        matches!(self, Self::CachedSkip | Self::Committed)
    }

    /// The state entered to run a stage
    pub fn for_stage(stage: Stage) -> Self {
        match stage {
            Stage::Config => Self::Configuring,
            Stage::Make => Self::Building,
            Stage::Install => Self::Installing,
        }
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of cooking one recipe
#[derive(Debug)]
pub struct CookResult {
    /// Recipe name
    pub name: String,
    /// Package identifier (`name-version`)
    pub package_name: String,
    /// Fingerprint the recipe had during this run
    pub revision: String,
    /// Terminal state
    pub state: PipelineState,
    /// Every state entered, starting with PENDING
    pub history: Vec<PipelineState>,
    /// State that was active when the pipeline failed
    pub failed_at: Option<PipelineState>,
    /// Why the pipeline failed
    pub error: Option<Error>,
    /// External processes spawned
    pub commands_run: usize,
    pub elapsed: Duration,
}

impl CookResult {
    pub fn is_success(&self) -> bool {
        self.state.is_success()
    }

    /// Whether the revision cache short-circuited the pipeline
    pub fn from_cache(&self) -> bool {
        self.state == PipelineState::CachedSkip
    }
}

/// Results of a multi-recipe run, in the order the recipes finished
#[derive(Debug, Default)]
pub struct BuildReport {
    pub results: Vec<CookResult>,
}

impl BuildReport {
    pub fn get(&self, name: &str) -> Option<&CookResult> {
        self.results.iter().find(|r| r.name == name)
    }

    pub fn succeeded(&self) -> impl Iterator<Item = &CookResult> {
        self.results.iter().filter(|r| r.is_success())
    }

    pub fn failed(&self) -> impl Iterator<Item = &CookResult> {
        self.results.iter().filter(|r| !r.is_success())
    }

    pub fn is_success(&self) -> bool {
        self.results.iter().all(CookResult::is_success)
    }

    /// Total external processes spawned across all recipes
    pub fn commands_run(&self) -> usize {
        self.results.iter().map(|r| r.commands_run).sum()
    }
}
