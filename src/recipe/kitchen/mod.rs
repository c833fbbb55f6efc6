// src/recipe/kitchen/mod.rs

//! Kitchen: drives recipes through the build pipeline
//!
//! The Kitchen owns everything a pipeline touches besides the recipe:
//! - The revision cache consulted before any work
//! - Source acquisition (download and unpack)
//! - Platform selection for each stage
//! - Running external build tools
//!
//! Several recipes are cooked in dependency order. With `parallel`, every
//! level of the dependency graph is cooked concurrently once the previous
//! level finished.

mod acquire;
mod archive;
mod config;
mod cook;
mod copy;
mod dispatch;
mod fetch;
mod runner;

pub use acquire::SourceAcquirer;
pub use archive::{ArchiveFormat, archive_filename, extract_archive};
pub use config::{BuildReport, CookResult, KitchenConfig, PipelineState};
pub use copy::{copy_top_level, filter_copy};
pub use dispatch::PlatformDispatcher;
pub use fetch::{Fetcher, HttpFetcher};
pub use runner::{CommandRunner, CommandStatus, ProcessRunner};

use crate::error::{Error, Result};
use crate::recipe::{Recipe, RecipeGraph, RevisionCache};
use crate::settings::ProjectSettings;
use cook::Cook;
use rayon::prelude::*;
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// The Kitchen: where recipes are cooked
pub struct Kitchen {
    pub(crate) config: KitchenConfig,
    pub(crate) cache: RevisionCache,
    pub(crate) dispatcher: PlatformDispatcher,
    pub(crate) acquirer: SourceAcquirer,
    pub(crate) runner: Arc<dyn CommandRunner>,
}

impl Kitchen {
    /// Create a Kitchen that downloads over HTTP and spawns real processes
    pub fn new(settings: &ProjectSettings, config: KitchenConfig) -> Result<Self> {
        let runner = Arc::new(ProcessRunner::with_timeout(config.timeout));
        let fetcher = Arc::new(HttpFetcher::new()?);
        Ok(Self::with_tools(settings, config, runner, fetcher))
    }

    /// Create a Kitchen with a specific command runner and fetcher
    pub fn with_tools(
        settings: &ProjectSettings,
        config: KitchenConfig,
        runner: Arc<dyn CommandRunner>,
        fetcher: Arc<dyn Fetcher>,
    ) -> Self {
        Self {
            config,
            cache: RevisionCache::new(&settings.common_build_dir),
            dispatcher: PlatformDispatcher::new(settings.os),
            acquirer: SourceAcquirer::new(fetcher),
            runner,
        }
    }

    pub fn config(&self) -> &KitchenConfig {
        &self.config
    }

    pub fn cache(&self) -> &RevisionCache {
        &self.cache
    }

    /// Run one recipe's pipeline
    ///
    /// Dependencies are not cooked; use `cook_all` for that.
    pub fn cook(&self, recipe: &dyn Recipe) -> CookResult {
        info!("Cooking {} ({})", recipe.package_name(), recipe.revision_string());
        Cook::new(self, recipe).run()
    }

    /// Acquire a recipe's sources without building
    pub fn fetch(&self, recipe: &dyn Recipe) -> Result<PathBuf> {
        self.acquirer.acquire(recipe)
    }

    /// Cook several recipes in dependency order
    ///
    /// A recipe whose dependency failed is not started and is reported as
    /// FAILED with `DependencyFailed`. Dependencies outside `recipes` are
    /// assumed to be available.
    pub fn cook_all(&self, recipes: &[Arc<dyn Recipe>]) -> Result<BuildReport> {
        let by_name: BTreeMap<&str, &dyn Recipe> =
            recipes.iter().map(|r| (r.name(), r.as_ref())).collect();

        let mut graph = RecipeGraph::new();
        for recipe in recipes {
            let deps = recipe.dependencies();
            let names: Vec<&str> = deps.iter().map(|d| d.name()).collect();
            graph.add_recipe(recipe.name(), &names);
        }
        let levels = graph.levels()?;

        let mut report = BuildReport::default();
        let mut failed: BTreeSet<String> = BTreeSet::new();

        for level in levels {
            let batch: Vec<&dyn Recipe> = level
                .iter()
                .filter_map(|name| by_name.get(name.as_str()).copied())
                .collect();

            let results: Vec<CookResult> = if self.config.parallel && batch.len() > 1 {
                info!("Cooking {} recipes in parallel", batch.len());
                batch
                    .par_iter()
                    .map(|recipe| self.cook_unless_blocked(*recipe, &graph, &failed))
                    .collect()
            } else {
                let mut results = Vec::with_capacity(batch.len());
                for recipe in batch {
                    let result = self.cook_unless_blocked(recipe, &graph, &failed);
                    let stop = !result.is_success() && !self.config.keep_going;
                    results.push(result);
                    if stop {
                        break;
                    }
                }
                results
            };

            for result in results {
                if !result.is_success() {
                    failed.insert(result.name.clone());
                }
                report.results.push(result);
            }

            if !failed.is_empty() && !self.config.keep_going {
                let remaining = recipes.len().saturating_sub(report.results.len());
                if remaining > 0 {
                    warn!("Stopping after failure; {} recipe(s) not cooked", remaining);
                }
                break;
            }
        }

        Ok(report)
    }

    fn cook_unless_blocked(
        &self,
        recipe: &dyn Recipe,
        graph: &RecipeGraph,
        failed: &BTreeSet<String>,
    ) -> CookResult {
        let blocked_by = graph
            .dependencies(recipe.name())
            .and_then(|deps| deps.iter().find(|d| failed.contains(*d)));

        match blocked_by {
            Some(dependency) => {
                let error = Error::DependencyFailed {
                    package: recipe.package_name(),
                    dependency: dependency.clone(),
                };
                warn!("{}", error);
                CookResult {
                    name: recipe.name().to_string(),
                    package_name: recipe.package_name(),
                    revision: recipe.revision_string(),
                    state: PipelineState::Failed,
                    history: vec![PipelineState::Pending, PipelineState::Failed],
                    failed_at: Some(PipelineState::Pending),
                    error: Some(error),
                    commands_run: 0,
                    elapsed: Duration::ZERO,
                }
            }
            None => self.cook(recipe),
        }
    }
}
