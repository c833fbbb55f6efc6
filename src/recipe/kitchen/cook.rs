// src/recipe/kitchen/cook.rs

//! Cook: the pipeline run for a single recipe

use crate::error::{Error, Result};
use crate::recipe::{BuildCommand, CopySpec, Recipe, Stage, Step};
use std::fs;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, error, info};

use super::copy::{copy_top_level, filter_copy};
use super::{CommandStatus, CookResult, Kitchen, PipelineState};

/// A single cook operation
///
/// Walks PENDING through to a terminal state. Each stage only starts when
/// the previous one succeeded, and the fingerprint is recorded last.
pub struct Cook<'a> {
    kitchen: &'a Kitchen,
    recipe: &'a dyn Recipe,
    state: PipelineState,
    history: Vec<PipelineState>,
    commands_run: usize,
}

impl<'a> Cook<'a> {
    pub(super) fn new(kitchen: &'a Kitchen, recipe: &'a dyn Recipe) -> Self {
        Self {
            kitchen,
            recipe,
            state: PipelineState::Pending,
            history: vec![PipelineState::Pending],
            commands_run: 0,
        }
    }

    /// Run the pipeline to completion; failures end up in the result
    pub(super) fn run(mut self) -> CookResult {
        let start = Instant::now();

        let outcome = self.cook();
        let (failed_at, error) = match outcome {
            Ok(()) => (None, None),
            Err(e) => {
                let failed_at = self.state;
                error!("{}: failed during {}: {}", self.recipe.package_name(), failed_at, e);
                self.transition(PipelineState::Failed);
                (Some(failed_at), Some(e))
            }
        };

        CookResult {
            name: self.recipe.name().to_string(),
            package_name: self.recipe.package_name(),
            revision: self.recipe.revision_string(),
            state: self.state,
            history: self.history,
            failed_at,
            error,
            commands_run: self.commands_run,
            elapsed: start.elapsed(),
        }
    }

    fn cook(&mut self) -> Result<()> {
        if self.cached()? {
            self.transition(PipelineState::CachedSkip);
            return Ok(());
        }

        self.prep()?;
        self.simmer()?;
        self.plate()
    }

    fn transition(&mut self, next: PipelineState) {
        info!("{}: {} -> {}", self.recipe.package_name(), self.state, next);
        self.state = next;
        self.history.push(next);
    }

    /// Consulted before any filesystem work
    fn cached(&self) -> Result<bool> {
        if self.kitchen.config.force {
            info!("{}: ignoring revision cache (forced)", self.recipe.package_name());
            return Ok(false);
        }
        self.kitchen.cache.should_skip(self.recipe)
    }

    /// Phase 1: Prep - make sure the sources are unpacked
    fn prep(&mut self) -> Result<()> {
        self.transition(PipelineState::Acquiring);
        let sources = self.kitchen.acquirer.acquire(self.recipe)?;
        debug!("{}: sources at {}", self.recipe.package_name(), sources.display());
        Ok(())
    }

    /// Phase 2: Simmer - configure and build
    fn simmer(&mut self) -> Result<()> {
        self.run_stage(Stage::Config)?;
        self.run_stage(Stage::Make)
    }

    /// Phase 3: Plate - install and record the fingerprint
    fn plate(&mut self) -> Result<()> {
        self.run_stage(Stage::Install)?;
        self.kitchen.cache.commit(self.recipe)?;
        self.transition(PipelineState::Committed);
        Ok(())
    }

    fn run_stage(&mut self, stage: Stage) -> Result<()> {
        self.transition(PipelineState::for_stage(stage));

        let plan = self.kitchen.dispatcher.select(self.recipe.stage(stage));
        if let Some(reason) = plan.noop_reason() {
            info!("{}: skipping {} stage ({})", self.recipe.package_name(), stage, reason);
            return Ok(());
        }
        if plan.steps().is_empty() {
            return Err(Error::ConfigError(format!(
                "{}: {} stage has no steps and is not declared a no-op",
                self.recipe.package_name(),
                stage
            )));
        }

        let build_dir = self.recipe.build_dir();
        fs::create_dir_all(&build_dir)?;

        for step in plan.steps() {
            match step {
                Step::Run(command) => self.run_command(stage, command, &build_dir)?,
                Step::Copy(spec) => self.copy(spec)?,
                Step::CreateDir(dir) => fs::create_dir_all(dir)?,
            }
        }
        Ok(())
    }

    fn run_command(&mut self, stage: Stage, command: &BuildCommand, build_dir: &Path) -> Result<()> {
        info!("{}", command);
        self.commands_run += 1;

        match self.kitchen.runner.run(command, build_dir)? {
            status if status.success() => Ok(()),
            CommandStatus::TimedOut => Err(Error::StageTimeout {
                package: self.recipe.package_name(),
                stage,
                timeout: self.kitchen.config.timeout.unwrap_or_default(),
            }),
            status => Err(Error::StageFailure {
                package: self.recipe.package_name(),
                stage,
                exit_code: status.code(),
            }),
        }
    }

    fn copy(&self, spec: &CopySpec) -> Result<()> {
        let copied = if spec.recursive {
            filter_copy(&spec.src, &spec.dst, spec.filter.as_deref())?
        } else {
            copy_top_level(&spec.src, &spec.dst)?
        };
        info!(
            "Installed {} file(s) from {} into {}",
            copied,
            spec.src.display(),
            spec.dst.display()
        );
        Ok(())
    }
}
