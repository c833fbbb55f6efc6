// src/commands/mod.rs
//! Command handlers for the larder CLI

mod cook;
mod fetch;
mod invalidate;
mod list;
mod status;

pub use cook::cmd_cook;
pub use fetch::cmd_fetch;
pub use invalidate::cmd_invalidate;
pub use list::cmd_list;
pub use status::cmd_status;

use crate::cli::SettingsArgs;
use anyhow::{Context, Result};
use larder::ProjectSettings;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

const DEFAULT_BUILD_DIR: &str = "build";

/// Build the run's settings: settings file (or host defaults), then flags
pub(crate) fn load_settings(args: &SettingsArgs) -> Result<Arc<ProjectSettings>> {
    let mut settings = match &args.settings {
        Some(path) => ProjectSettings::load(path)
            .with_context(|| format!("Failed to load settings from {}", path.display()))?,
        None => ProjectSettings::new(DEFAULT_BUILD_DIR),
    };

    if let Some(dir) = &args.build_dir {
        let derived_sources = settings.sources_dir == settings.common_build_dir.join("sources");
        settings.common_build_dir = dir.clone();
        if derived_sources {
            settings.sources_dir = dir.join("sources");
        }
    }
    if let Some(dir) = &args.sources_dir {
        settings.sources_dir = dir.clone();
    }
    if let Some(os) = args.os {
        settings = settings.with_os(os);
    }
    if let Some(mode) = args.build_mode {
        settings = settings.with_build_mode(mode);
    }
    if let Some(mode) = args.link_mode {
        settings = settings.with_link_mode(mode);
    }
    if let Some(generator) = &args.generator {
        settings = settings.with_generator(generator.as_str());
    }
    if let Some(jobs) = args.jobs {
        settings = settings.with_jobs(jobs);
    }

    // Build tools run in other directories, so every path must be absolute
    settings.common_build_dir = absolute(&settings.common_build_dir)?;
    settings.sources_dir = absolute(&settings.sources_dir)?;

    settings.validate()?;
    debug!("Settings: {:?}", settings);
    Ok(Arc::new(settings))
}

fn absolute(path: &Path) -> Result<PathBuf> {
    std::path::absolute(path).with_context(|| format!("Invalid path: {}", path.display()))
}
