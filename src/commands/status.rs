// src/commands/status.rs

//! Status command - compare recorded revisions with the recipes

use super::load_settings;
use crate::cli::SettingsArgs;
use anyhow::Result;
use larder::RecipeRegistry;
use larder::recipe::{CacheStatus, RevisionCache};

pub fn cmd_status(settings_args: &SettingsArgs, recipes: &[String]) -> Result<()> {
    let settings = load_settings(settings_args)?;
    let registry = RecipeRegistry::standard(&settings);
    let order = registry.build_order(recipes)?;
    let cache = RevisionCache::new(&settings.common_build_dir);

    println!("{:<14} {:<18} {:<18} STATUS", "RECIPE", "REVISION", "RECORDED");
    let mut pending = 0;
    for recipe in &order {
        let status = cache.status(recipe.as_ref())?;
        let recorded = match &status {
            CacheStatus::Missing => "-".to_string(),
            CacheStatus::Stale { recorded } => recorded.clone(),
            CacheStatus::Fresh | CacheStatus::Inconsistent { .. } => recipe.revision_string(),
        };
        if !status.is_fresh() {
            pending += 1;
        }
        println!(
            "{:<14} {:<18} {:<18} {}",
            recipe.name(),
            short(&recipe.revision_string()),
            short(&recorded),
            status.label()
        );
    }

    // Markers left behind by recipes that no longer exist
    for (name, recorded) in cache.entries()? {
        if registry.get(&name).is_err() {
            println!("{:<14} {:<18} {:<18} unknown recipe", name, "-", short(&recorded));
        }
    }

    println!("\n{} of {} recipe(s) need cooking", pending, order.len());
    Ok(())
}

/// Commit hashes are shortened to keep the table readable
fn short(revision: &str) -> &str {
    if revision.len() == 40 && revision.chars().all(|c| c.is_ascii_hexdigit()) {
        &revision[..12]
    } else {
        revision
    }
}
