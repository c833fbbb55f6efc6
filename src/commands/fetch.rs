// src/commands/fetch.rs

//! Fetch command - download and unpack sources only

use super::load_settings;
use crate::cli::SettingsArgs;
use anyhow::{Context, Result};
use larder::{Kitchen, KitchenConfig, RecipeRegistry};

pub fn cmd_fetch(settings_args: &SettingsArgs, recipes: &[String]) -> Result<()> {
    let settings = load_settings(settings_args)?;
    let registry = RecipeRegistry::standard(&settings);
    let order = registry.build_order(recipes)?;
    let kitchen = Kitchen::new(&settings, KitchenConfig::default())?;

    println!("Fetching sources into {}", settings.sources_dir.display());
    for recipe in &order {
        let path = kitchen
            .fetch(recipe.as_ref())
            .with_context(|| format!("Failed to fetch sources for {}", recipe.package_name()))?;
        println!("  - {}: {}", recipe.name(), path.display());
    }

    println!("\n[COMPLETE] Sources for {} recipe(s) are available", order.len());
    Ok(())
}
