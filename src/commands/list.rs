// src/commands/list.rs

//! List command - recipes in build order

use super::load_settings;
use crate::cli::SettingsArgs;
use anyhow::Result;
use larder::RecipeRegistry;

pub fn cmd_list(settings_args: &SettingsArgs) -> Result<()> {
    let settings = load_settings(settings_args)?;
    let registry = RecipeRegistry::standard(&settings);

    for recipe in registry.build_order(&[])? {
        let deps = recipe.dependencies();
        let names: Vec<&str> = deps.iter().map(|d| d.name()).collect();
        if names.is_empty() {
            println!("{} {}", recipe.name(), recipe.version());
        } else {
            println!(
                "{} {} (needs {})",
                recipe.name(),
                recipe.version(),
                names.join(", ")
            );
        }
    }
    Ok(())
}
