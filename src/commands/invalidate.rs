// src/commands/invalidate.rs

//! Invalidate command - forget recorded revisions

use super::load_settings;
use crate::cli::SettingsArgs;
use anyhow::Result;
use larder::RecipeRegistry;
use larder::recipe::RevisionCache;

pub fn cmd_invalidate(settings_args: &SettingsArgs, recipes: &[String]) -> Result<()> {
    let settings = load_settings(settings_args)?;
    let registry = RecipeRegistry::standard(&settings);
    let cache = RevisionCache::new(&settings.common_build_dir);

    for name in recipes {
        // Reject typos before touching anything
        registry.get(name)?;
    }

    for name in recipes {
        if cache.invalidate(name)? {
            println!("[OK] {} will be rebuilt on the next cook", name);
        } else {
            println!("{}: nothing recorded", name);
        }
    }
    Ok(())
}
