// src/commands/cook.rs

//! Cook command - build and install recipes

use super::load_settings;
use crate::cli::SettingsArgs;
use anyhow::{Context, Result, bail};
use larder::{CookResult, Kitchen, KitchenConfig, PipelineState, RecipeRegistry};
use std::time::Duration;
use tracing::info;

/// Cook the named recipes (all when empty) and their dependencies
pub fn cmd_cook(
    settings_args: &SettingsArgs,
    recipes: &[String],
    timeout: Option<u64>,
    parallel: bool,
    force: bool,
    fail_fast: bool,
) -> Result<()> {
    let settings = load_settings(settings_args)?;
    let registry = RecipeRegistry::standard(&settings);
    let order = registry
        .build_order(recipes)
        .context("Failed to determine build order")?;

    let config = KitchenConfig {
        timeout: timeout.map(Duration::from_secs),
        parallel,
        force,
        keep_going: !fail_fast,
    };

    println!(
        "Cooking {} recipe(s) for {} ({}, {}) in {}",
        order.len(),
        settings.os,
        settings.build_mode.as_str(),
        settings.link_mode.as_str(),
        settings.common_build_dir.display()
    );

    let kitchen = Kitchen::new(&settings, config).context("Failed to set up the kitchen")?;
    let report = kitchen.cook_all(&order).context("Failed to schedule recipes")?;

    println!();
    for result in &report.results {
        print_result(result);
    }

    let failed = report.failed().count();
    let not_started = order.len().saturating_sub(report.results.len());
    if not_started > 0 {
        println!("Warning: {} recipe(s) not started", not_started);
    }

    if failed > 0 {
        bail!("{} of {} recipe(s) failed", failed, order.len());
    }

    println!(
        "\n[COMPLETE] {} recipe(s) ready, {} command(s) run",
        report.results.len(),
        report.commands_run()
    );
    info!("Cook finished for {} recipe(s)", report.results.len());
    Ok(())
}

fn print_result(result: &CookResult) {
    match result.state {
        PipelineState::CachedSkip => {
            println!("[SKIP] {} {} (up to date)", result.name, result.revision);
        }
        PipelineState::Committed => {
            println!(
                "[OK] {} {} ({} command(s), {:.1}s)",
                result.name,
                result.revision,
                result.commands_run,
                result.elapsed.as_secs_f64()
            );
        }
        _ => {
            let stage = result
                .failed_at
                .map(|s| s.to_string())
                .unwrap_or_else(|| "unknown".to_string());
            let reason = result
                .error
                .as_ref()
                .map(|e| e.to_string())
                .unwrap_or_default();
            println!("[FAILED] {} {} during {}: {}", result.name, result.revision, stage, reason);
        }
    }
}
