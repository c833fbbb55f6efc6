// tests/pipeline.rs

//! Integration tests for the cook pipeline and the revision cache

mod common;

use common::{Fixture, TestRecipe};
use larder::recipe::{Recipe, RevisionCache, Stage};
use larder::{Error, KitchenConfig, PipelineState};
use std::time::Duration;

use PipelineState::*;

const FULL_RUN: [PipelineState; 6] = [Pending, Acquiring, Configuring, Building, Installing, Committed];

#[test]
fn test_fresh_build_runs_every_stage_and_records_revision() {
    let fx = Fixture::new();
    let recipe = fx.recipe("libfoo", "1.2").revision("3");
    let kitchen = fx.kitchen();

    let result = kitchen.cook(&recipe);

    assert!(result.is_success(), "{:?}", result.error);
    assert_eq!(result.history, FULL_RUN);
    assert_eq!(result.commands_run, 3);
    assert_eq!(
        fx.runner.log(),
        vec![
            "libfoo-1.2: configure",
            "libfoo-1.2: make",
            "libfoo-1.2: make install"
        ]
    );
    assert_eq!(
        kitchen.cache().recorded("libfoo").unwrap().as_deref(),
        Some("1.2-3")
    );
    assert!(
        fx.settings
            .common_build_dir
            .join("libfoo/include/libfoo.h")
            .is_file()
    );
}

#[test]
fn test_second_run_is_cached_skip() {
    let fx = Fixture::new();
    let recipe = fx.recipe("libfoo", "1.2").revision("3");
    let kitchen = fx.kitchen();

    assert!(kitchen.cook(&recipe).is_success());
    let commands_before = fx.runner.count();

    let result = kitchen.cook(&recipe);
    assert_eq!(result.state, CachedSkip);
    assert_eq!(result.history, vec![Pending, CachedSkip]);
    assert!(result.from_cache());
    assert_eq!(result.commands_run, 0);
    assert_eq!(fx.runner.count(), commands_before);
    assert_eq!(fx.fetcher.fetch_count(), 1);
}

#[test]
fn test_revision_bump_forces_rebuild() {
    let fx = Fixture::new();
    let kitchen = fx.kitchen();

    let old = fx.recipe("libfoo", "1.2").revision("3");
    assert!(kitchen.cook(&old).is_success());

    let new = fx.recipe("libfoo", "1.2").revision("4");
    let result = kitchen.cook(&new);
    assert_eq!(result.history, FULL_RUN);
    assert_eq!(result.commands_run, 3);
    assert_eq!(
        kitchen.cache().recorded("libfoo").unwrap().as_deref(),
        Some("1.2-4")
    );
    // Same package name, so the unpacked sources are reused
    assert_eq!(fx.fetcher.fetch_count(), 1);
}

#[test]
fn test_version_bump_forces_rebuild() {
    let fx = Fixture::new();
    let kitchen = fx.kitchen();

    assert!(kitchen.cook(&fx.recipe("libfoo", "1.2")).is_success());
    let result = kitchen.cook(&fx.recipe("libfoo", "1.3"));

    assert_eq!(result.state, Committed);
    assert_eq!(fx.fetcher.fetch_count(), 2);
    assert!(fx.runner.position("libfoo-1.3: configure").is_some());
    assert_eq!(
        kitchen.cache().recorded("libfoo").unwrap().as_deref(),
        Some("1.3")
    );
}

#[test]
fn test_build_failure_leaves_cache_untouched() {
    let fx = Fixture::new();
    let recipe = fx.recipe("libfoo", "1.2").revision("3");
    let kitchen = fx.kitchen();
    fx.runner.fail_on("libfoo-1.2: make");

    let result = kitchen.cook(&recipe);

    assert_eq!(result.state, Failed);
    assert_eq!(result.failed_at, Some(Building));
    assert_eq!(result.history, vec![Pending, Acquiring, Configuring, Building, Failed]);
    assert!(matches!(
        result.error,
        Some(Error::StageFailure {
            stage: Stage::Make,
            exit_code: Some(2),
            ..
        })
    ));
    assert_eq!(kitchen.cache().recorded("libfoo").unwrap(), None);
    assert!(!recipe.install_dir().exists());
}

#[test]
fn test_rerun_after_failure_repeats_the_same_stages() {
    let fx = Fixture::new();
    let recipe = fx.recipe("libfoo", "1.2").revision("3");
    let kitchen = fx.kitchen();
    fx.runner.fail_on("libfoo-1.2: make");

    let first = kitchen.cook(&recipe);
    let first_log = fx.runner.log();

    let second = kitchen.cook(&recipe);
    let second_log = fx.runner.log()[first_log.len()..].to_vec();

    assert_eq!(first.history, second.history);
    assert_eq!(first_log, second_log);
    assert_eq!(fx.fetcher.fetch_count(), 1);

    fx.runner.clear_failures();
    let third = kitchen.cook(&recipe);
    assert_eq!(third.history, FULL_RUN);
}

#[test]
fn test_timeout_reports_configured_limit() {
    let fx = Fixture::new();
    let recipe = fx.recipe("libfoo", "1.2");
    fx.runner.time_out_on("libfoo-1.2: make");

    let kitchen = fx.kitchen_with(KitchenConfig {
        timeout: Some(Duration::from_millis(250)),
        ..KitchenConfig::default()
    });
    let result = kitchen.cook(&recipe);

    assert_eq!(result.failed_at, Some(Building));
    match &result.error {
        Some(err @ Error::StageTimeout { timeout, .. }) => {
            assert_eq!(*timeout, Duration::from_millis(250));
            assert!(err.to_string().ends_with("timed out after 250 ms"), "{}", err);
        }
        other => panic!("expected StageTimeout, got {:?}", other),
    }
    assert_eq!(kitchen.cache().recorded("libfoo").unwrap(), None);
}

#[test]
fn test_failed_rebuild_keeps_previous_fingerprint() {
    let fx = Fixture::new();
    let kitchen = fx.kitchen();

    assert!(kitchen.cook(&fx.recipe("libfoo", "1.2").revision("3")).is_success());

    fx.runner.fail_on("libfoo-1.2: make install");
    let result = kitchen.cook(&fx.recipe("libfoo", "1.2").revision("4"));

    assert_eq!(result.failed_at, Some(Installing));
    assert_eq!(
        kitchen.cache().recorded("libfoo").unwrap().as_deref(),
        Some("1.2-3")
    );
}

#[test]
fn test_missing_install_dir_triggers_rebuild() {
    let fx = Fixture::new();
    let recipe = fx.recipe("libfoo", "1.2");
    let kitchen = fx.kitchen();

    assert!(kitchen.cook(&recipe).is_success());
    std::fs::remove_dir_all(recipe.install_dir()).unwrap();

    let result = kitchen.cook(&recipe);
    assert_eq!(result.history, FULL_RUN);
    assert!(recipe.install_dir().is_dir());
}

#[test]
fn test_force_ignores_cache() {
    let fx = Fixture::new();
    let recipe = fx.recipe("libfoo", "1.2");

    assert!(fx.kitchen().cook(&recipe).is_success());

    let forced = fx.kitchen_with(KitchenConfig {
        force: true,
        ..KitchenConfig::default()
    });
    let result = forced.cook(&recipe);
    assert_eq!(result.history, FULL_RUN);
    assert_eq!(fx.runner.count(), 6);
}

#[test]
fn test_invalidate_forces_rebuild() {
    let fx = Fixture::new();
    let recipe = fx.recipe("libfoo", "1.2");
    let kitchen = fx.kitchen();

    assert!(kitchen.cook(&recipe).is_success());
    let cache = RevisionCache::new(&fx.settings.common_build_dir);
    assert!(cache.invalidate("libfoo").unwrap());
    assert!(!cache.invalidate("libfoo").unwrap());

    assert_eq!(kitchen.cook(&recipe).state, Committed);
}

#[test]
fn test_noop_stage_still_passes_through_state() {
    let fx = Fixture::new();
    let mut recipe = fx.recipe("headers", "0.1");
    recipe.make_noop = true;

    let result = fx.kitchen().cook(&recipe);

    assert_eq!(result.history, FULL_RUN);
    assert_eq!(result.commands_run, 2);
    assert_eq!(fx.runner.position("headers-0.1: make"), None);
}

#[test]
fn test_fetch_failure_fails_at_acquiring() {
    let fx = Fixture::new();
    // Never served
    let recipe = TestRecipe::new(&fx.settings, "ghost", "1.0");
    let kitchen = fx.kitchen();

    let result = kitchen.cook(&recipe);

    assert_eq!(result.failed_at, Some(Acquiring));
    assert!(matches!(result.error, Some(Error::FetchError { .. })));
    assert_eq!(result.commands_run, 0);
    assert_eq!(kitchen.cache().recorded("ghost").unwrap(), None);
    assert!(!recipe.unpacked_sources_dir().exists());
}

#[test]
fn test_dependency_is_committed_before_dependent_configures() {
    let fx = Fixture::new();
    let b = fx.recipe("b", "1.0");
    let a = fx.recipe("a", "1.0").depends_on(b.clone());

    // Deliberately listed dependent first
    let report = fx.kitchen().cook_all(&[a.arc(), b.arc()]).unwrap();

    assert!(report.is_success());
    let order: Vec<&str> = report.results.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(order, vec!["b", "a"]);

    let installed = fx.runner.position("b-1.0: make install").unwrap();
    let configured = fx.runner.position("a-1.0: configure").unwrap();
    assert!(installed < configured);
}

#[test]
fn test_cycle_is_rejected_before_any_work() {
    let fx = Fixture::new();
    let a = fx.recipe("a", "1.0").depends_on(fx.recipe("b", "1.0"));
    let b = fx.recipe("b", "1.0").depends_on(fx.recipe("a", "1.0"));

    let err = fx.kitchen().cook_all(&[a.arc(), b.arc()]).unwrap_err();

    assert!(matches!(err, Error::CycleError(_)));
    assert_eq!(fx.runner.count(), 0);
    assert_eq!(fx.fetcher.fetch_count(), 0);
}

#[test]
fn test_failure_does_not_affect_independent_recipe() {
    let fx = Fixture::new();
    let x = fx.recipe("x", "1.0");
    let y = fx.recipe("y", "1.0");
    fx.runner.fail_on("x-1.0: configure");

    let kitchen = fx.kitchen();
    let report = kitchen.cook_all(&[x.arc(), y.arc()]).unwrap();

    assert!(!report.is_success());
    assert_eq!(report.get("x").unwrap().failed_at, Some(Configuring));
    assert_eq!(report.get("y").unwrap().state, Committed);
    assert_eq!(report.failed().count(), 1);
    assert_eq!(kitchen.cache().recorded("x").unwrap(), None);
    assert_eq!(kitchen.cache().recorded("y").unwrap().as_deref(), Some("1.0"));
}

#[test]
fn test_dependents_of_failed_recipe_are_not_started() {
    let fx = Fixture::new();
    let b = fx.recipe("b", "1.0");
    let a = fx.recipe("a", "1.0").depends_on(b.clone());
    let c = fx.recipe("c", "1.0");
    fx.runner.fail_on("b-1.0: configure");

    let report = fx.kitchen().cook_all(&[a.arc(), b.arc(), c.arc()]).unwrap();

    let blocked = report.get("a").unwrap();
    assert_eq!(blocked.state, Failed);
    assert_eq!(blocked.history, vec![Pending, Failed]);
    assert!(matches!(
        &blocked.error,
        Some(Error::DependencyFailed { dependency, .. }) if dependency == "b"
    ));
    assert!(fx.runner.log().iter().all(|e| !e.starts_with("a-1.0")));
    assert_eq!(report.get("c").unwrap().state, Committed);
}

#[test]
fn test_fail_fast_stops_scheduling() {
    let fx = Fixture::new();
    let alpha = fx.recipe("alpha", "1.0");
    let beta = fx.recipe("beta", "1.0");
    fx.runner.fail_on("alpha-1.0: configure");

    let report = fx
        .kitchen_with(KitchenConfig::fail_fast())
        .cook_all(&[alpha.arc(), beta.arc()])
        .unwrap();

    assert_eq!(report.results.len(), 1);
    assert_eq!(report.results[0].name, "alpha");
    assert!(report.get("beta").is_none());
}

#[test]
fn test_parallel_cooking_respects_dependencies() {
    let fx = Fixture::new();
    let x = fx.recipe("x", "1.0");
    let y = fx.recipe("y", "1.0");
    let z = fx.recipe("z", "1.0");
    let top = fx.recipe("top", "1.0").depends_on(x.clone()).depends_on(y.clone());

    let kitchen = fx.kitchen_with(KitchenConfig {
        parallel: true,
        ..KitchenConfig::default()
    });
    let report = kitchen
        .cook_all(&[top.arc(), x.arc(), y.arc(), z.arc()])
        .unwrap();

    assert!(report.is_success());
    assert_eq!(report.results.len(), 4);
    assert_eq!(report.commands_run(), 12);

    let configured = fx.runner.position("top-1.0: configure").unwrap();
    for dep in ["x-1.0: make install", "y-1.0: make install"] {
        assert!(fx.runner.position(dep).unwrap() < configured);
    }
    for name in ["x", "y", "z", "top"] {
        assert_eq!(kitchen.cache().recorded(name).unwrap().as_deref(), Some("1.0"));
    }
}
