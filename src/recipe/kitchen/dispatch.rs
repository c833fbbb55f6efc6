// src/recipe/kitchen/dispatch.rs

//! Platform selection for stage plans
//!
//! The only place in the crate that decides between the Windows and the
//! Unix variant of a stage. Recipes describe both variants as data; adding
//! a platform means extending this type, not every recipe.

use crate::recipe::{PlatformPlan, StagePlan};
use crate::settings::OsClass;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlatformDispatcher {
    os: OsClass,
}

impl PlatformDispatcher {
    pub fn new(os: OsClass) -> Self {
        Self { os }
    }

    pub fn os(&self) -> OsClass {
        self.os
    }

    /// Invoke exactly one of the two variants and return its result as-is
    ///
    /// There is no fallback: a failure of the selected variant is never
    /// retried with the other one.
    pub fn dispatch<T>(&self, windows: impl FnOnce() -> T, unix: impl FnOnce() -> T) -> T {
        match self.os {
            OsClass::Windows => windows(),
            OsClass::Linux | OsClass::Osx => unix(),
        }
    }

    /// Narrow a platform plan to the plan for the target OS
    pub fn select(&self, plan: PlatformPlan) -> StagePlan {
        match plan {
            PlatformPlan::Common(plan) => plan,
            PlatformPlan::Split { windows, unix } => {
                debug!("Selecting {} variant", if self.os.is_unix() { "unix" } else { "windows" });
                self.dispatch(|| windows, || unix)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recipe::BuildCommand;

    fn split() -> PlatformPlan {
        PlatformPlan::split(
            StagePlan::run(BuildCommand::new("devenv")),
            StagePlan::run(BuildCommand::new("make")),
        )
    }

    fn program(plan: &StagePlan) -> &str {
        match &plan.steps()[0] {
            crate::recipe::Step::Run(cmd) => &cmd.program,
            other => panic!("unexpected step {:?}", other),
        }
    }

    #[test]
    fn test_select_windows_variant() {
        let plan = PlatformDispatcher::new(OsClass::Windows).select(split());
        assert_eq!(program(&plan), "devenv");
    }

    #[test]
    fn test_select_unix_variant_on_linux_and_osx() {
        for os in [OsClass::Linux, OsClass::Osx] {
            let plan = PlatformDispatcher::new(os).select(split());
            assert_eq!(program(&plan), "make");
        }
    }

    #[test]
    fn test_common_plan_passes_through() {
        let common = PlatformPlan::noop("header-only");
        let plan = PlatformDispatcher::new(OsClass::Windows).select(common);
        assert_eq!(plan.noop_reason(), Some("header-only"));
    }

    #[test]
    fn test_dispatch_invokes_exactly_one() {
        let mut calls = Vec::new();
        let result = PlatformDispatcher::new(OsClass::Linux).dispatch(
            || {
                calls.push("windows");
                true
            },
            || false,
        );
        assert!(!result);
        assert!(calls.is_empty());
    }
}
