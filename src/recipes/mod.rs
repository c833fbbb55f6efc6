// src/recipes/mod.rs

//! Concrete recipes for the native dependencies
//!
//! Each recipe is data plugged into the kitchen: identity, a download URL and
//! the command lines of its three stages. Recipes that read another recipe's
//! install tree hold that recipe as a field and report it from
//! `dependencies()`.

mod jom;
mod libbtc;
mod libusb;
mod mpir;
mod openssl;
mod qt;
mod spdlog;
mod websockets;

pub use jom::Jom;
pub use libbtc::LibBtc;
pub use libusb::Libusb;
pub use mpir::Mpir;
pub use openssl::OpenSsl;
pub use qt::Qt;
pub use spdlog::Spdlog;
pub use websockets::Websockets;

use crate::recipe::{BuildCommand, Recipe};
use crate::settings::ProjectSettings;
use std::path::Path;
use std::sync::Arc;

/// Every recipe this crate ships for the target OS
///
/// jom only exists for Windows builds.
pub fn all(settings: &Arc<ProjectSettings>) -> Vec<Arc<dyn Recipe>> {
    let mut recipes: Vec<Arc<dyn Recipe>> = vec![
        Arc::new(Mpir::new(Arc::clone(settings))),
        Arc::new(OpenSsl::new(Arc::clone(settings))),
        Arc::new(LibBtc::new(Arc::clone(settings))),
        Arc::new(Libusb::new(Arc::clone(settings))),
        Arc::new(Qt::new(Arc::clone(settings))),
        Arc::new(Spdlog::new(Arc::clone(settings))),
        Arc::new(Websockets::new(Arc::clone(settings))),
    ];
    if settings.on_windows() {
        recipes.push(Arc::new(Jom::new(Arc::clone(settings))));
    }
    recipes
}

/// `make -j <jobs>`
fn parallel_make(jobs: u32) -> BuildCommand {
    BuildCommand::new("make").arg("-j").arg(jobs.max(1).to_string())
}

/// `cmake <source dir> ... -G <generator>` with the extra definitions in between
fn cmake_configure<I, S>(settings: &ProjectSettings, source_dir: &Path, definitions: I) -> BuildCommand
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    BuildCommand::new("cmake")
        .arg(source_dir.to_string_lossy())
        .args(definitions)
        .arg("-G")
        .arg(settings.cmake_generator.as_str())
}

/// `devenv <solution> /build <Release|Debug>`
fn devenv_build(settings: &ProjectSettings, solution: &str) -> BuildCommand {
    BuildCommand::new("devenv")
        .arg(solution)
        .arg("/build")
        .arg(settings.build_mode.win_configuration())
}
