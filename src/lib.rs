// src/lib.rs

//! Larder: native dependency builder
//!
//! Fetches, builds and installs the third-party native libraries an
//! application links against, each into `<build dir>/<package>/{include,lib}`.
//!
//! # Architecture
//!
//! - Recipes: declarative per-library descriptions (URL, version, stage plans)
//! - Kitchen: runs each recipe's pipeline in dependency order
//! - Revision cache: one fingerprint per recipe decides whether to rebuild at all
//! - Settings: one immutable value shared by every recipe for a run

mod error;
pub mod recipe;
pub mod recipes;
pub mod settings;

pub use error::{Error, Result};
pub use recipe::{
    BuildReport, CookResult, Kitchen, KitchenConfig, PipelineState, Recipe, RecipeRegistry,
};
pub use settings::{BuildMode, LinkMode, OsClass, ProjectSettings};
