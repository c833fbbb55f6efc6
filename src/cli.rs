// src/cli.rs
//! CLI definitions for larder
//!
//! The actual command implementations are in the `commands` module.

use clap::{Args, Parser, Subcommand};
use larder::{BuildMode, LinkMode, OsClass};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "larder")]
#[command(version)]
#[command(about = "Fetch, build and install native third-party dependencies", long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub settings: SettingsArgs,

    /// Log at debug level (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Overrides applied on top of the settings file (or host defaults)
#[derive(Args, Debug, Clone, Default)]
pub struct SettingsArgs {
    /// TOML settings file
    #[arg(long, global = true)]
    pub settings: Option<PathBuf>,

    /// Root directory for build and install trees
    #[arg(long, global = true)]
    pub build_dir: Option<PathBuf>,

    /// Directory for downloaded archives and unpacked sources
    #[arg(long, global = true)]
    pub sources_dir: Option<PathBuf>,

    /// Target operating system
    #[arg(long, global = true, value_enum)]
    pub os: Option<OsClass>,

    #[arg(long, global = true, value_enum)]
    pub build_mode: Option<BuildMode>,

    #[arg(long, global = true, value_enum)]
    pub link_mode: Option<LinkMode>,

    /// CMake generator
    #[arg(long, global = true)]
    pub generator: Option<String>,

    /// Parallel jobs for make
    #[arg(short, long, global = true)]
    pub jobs: Option<u32>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build and install recipes (all when none are named)
    Cook {
        /// Recipe names; their dependencies are included
        recipes: Vec<String>,

        /// Kill a build tool that runs longer than this many seconds
        #[arg(long)]
        timeout: Option<u64>,

        /// Cook independent recipes concurrently
        #[arg(long)]
        parallel: bool,

        /// Rebuild even when the recorded revision matches
        #[arg(long)]
        force: bool,

        /// Stop at the first failure
        #[arg(long)]
        fail_fast: bool,
    },

    /// Download and unpack sources without building
    Fetch {
        recipes: Vec<String>,
    },

    /// Show recorded and current revisions
    Status {
        recipes: Vec<String>,
    },

    /// List recipes in build order
    List,

    /// Forget recorded revisions so the next cook rebuilds
    Invalidate {
        #[arg(required = true)]
        recipes: Vec<String>,
    },
}
