// src/error.rs

//! Error types shared by the whole crate

use crate::recipe::Stage;
use std::time::Duration;
use thiserror::Error;

/// Errors raised while fetching, building or installing a recipe
#[derive(Error, Debug)]
pub enum Error {
    /// Source download failed (network, HTTP status, unreachable mirror)
    #[error("Failed to fetch {url}: {reason}")]
    FetchError { url: String, reason: String },

    /// Archive is corrupt, unsupported, or unpacked to an unexpected layout
    #[error("Archive error for {archive}: {reason}")]
    ArchiveError { archive: String, reason: String },

    /// An external build tool exited non-zero or could not be started
    #[error("{package}: {stage} stage failed ({})", describe_exit(.exit_code))]
    StageFailure {
        package: String,
        stage: Stage,
        exit_code: Option<i32>,
    },

    /// An external build tool exceeded the configured timeout and was killed
    #[error("{package}: {stage} stage timed out after {}", describe_timeout(.timeout))]
    StageTimeout {
        package: String,
        stage: Stage,
        timeout: Duration,
    },

    /// Fingerprint is present but the install tree it vouches for is not
    #[error("Cache inconsistency for {package}: {reason}")]
    CacheInconsistency { package: String, reason: String },

    /// The recipe dependency graph is not acyclic
    #[error("Circular recipe dependency: {0}")]
    CycleError(String),

    /// A recipe name that the registry does not know
    #[error("Unknown recipe: {0}")]
    UnknownRecipe(String),

    /// A dependency did not reach COMMITTED or CACHED_SKIP
    #[error("{package} was not built because its dependency {dependency} failed")]
    DependencyFailed { package: String, dependency: String },

    /// Invalid project settings
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Malformed input (settings file, URL, ...)
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Filesystem error with context
    #[error("I/O error: {0}")]
    IoError(String),

    /// Raw filesystem error
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {}", code),
        None => "no exit code".to_string(),
    }
}

fn describe_timeout(timeout: &Duration) -> String {
    if timeout.subsec_nanos() == 0 {
        format!("{} seconds", timeout.as_secs())
    } else {
        format!("{} ms", timeout.as_millis())
    }
}

/// Result alias used throughout the library
pub type Result<T> = std::result::Result<T, Error>;
