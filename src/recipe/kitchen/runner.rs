// src/recipe/kitchen/runner.rs

//! Spawning external build tools
//!
//! Every stage step that runs a program goes through a `CommandRunner`.
//! Only the exit status is observed; build output goes straight to the
//! terminal, as it would when running the tool by hand.

use crate::error::Result;
use crate::recipe::BuildCommand;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Duration;
use tracing::{debug, warn};
use wait_timeout::ChildExt;

/// How an external command ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandStatus {
    /// Process exited with this code
    Exited(i32),
    /// Process was terminated by a signal
    Signaled,
    /// Program could not be started
    NotStarted,
    /// Process exceeded the timeout and was killed
    TimedOut,
}

impl CommandStatus {
    pub fn success(&self) -> bool {
        matches!(self, Self::Exited(0))
    }

    pub fn code(&self) -> Option<i32> {
        match self {
            Self::Exited(code) => Some(*code),
            _ => None,
        }
    }
}

/// Runs one external command line to completion
pub trait CommandRunner: Send + Sync {
    /// Run `command` in `cwd` (unless the command names its own directory)
    fn run(&self, command: &BuildCommand, cwd: &Path) -> Result<CommandStatus>;
}

/// Runs commands as real child processes
#[derive(Debug, Clone, Default)]
pub struct ProcessRunner {
    timeout: Option<Duration>,
}

impl ProcessRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Kill commands that run longer than `timeout`
    pub fn with_timeout(timeout: Option<Duration>) -> Self {
        Self { timeout }
    }

    /// Resolve bare program names on PATH so a missing tool is reported clearly
    fn resolve_program(program: &str) -> PathBuf {
        let path = Path::new(program);
        if path.components().count() > 1 {
            return path.to_path_buf();
        }
        which::which(program).unwrap_or_else(|_| path.to_path_buf())
    }
}

impl CommandRunner for ProcessRunner {
    fn run(&self, command: &BuildCommand, cwd: &Path) -> Result<CommandStatus> {
        let workdir = command.cwd.as_deref().unwrap_or(cwd);
        let program = Self::resolve_program(&command.program);
        debug!("Spawning {} in {}", program.display(), workdir.display());

        let mut child = match Command::new(&program)
            .args(&command.args)
            .envs(command.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .current_dir(workdir)
            .stdin(Stdio::null())
            .spawn()
        {
            Ok(child) => child,
            Err(e) => {
                warn!("Failed to start {}: {}", command.program, e);
                return Ok(CommandStatus::NotStarted);
            }
        };

        let status = match self.timeout {
            Some(timeout) => match child.wait_timeout(timeout)? {
                Some(status) => status,
                None => {
                    warn!(
                        "{} exceeded {} seconds, killing it",
                        command.program,
                        timeout.as_secs()
                    );
                    let _ = child.kill();
                    let _ = child.wait();
                    return Ok(CommandStatus::TimedOut);
                }
            },
            None => child.wait()?,
        };

        Ok(match status.code() {
            Some(code) => CommandStatus::Exited(code),
            None => CommandStatus::Signaled,
        })
    }
}
