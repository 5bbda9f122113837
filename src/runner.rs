//! External command execution and installer invocation.
//!
//! This module provides the command execution seam used across the crate and
//! the logic that runs a downloaded constructor-style installer against the
//! target prefix.

use crate::error::{BootstrapError, Result};
use camino::Utf8Path;
use std::process::{Command, Output};

/// Abstraction for running external commands.
pub trait CommandExecutor {
    /// Runs a command with arguments and returns the captured output.
    ///
    /// # Errors
    ///
    /// Returns any I/O errors encountered while spawning or running the
    /// command.
    fn run(&self, cmd: &str, args: &[&str]) -> Result<Output>;
}

/// Executes commands on the host system.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemCommandExecutor;

impl CommandExecutor for SystemCommandExecutor {
    fn run(&self, cmd: &str, args: &[&str]) -> Result<Output> {
        Command::new(cmd)
            .args(args)
            .output()
            .map_err(BootstrapError::from)
    }
}

/// Runs the downloaded installer artifact non-interactively.
///
/// The artifact is a self-extracting shell script; it is invoked as
/// `bash <artifact> -bfp <prefix>` (batch mode, force, prefix). Combined
/// stdout and stderr are written to `log_path` so a failed run can be
/// diagnosed after the fact.
///
/// # Errors
///
/// Returns [`BootstrapError::InstallerFailed`] when the installer exits
/// non-zero, or [`BootstrapError::Io`] if it cannot be spawned or the log
/// cannot be written. The first failure aborts; there is no retry.
pub fn run_installer(
    executor: &dyn CommandExecutor,
    artifact: &Utf8Path,
    prefix: &Utf8Path,
    log_path: &Utf8Path,
) -> Result<()> {
    log::debug!("running installer {artifact} with prefix {prefix}");
    let output = executor.run("bash", &[artifact.as_str(), "-bfp", prefix.as_str()])?;

    write_install_log(log_path, &output)?;

    if output.status.success() {
        Ok(())
    } else {
        Err(BootstrapError::InstallerFailed {
            status: output.status.to_string(),
            log_path: log_path.to_owned(),
        })
    }
}

/// Writes combined installer stdout and stderr to the log file.
fn write_install_log(log_path: &Utf8Path, output: &Output) -> Result<()> {
    let mut contents = Vec::with_capacity(output.stdout.len() + output.stderr.len());
    contents.extend_from_slice(&output.stdout);
    contents.extend_from_slice(&output.stderr);
    std::fs::write(log_path, contents)?;
    Ok(())
}
