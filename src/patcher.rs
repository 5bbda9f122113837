//! Configuration file rewriting under the install prefix.
//!
//! After the installer lays down the distribution, three files must be
//! rewritten so the package manager cooperates with the already-running
//! kernel: the `conda-meta/pinned` version pin file, the prefix `.condarc`,
//! and the kernel startup configuration that exposes the prefix's
//! `site-packages` to the interpreter.
//!
//! All files are written whole with deterministic contents, so reapplying
//! the patch produces byte-identical files.

use crate::error::{BootstrapError, Result};
use crate::host::HostKernel;
use camino::Utf8Path;

/// Render the `conda-meta/pinned` contents for the probed kernel.
///
/// Pins the interpreter and its ABI to the running series so a solver run
/// cannot swap the interpreter out from under the kernel, and pins
/// `cudatoolkit` to the host driver series.
#[must_use]
pub fn pinned_contents(kernel: &HostKernel) -> String {
    format!(
        "python {major}.{minor}.*\npython_abi {major}.{minor}.* *{abi}*\ncudatoolkit {cuda}.*\n",
        major = kernel.python_major,
        minor = kernel.python_minor,
        abi = kernel.abi_tag(),
        cuda = kernel.cuda_series,
    )
}

/// Render the prefix `.condarc` contents.
///
/// Non-interactive hosts cannot answer prompts, and channel priority is
/// pinned so solver behaviour stays reproducible across restarts.
#[must_use]
pub fn condarc_contents() -> &'static str {
    "always_yes: true\nchannel_priority: strict\n"
}

/// Render the kernel startup configuration contents.
///
/// The generated block prepends the prefix's `site-packages` directory to
/// the interpreter module search path on each kernel start.
#[must_use]
pub fn startup_config_contents(prefix: &Utf8Path, kernel: &HostKernel) -> String {
    let site_packages = kernel.site_packages(prefix);
    format!(
        concat!(
            "c.InteractiveShellApp.exec_lines = [\n",
            "    \"import sys\",\n",
            "    \"sp = '{site_packages}'\",\n",
            "    \"if sp not in sys.path:\",\n",
            "    \"    sys.path.insert(0, sp)\",\n",
            "]\n",
        ),
        site_packages = site_packages,
    )
}

/// Rewrite the configuration files for `prefix`.
///
/// Creates `conda-meta/` and the startup configuration's parent directory
/// when absent. Idempotent: a second invocation rewrites the same bytes.
///
/// # Errors
///
/// Returns [`BootstrapError::ConfigPatch`] naming the file that could not
/// be written.
pub fn patch_configuration(prefix: &Utf8Path, kernel: &HostKernel) -> Result<()> {
    let conda_meta = prefix.join("conda-meta");
    std::fs::create_dir_all(&conda_meta)
        .map_err(|e| config_patch_error(&conda_meta, &e))?;

    let pinned = conda_meta.join("pinned");
    std::fs::write(&pinned, pinned_contents(kernel))
        .map_err(|e| config_patch_error(&pinned, &e))?;

    let condarc = prefix.join(".condarc");
    std::fs::write(&condarc, condarc_contents())
        .map_err(|e| config_patch_error(&condarc, &e))?;

    if let Some(parent) = kernel.startup_config.parent() {
        std::fs::create_dir_all(parent).map_err(|e| config_patch_error(parent, &e))?;
    }
    std::fs::write(
        &kernel.startup_config,
        startup_config_contents(prefix, kernel),
    )
    .map_err(|e| config_patch_error(&kernel.startup_config, &e))?;

    log::debug!("configuration patched under {prefix}");
    Ok(())
}

fn config_patch_error(path: &Utf8Path, err: &std::io::Error) -> BootstrapError {
    BootstrapError::ConfigPatch {
        path: path.to_owned(),
        reason: err.to_string(),
    }
}
