//! Interpreter launch wrapper patching.
//!
//! Environment variables are read once at process start, so the only way the
//! new prefix's `bin/` and `lib/` directories become visible is through the
//! wrapper that launches the interpreter after the kernel restarts. This
//! module moves the real interpreter aside and writes an executable shell
//! wrapper in its place that exports the extended search paths.

use crate::check::EnvSnapshot;
use crate::error::{BootstrapError, Result};
use camino::{Utf8Path, Utf8PathBuf};

/// Suffix appended to the real interpreter executable when moved aside.
const REAL_SUFFIX: &str = ".real";

/// Assemble the environment exported by the wrapper script.
///
/// Starts from caller-supplied extra variables (raw strings; no quote
/// handling), then prepends the prefix `bin/` to `PATH` only when it is not
/// already an entry, and always places the prefix `lib/` first on
/// `LD_LIBRARY_PATH`. `PATH` and `LD_LIBRARY_PATH` assignments override any
/// caller-supplied values of the same name.
#[must_use]
pub fn assemble_env(
    prefix: &Utf8Path,
    snapshot: &EnvSnapshot,
    extra: &[(String, String)],
) -> Vec<(String, String)> {
    let mut env: Vec<(String, String)> = extra.to_vec();

    let bin_dir = prefix.join("bin");
    let current_path = snapshot.path.as_deref().unwrap_or("");
    if !current_path.split(':').any(|entry| entry == bin_dir.as_str()) {
        replace_or_push(
            &mut env,
            "PATH",
            format!("{bin_dir}:{current_path}"),
        );
    }

    let lib_dir = prefix.join("lib");
    let current_ld = snapshot.ld_library_path.as_deref().unwrap_or("");
    replace_or_push(
        &mut env,
        "LD_LIBRARY_PATH",
        format!("{lib_dir}:{current_ld}"),
    );

    env
}

/// Render the wrapper script for `real_executable` with `env` exported.
#[must_use]
pub fn wrapper_script(real_executable: &Utf8Path, env: &[(String, String)]) -> String {
    let assignments: Vec<String> = env
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect();
    format!(
        "#!/bin/bash\nexec env {} {} -x \"$@\"\n",
        assignments.join(" "),
        real_executable,
    )
}

/// Patch the interpreter at `executable` with a wrapper exporting `env`.
///
/// Moves the executable to `<executable>.real` and writes the wrapper in its
/// place, marked executable. Idempotent: when `<executable>.real` already
/// exists the rename is skipped and the wrapper is rewritten with the same
/// contents.
///
/// # Errors
///
/// Returns [`BootstrapError::WrapperPatch`] if the rename, write, or
/// permission change fails.
pub fn patch_interpreter(
    executable: &Utf8Path,
    env: &[(String, String)],
) -> Result<Utf8PathBuf> {
    let real = Utf8PathBuf::from(format!("{executable}{REAL_SUFFIX}"));

    if !real.exists() {
        std::fs::rename(executable, &real).map_err(|e| {
            BootstrapError::WrapperPatch(format!(
                "failed to move {executable} to {real}: {e}"
            ))
        })?;
    }

    write_executable_script(executable, &wrapper_script(&real, env))?;
    log::debug!("interpreter wrapper written at {executable}");
    Ok(real)
}

/// Writes an executable shell script (rwxr-xr-x).
fn write_executable_script(path: &Utf8Path, content: &str) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    std::fs::write(path, content)
        .map_err(|e| BootstrapError::WrapperPatch(format!("failed to write wrapper: {e}")))?;

    let mut perms = std::fs::metadata(path)
        .map_err(|e| BootstrapError::WrapperPatch(format!("failed to read permissions: {e}")))?
        .permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(path, perms).map_err(|e| {
        BootstrapError::WrapperPatch(format!("failed to set permissions: {e}"))
    })?;

    Ok(())
}

/// Replace the value for `key` when present, otherwise append it.
fn replace_or_push(env: &mut Vec<(String, String)>, key: &str, value: String) {
    if let Some(slot) = env.iter_mut().find(|(k, _)| k == key) {
        slot.1 = value;
    } else {
        env.push((key.to_owned(), value));
    }
}
