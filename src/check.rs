//! Post-install verification probes and reporting.
//!
//! The check never raises for a failed probe: it returns a report listing
//! every absent marker with a human-readable reason, assisting the user in
//! diagnosing a failed or half-applied bootstrap.

use crate::host::HostKernel;
use camino::Utf8Path;
use std::os::unix::fs::PermissionsExt;

/// Captured environment variables relevant to the bootstrap.
///
/// Captured once and passed by value so probes stay deterministic and tests
/// can construct snapshots directly instead of mutating the process
/// environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvSnapshot {
    /// The `PATH` variable, when set.
    pub path: Option<String>,
    /// The `LD_LIBRARY_PATH` variable, when set.
    pub ld_library_path: Option<String>,
}

impl EnvSnapshot {
    /// Capture the relevant variables from the process environment.
    #[must_use]
    pub fn capture() -> Self {
        Self {
            path: std::env::var("PATH").ok(),
            ld_library_path: std::env::var("LD_LIBRARY_PATH").ok(),
        }
    }
}

/// One failed verification probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckFailure {
    /// Short name of the probe that failed.
    pub probe: &'static str,
    /// Human-readable description of what was expected.
    pub reason: String,
}

/// Outcome of running the verification probes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckReport {
    failures: Vec<CheckFailure>,
}

impl CheckReport {
    /// Returns `true` when every probe passed.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.failures.is_empty()
    }

    /// The failed probes, in evaluation order.
    #[must_use]
    pub fn failures(&self) -> &[CheckFailure] {
        &self.failures
    }

    /// Format the report for display to the user.
    #[must_use]
    pub fn display_text(&self) -> String {
        if self.passed() {
            return "Everything looks OK!".to_owned();
        }
        let mut lines = vec![format!(
            "{} check(s) failed:",
            self.failures.len()
        )];
        for failure in &self.failures {
            lines.push(format!("  {}: {}", failure.probe, failure.reason));
        }
        lines.join("\n")
    }
}

/// Run the verification probes for `prefix` against the given snapshot.
///
/// Probes, in order: the `conda` executable is present and executable under
/// the prefix, the prefix `bin/` is an entry on `PATH`, the prefix `lib/` is
/// an entry on `LD_LIBRARY_PATH`, and the prefix `site-packages` directory
/// exists for the probed interpreter series.
#[must_use]
pub fn run_checks(prefix: &Utf8Path, kernel: &HostKernel, env: &EnvSnapshot) -> CheckReport {
    let mut failures = Vec::new();

    let conda = prefix.join("bin/conda");
    if !is_executable(&conda) {
        failures.push(CheckFailure {
            probe: "conda executable",
            reason: format!("{conda} is missing or not executable"),
        });
    }

    let bin_dir = prefix.join("bin");
    if !contains_entry(env.path.as_deref(), bin_dir.as_str()) {
        failures.push(CheckFailure {
            probe: "PATH",
            reason: format!("{bin_dir} is not on PATH; was the kernel restarted?"),
        });
    }

    let lib_dir = prefix.join("lib");
    if !contains_entry(env.ld_library_path.as_deref(), lib_dir.as_str()) {
        failures.push(CheckFailure {
            probe: "LD_LIBRARY_PATH",
            reason: format!("{lib_dir} is not on LD_LIBRARY_PATH; was the kernel restarted?"),
        });
    }

    let site_packages = kernel.site_packages(prefix);
    if !site_packages.is_dir() {
        failures.push(CheckFailure {
            probe: "site-packages",
            reason: format!("{site_packages} does not exist"),
        });
    }

    CheckReport { failures }
}

/// Whether `path` is a regular file with at least one execute bit set.
fn is_executable(path: &Utf8Path) -> bool {
    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

/// Whether `value` contains `entry` as a colon-separated component.
fn contains_entry(value: Option<&str>, entry: &str) -> bool {
    value
        .map(|v| v.split(':').any(|component| component == entry))
        .unwrap_or(false)
}
