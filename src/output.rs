//! Progress and status message formatting.
//!
//! User-facing progress goes through an injected writer so the pipeline can
//! be exercised in tests without touching the process's real stderr, and so
//! `--quiet` can swap in a sink.

use camino::Utf8Path;
use std::io::Write;
use std::time::Duration;

/// Write one line to the injected writer, ignoring write failures.
pub fn write_stderr_line(stderr: &mut dyn Write, message: impl std::fmt::Display) {
    if writeln!(stderr, "{message}").is_err() {
        // Best-effort logging; ignore write failures.
    }
}

/// Message announcing the download step.
#[must_use]
pub fn downloading_message(url: &str) -> String {
    format!("Downloading {url}...")
}

/// Message announcing checksum verification.
#[must_use]
pub fn verifying_message() -> String {
    "Verifying checksum...".to_owned()
}

/// Message announcing the installer execution step.
#[must_use]
pub fn installing_message(prefix: &Utf8Path) -> String {
    format!("Installing to {prefix}...")
}

/// Message announcing the configuration patch step.
#[must_use]
pub fn configuring_message() -> String {
    "Adjusting configuration...".to_owned()
}

/// Message announcing the wrapper patch step.
#[must_use]
pub fn patching_message() -> String {
    "Patching interpreter wrapper...".to_owned()
}

/// Message announcing the kernel restart.
#[must_use]
pub fn restarting_message() -> String {
    "Restarting kernel so the new environment takes effect...".to_owned()
}

/// Success message reporting the total elapsed time.
#[must_use]
pub fn success_message(elapsed: Duration) -> String {
    format!("Done in {}", format_duration(elapsed))
}

/// Message reporting that the prefix already carries a verified install.
#[must_use]
pub fn already_installed_message(prefix: &Utf8Path) -> String {
    format!("{prefix} already carries a working install; nothing to do")
}

/// Message reporting the provenance recorded by a completed install.
#[must_use]
pub fn installed_from_message(distribution: &str, url: &str) -> String {
    format!("{distribution} installed from {url}")
}

/// Render a duration as whole minutes and seconds.
#[must_use]
pub fn format_duration(duration: Duration) -> String {
    let total_secs = duration.as_secs();
    let minutes = total_secs / 60;
    let seconds = total_secs % 60;
    if minutes == 0 {
        format!("{seconds}s")
    } else {
        format!("{minutes}m {seconds}s")
    }
}
