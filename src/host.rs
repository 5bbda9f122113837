//! Host kernel environment probing.
//!
//! The bootstrap tailors its configuration pins and wrapper script to the
//! interpreter already running the notebook kernel. This module probes that
//! interpreter once, up front, and carries the result as a plain value so
//! the rest of the pipeline stays free of environment lookups.

use crate::error::{BootstrapError, Result};
use crate::runner::CommandExecutor;
use camino::{Utf8Path, Utf8PathBuf};

/// Interpreter binary used by the notebook host.
pub const HOST_INTERPRETER: &str = "python3";

/// One-liner used to resolve the interpreter executable path.
///
/// Exposed so command stubs in tests can match the exact invocation.
pub const PRINT_EXECUTABLE: &str = "import sys; print(sys.executable)";

/// Default kernel startup configuration file on the notebook host.
pub const DEFAULT_STARTUP_CONFIG: &str = "/etc/ipython/ipython_config.py";

/// Placeholder CUDA series used when `CUDA_VERSION` is unset.
const CUDA_WILDCARD: &str = "*.*.*";

/// The probed host kernel environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostKernel {
    /// Absolute path of the interpreter executable backing the kernel.
    pub executable: Utf8PathBuf,
    /// Interpreter major version.
    pub python_major: u32,
    /// Interpreter minor version.
    pub python_minor: u32,
    /// CUDA series (`major.minor`) advertised by the host, `*.*` when absent.
    pub cuda_series: String,
    /// Path of the kernel startup configuration file.
    pub startup_config: Utf8PathBuf,
}

impl HostKernel {
    /// Probe the running host via the interpreter binary.
    ///
    /// Runs `python3 --version` for the interpreter series and a one-line
    /// script for the executable path. The CUDA series is read from the
    /// `CUDA_VERSION` environment variable.
    ///
    /// # Errors
    ///
    /// Returns [`BootstrapError::KernelProbe`] when the interpreter cannot
    /// be invoked or its output cannot be parsed.
    pub fn detect(executor: &dyn CommandExecutor) -> Result<Self> {
        let version_output = run_probe(executor, &["--version"])?;
        let (python_major, python_minor) = parse_python_version(&version_output)?;

        let executable_output = run_probe(executor, &["-c", PRINT_EXECUTABLE])?;
        let executable = Utf8PathBuf::from(executable_output.trim());
        if executable.as_str().is_empty() {
            return Err(BootstrapError::KernelProbe {
                reason: "interpreter reported an empty executable path".to_owned(),
            });
        }

        Ok(Self {
            executable,
            python_major,
            python_minor,
            cuda_series: cuda_series(std::env::var("CUDA_VERSION").ok().as_deref()),
            startup_config: Utf8PathBuf::from(DEFAULT_STARTUP_CONFIG),
        })
    }

    /// The prefix's `site-packages` directory for this interpreter series.
    #[must_use]
    pub fn site_packages(&self, prefix: &Utf8Path) -> Utf8PathBuf {
        prefix.join(format!(
            "lib/python{}.{}/site-packages",
            self.python_major, self.python_minor
        ))
    }

    /// The CPython ABI tag for this interpreter series, e.g. `cp310`.
    #[must_use]
    pub fn abi_tag(&self) -> String {
        format!("cp{}{}", self.python_major, self.python_minor)
    }
}

/// Run one interpreter probe and return trimmed stdout (falling back to
/// stderr, where `python3 --version` wrote historically).
fn run_probe(executor: &dyn CommandExecutor, args: &[&str]) -> Result<String> {
    let output = executor.run(HOST_INTERPRETER, args)?;
    if !output.status.success() {
        return Err(BootstrapError::KernelProbe {
            reason: format!(
                "{HOST_INTERPRETER} {} exited with {}",
                args.join(" "),
                output.status
            ),
        });
    }
    let stream = if output.stdout.is_empty() {
        &output.stderr
    } else {
        &output.stdout
    };
    Ok(String::from_utf8_lossy(stream).into_owned())
}

/// Parse `Python X.Y.Z` into `(X, Y)`.
fn parse_python_version(output: &str) -> Result<(u32, u32)> {
    let malformed = || BootstrapError::KernelProbe {
        reason: format!("could not parse interpreter version from {:?}", output.trim()),
    };

    let version = output
        .trim()
        .strip_prefix("Python ")
        .ok_or_else(malformed)?;
    let mut parts = version.split('.');
    let major = parts
        .next()
        .and_then(|p| p.parse::<u32>().ok())
        .ok_or_else(malformed)?;
    let minor = parts
        .next()
        .and_then(|p| p.parse::<u32>().ok())
        .ok_or_else(malformed)?;
    Ok((major, minor))
}

/// Reduce a `CUDA_VERSION` value to its `major.minor` series.
///
/// A missing variable degrades to a wildcard so the pin file still parses.
fn cuda_series(value: Option<&str>) -> String {
    let value = value.filter(|v| !v.is_empty()).unwrap_or(CUDA_WILDCARD);
    let components: Vec<&str> = value.split('.').take(2).collect();
    components.join(".")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{ExpectedCall, StubExecutor, output_with_stdout};
    use rstest::rstest;

    fn probed_kernel() -> HostKernel {
        HostKernel {
            executable: Utf8PathBuf::from("/usr/bin/python3"),
            python_major: 3,
            python_minor: 10,
            cuda_series: "11.8".to_owned(),
            startup_config: Utf8PathBuf::from(DEFAULT_STARTUP_CONFIG),
        }
    }

    #[test]
    fn detect_probes_version_and_executable() {
        let executor = StubExecutor::new(vec![
            ExpectedCall::new(
                HOST_INTERPRETER,
                &["--version"],
                Ok(output_with_stdout("Python 3.10.12\n")),
            ),
            ExpectedCall::new(
                HOST_INTERPRETER,
                &["-c", PRINT_EXECUTABLE],
                Ok(output_with_stdout("/usr/bin/python3\n")),
            ),
        ]);

        let kernel = temp_env::with_var("CUDA_VERSION", Some("11.8.0"), || {
            HostKernel::detect(&executor).expect("probe succeeds")
        });
        executor.assert_finished();

        assert_eq!(kernel, probed_kernel());
    }

    #[test]
    fn detect_rejects_unparseable_version() {
        let executor = StubExecutor::new(vec![ExpectedCall::new(
            HOST_INTERPRETER,
            &["--version"],
            Ok(output_with_stdout("PyPy 7.3\n")),
        )]);

        let err = HostKernel::detect(&executor).expect_err("probe fails");
        assert!(matches!(err, BootstrapError::KernelProbe { .. }));
    }

    #[test]
    fn site_packages_reflects_interpreter_series() {
        let kernel = probed_kernel();
        assert_eq!(
            kernel.site_packages(Utf8Path::new("/usr/local")),
            Utf8PathBuf::from("/usr/local/lib/python3.10/site-packages")
        );
    }

    #[test]
    fn abi_tag_concatenates_series() {
        assert_eq!(probed_kernel().abi_tag(), "cp310");
    }

    #[rstest]
    #[case::full_version(Some("12.2.140"), "12.2")]
    #[case::short_version(Some("11.8"), "11.8")]
    #[case::unset(None, "*.*")]
    #[case::empty(Some(""), "*.*")]
    fn cuda_series_reduces_to_major_minor(#[case] value: Option<&str>, #[case] expected: &str) {
        assert_eq!(cuda_series(value), expected);
    }

    #[rstest]
    #[case::plain("Python 3.11.2", 3, 11)]
    #[case::trailing_newline("Python 3.10.12\n", 3, 10)]
    fn parses_interpreter_version(#[case] output: &str, #[case] major: u32, #[case] minor: u32) {
        assert_eq!(
            parse_python_version(output).expect("version parses"),
            (major, minor)
        );
    }
}
