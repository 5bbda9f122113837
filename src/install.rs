//! Bootstrap pipeline orchestration.
//!
//! The pipeline is a fully sequential, single-threaded run of the bootstrap
//! steps: probe the host kernel, short-circuit when a working install is
//! already present, download the installer, verify its checksum, execute it,
//! patch configuration and the interpreter wrapper, record the receipt, and
//! trigger the kernel restart. The first failure aborts; there is no retry
//! or rollback.

use crate::check::{EnvSnapshot, run_checks};
use crate::distribution::Distribution;
use crate::download::{HttpDownloader, InstallerDownloader};
use crate::error::{BootstrapError, Result};
use crate::host::HostKernel;
use crate::output::{
    already_installed_message, configuring_message, downloading_message, installing_message,
    patching_message, restarting_message, success_message, verifying_message, write_stderr_line,
};
use crate::patcher::patch_configuration;
use crate::receipt::InstallReceipt;
use crate::restart::{RestartTrigger, SigkillRestart};
use crate::runner::{CommandExecutor, SystemCommandExecutor, run_installer};
use crate::sha256_digest::{Sha256Digest, compute_sha256};
use crate::wrapper::{assemble_env, patch_interpreter};
use camino::Utf8PathBuf;
use std::io::Write;
use std::time::{Duration, Instant};

/// Default install prefix on the notebook host.
pub const DEFAULT_PREFIX: &str = "/usr/local";

/// Default file the installer's combined output is written to.
pub const DEFAULT_LOG_FILENAME: &str = "condastrap_install.log";

/// Distribution label recorded for explicit-URL installs.
const CUSTOM_LABEL: &str = "custom";

/// Options controlling one bootstrap run.
#[derive(Debug, Clone)]
pub struct InstallOptions {
    /// Target location for the installation.
    pub prefix: Utf8PathBuf,
    /// Extra variables to export from the interpreter wrapper. Raw strings;
    /// no quote handling is performed.
    pub extra_env: Vec<(String, String)>,
    /// When true (the default), skip the install if the verification checks
    /// already pass for the prefix.
    pub run_checks: bool,
    /// Expected SHA-256 checksum of the installer artifact, when known.
    pub expected_sha256: Option<Sha256Digest>,
    /// When true (the default), terminate the process after a successful
    /// install so the notebook service restarts the kernel.
    pub restart: bool,
    /// Where to write the installer's combined output.
    pub log_path: Utf8PathBuf,
    /// Override the staging location of the downloaded artifact. Mainly for
    /// tests; the default is a fresh temporary file.
    pub staging_path: Option<Utf8PathBuf>,
}

impl Default for InstallOptions {
    fn default() -> Self {
        Self {
            prefix: Utf8PathBuf::from(DEFAULT_PREFIX),
            extra_env: Vec::new(),
            run_checks: true,
            expected_sha256: None,
            restart: true,
            log_path: Utf8PathBuf::from(DEFAULT_LOG_FILENAME),
            staging_path: None,
        }
    }
}

/// Terminal outcome of a bootstrap run that did not error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The distribution was installed and the environment rewired.
    Installed {
        /// Wall-clock duration of the install steps.
        elapsed: Duration,
    },
    /// The prefix already carried a working install; nothing was touched.
    AlreadyInstalled,
}

/// The bootstrap pipeline with injectable collaborators.
pub struct Bootstrap<'a> {
    downloader: &'a dyn InstallerDownloader,
    executor: &'a dyn CommandExecutor,
    restart: &'a dyn RestartTrigger,
}

impl<'a> Bootstrap<'a> {
    /// Build a pipeline from explicit collaborators.
    #[must_use]
    pub fn new(
        downloader: &'a dyn InstallerDownloader,
        executor: &'a dyn CommandExecutor,
        restart: &'a dyn RestartTrigger,
    ) -> Self {
        Self {
            downloader,
            executor,
            restart,
        }
    }

    /// Install a catalogued distribution.
    ///
    /// The distribution's pinned checksum is used unless the options carry
    /// an explicit one.
    ///
    /// # Errors
    ///
    /// Propagates any pipeline failure; see [`BootstrapError`].
    pub fn install_distribution(
        &self,
        dist: Distribution,
        options: &InstallOptions,
        stderr: &mut dyn Write,
    ) -> Result<Outcome> {
        let expected = match &options.expected_sha256 {
            Some(digest) => digest.clone(),
            None => dist.checksum()?,
        };
        let kernel = HostKernel::detect(self.executor)?;
        self.run_pipeline(
            &kernel,
            dist.installer_url(),
            dist.name(),
            Some(&expected),
            options,
            stderr,
        )
    }

    /// Install from an explicit installer URL.
    ///
    /// # Errors
    ///
    /// Propagates any pipeline failure; a malformed URL surfaces as
    /// [`BootstrapError::DownloadFailed`], never a silent no-op.
    pub fn install_from_url(
        &self,
        url: &str,
        options: &InstallOptions,
        stderr: &mut dyn Write,
    ) -> Result<Outcome> {
        let kernel = HostKernel::detect(self.executor)?;
        self.run_pipeline(
            &kernel,
            url,
            CUSTOM_LABEL,
            options.expected_sha256.as_ref(),
            options,
            stderr,
        )
    }

    /// Run the pipeline against an already-probed kernel.
    ///
    /// Public so tests and custom workflows can supply a kernel description
    /// instead of probing the live host.
    ///
    /// # Errors
    ///
    /// Propagates any pipeline failure; see [`BootstrapError`].
    pub fn run_pipeline(
        &self,
        kernel: &HostKernel,
        url: &str,
        label: &str,
        expected_sha256: Option<&Sha256Digest>,
        options: &InstallOptions,
        stderr: &mut dyn Write,
    ) -> Result<Outcome> {
        let snapshot = EnvSnapshot::capture();

        if options.run_checks && run_checks(&options.prefix, kernel, &snapshot).passed() {
            write_stderr_line(stderr, already_installed_message(&options.prefix));
            return Ok(Outcome::AlreadyInstalled);
        }

        let started = Instant::now();

        write_stderr_line(stderr, downloading_message(url));
        let staged = StagedArtifact::prepare(options.staging_path.clone())?;
        let artifact = staged.path()?;
        self.downloader.fetch(url, artifact.as_std_path())?;

        if let Some(expected) = expected_sha256 {
            write_stderr_line(stderr, verifying_message());
            let actual = compute_sha256(artifact.as_std_path())?;
            if actual != *expected {
                return Err(BootstrapError::ChecksumMismatch {
                    expected: expected.to_string(),
                    actual: actual.into_inner(),
                });
            }
        }

        write_stderr_line(stderr, installing_message(&options.prefix));
        run_installer(self.executor, &artifact, &options.prefix, &options.log_path)?;
        staged.cleanup();

        write_stderr_line(stderr, configuring_message());
        patch_configuration(&options.prefix, kernel)?;

        write_stderr_line(stderr, patching_message());
        let env = assemble_env(&options.prefix, &snapshot, &options.extra_env);
        patch_interpreter(&kernel.executable, &env)?;

        let receipt = InstallReceipt::completed_now(
            label,
            url,
            expected_sha256.map(|d| d.as_str().to_owned()),
            &options.prefix,
        );
        receipt.write(&options.prefix)?;

        let elapsed = started.elapsed();
        write_stderr_line(stderr, success_message(elapsed));

        if options.restart {
            write_stderr_line(stderr, restarting_message());
            self.restart.trigger();
        }

        Ok(Outcome::Installed { elapsed })
    }
}

/// Install the default distribution with production collaborators.
///
/// This will restart the kernel as a result (unless the options disable it).
///
/// # Errors
///
/// Propagates any pipeline failure; see [`BootstrapError`].
pub fn install(options: &InstallOptions, stderr: &mut dyn Write) -> Result<Outcome> {
    install_distribution(Distribution::DEFAULT, options, stderr)
}

/// Install a catalogued distribution with production collaborators.
///
/// # Errors
///
/// Propagates any pipeline failure; see [`BootstrapError`].
pub fn install_distribution(
    dist: Distribution,
    options: &InstallOptions,
    stderr: &mut dyn Write,
) -> Result<Outcome> {
    system_bootstrap(|bootstrap| bootstrap.install_distribution(dist, options, stderr))
}

/// Install from an explicit URL with production collaborators.
///
/// # Errors
///
/// Propagates any pipeline failure; see [`BootstrapError`].
pub fn install_from_url(
    url: &str,
    options: &InstallOptions,
    stderr: &mut dyn Write,
) -> Result<Outcome> {
    system_bootstrap(|bootstrap| bootstrap.install_from_url(url, options, stderr))
}

/// Run `f` against a pipeline wired to the production collaborators.
fn system_bootstrap<T>(f: impl FnOnce(&Bootstrap<'_>) -> Result<T>) -> Result<T> {
    let downloader = HttpDownloader;
    let executor = SystemCommandExecutor;
    let restart = SigkillRestart;
    let bootstrap = Bootstrap::new(&downloader, &executor, &restart);
    f(&bootstrap)
}

/// Staging location for the downloaded installer artifact.
enum StagedArtifact {
    /// Fresh temporary file, removed on drop.
    Temp(tempfile::NamedTempFile),
    /// Caller-supplied path, removed explicitly after the installer runs.
    Explicit(Utf8PathBuf),
}

impl StagedArtifact {
    fn prepare(explicit: Option<Utf8PathBuf>) -> Result<Self> {
        match explicit {
            Some(path) => Ok(Self::Explicit(path)),
            None => {
                let file = tempfile::Builder::new()
                    .prefix("condastrap-installer-")
                    .suffix(".sh")
                    .tempfile()?;
                Ok(Self::Temp(file))
            }
        }
    }

    fn path(&self) -> Result<Utf8PathBuf> {
        match self {
            Self::Temp(file) => Utf8PathBuf::from_path_buf(file.path().to_path_buf())
                .map_err(|path| {
                    BootstrapError::Io(std::io::Error::other(format!(
                        "installer staging path is not valid UTF-8: {}",
                        path.display()
                    )))
                }),
            Self::Explicit(path) => Ok(path.clone()),
        }
    }

    /// Remove the artifact; installers are large and the host disk is small.
    fn cleanup(self) {
        match self {
            Self::Temp(file) => drop(file),
            Self::Explicit(path) => {
                if let Err(e) = std::fs::remove_file(&path) {
                    log::debug!("could not remove staged installer {path}: {e}");
                }
            }
        }
    }
}
