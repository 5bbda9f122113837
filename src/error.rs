//! Error types for the condastrap bootstrap.
//!
//! This module defines semantic error variants that provide actionable
//! guidance when the bootstrap fails. Download and installer failures are
//! fatal and surfaced verbatim; no partial-install recovery is attempted.

use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors that can occur during the bootstrap process.
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// Downloading the installer artifact failed.
    #[error("download failed for {url}: {reason}")]
    DownloadFailed {
        /// The URL that was requested.
        url: String,
        /// A human-readable description of the failure.
        reason: String,
    },

    /// The installer artifact was not found (HTTP 404).
    #[error("installer not found: {url}")]
    ArtifactNotFound {
        /// The URL that returned 404.
        url: String,
    },

    /// The downloaded artifact does not match the expected checksum.
    #[error("checksum mismatch: expected {expected}, got {actual}")]
    ChecksumMismatch {
        /// The digest recorded for the distribution.
        expected: String,
        /// The digest computed from the downloaded artifact.
        actual: String,
    },

    /// A SHA-256 digest string is not well formed.
    #[error("invalid SHA-256 digest: {reason}")]
    InvalidDigest {
        /// Description of the validation failure.
        reason: String,
    },

    /// The requested distribution name is not in the catalogue.
    #[error("unknown distribution {name}; expected one of {known}")]
    UnknownDistribution {
        /// The name that failed to resolve.
        name: String,
        /// Comma-separated list of catalogued distribution names.
        known: String,
    },

    /// The installer executable returned a non-zero status.
    #[error("installer failed ({status}); logs are available at {log_path}")]
    InstallerFailed {
        /// Rendered exit status of the installer process.
        status: String,
        /// Path to the captured installer output.
        log_path: Utf8PathBuf,
    },

    /// Probing the host kernel environment failed.
    #[error("host kernel probe failed: {reason}")]
    KernelProbe {
        /// Description of why the probe failed.
        reason: String,
    },

    /// Rewriting a configuration file under the prefix failed.
    #[error("configuration patch failed for {path}: {reason}")]
    ConfigPatch {
        /// Path of the file that could not be written.
        path: Utf8PathBuf,
        /// Description of the underlying failure.
        reason: String,
    },

    /// Patching the interpreter launch wrapper failed.
    #[error("interpreter wrapper patch failed: {0}")]
    WrapperPatch(String),

    /// The install receipt could not be written or read.
    #[error("install receipt error at {path}: {reason}")]
    Receipt {
        /// Path of the receipt file.
        path: Utf8PathBuf,
        /// Description of the underlying failure.
        reason: String,
    },

    /// An `--env` assignment was not of the form `KEY=VALUE`.
    #[error("invalid environment assignment {value}; expected KEY=VALUE")]
    InvalidEnvAssignment {
        /// The malformed assignment as supplied.
        value: String,
    },

    /// An I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Test stub received an unexpected or mismatched invocation.
    #[cfg(any(test, feature = "test-support"))]
    #[error("stub mismatch: {message}")]
    StubMismatch {
        /// Description of what was expected versus what was received.
        message: String,
    },
}

/// Result type alias using [`BootstrapError`].
pub type Result<T> = std::result::Result<T, BootstrapError>;
