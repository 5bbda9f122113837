//! Install receipt persistence.
//!
//! A successful bootstrap records what it installed in a small JSON receipt
//! at `<prefix>/conda-meta/condastrap.json`. The receipt doubles as the
//! "already installed" marker and lets a later `check` report which
//! distribution laid the prefix down.

use crate::error::{BootstrapError, Result};
use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Receipt file name under `conda-meta/`.
const RECEIPT_FILENAME: &str = "condastrap.json";

/// Record of one completed bootstrap.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InstallReceipt {
    /// Catalogue name of the installed distribution, or `custom` for an
    /// explicit URL install.
    pub distribution: String,
    /// The installer URL that was downloaded.
    pub installer_url: String,
    /// Hex digest the artifact was verified against, when one was supplied.
    pub sha256: Option<String>,
    /// The install prefix.
    pub prefix: String,
    /// Completion time, seconds since the Unix epoch.
    pub completed_at_epoch_secs: u64,
}

impl InstallReceipt {
    /// Build a receipt completed now.
    #[must_use]
    pub fn completed_now(
        distribution: &str,
        installer_url: &str,
        sha256: Option<String>,
        prefix: &Utf8Path,
    ) -> Self {
        Self {
            distribution: distribution.to_owned(),
            installer_url: installer_url.to_owned(),
            sha256,
            prefix: prefix.to_string(),
            completed_at_epoch_secs: epoch_secs_now(),
        }
    }

    /// Write the receipt under `prefix`.
    ///
    /// # Errors
    ///
    /// Returns [`BootstrapError::Receipt`] when serialization or the write
    /// fails.
    pub fn write(&self, prefix: &Utf8Path) -> Result<()> {
        let path = receipt_path(prefix);
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| receipt_error(&path, &e))?;
        std::fs::write(&path, json).map_err(|e| receipt_error(&path, &e))?;
        Ok(())
    }

    /// Read the receipt under `prefix`, if one exists.
    ///
    /// # Errors
    ///
    /// Returns [`BootstrapError::Receipt`] when the file exists but cannot
    /// be read or parsed. A missing receipt is `Ok(None)`.
    pub fn read(prefix: &Utf8Path) -> Result<Option<Self>> {
        let path = receipt_path(prefix);
        if !path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(&path).map_err(|e| receipt_error(&path, &e))?;
        let receipt = serde_json::from_str(&contents).map_err(|e| receipt_error(&path, &e))?;
        Ok(Some(receipt))
    }
}

/// Path of the receipt file under `prefix`.
#[must_use]
pub fn receipt_path(prefix: &Utf8Path) -> Utf8PathBuf {
    prefix.join("conda-meta").join(RECEIPT_FILENAME)
}

fn receipt_error(path: &Utf8Path, err: &dyn std::fmt::Display) -> BootstrapError {
    BootstrapError::Receipt {
        path: path.to_owned(),
        reason: err.to_string(),
    }
}

fn epoch_secs_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
