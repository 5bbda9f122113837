//! Installer artifact download logic.
//!
//! Provides a trait-based abstraction for fetching constructor-style
//! installer artifacts over HTTP, enabling dependency injection for tests
//! that must not touch the network.

use crate::error::{BootstrapError, Result};
use std::path::Path;
use std::sync::OnceLock;
use std::time::Duration;

/// Network timeout for installer artifact downloads.
///
/// Installer artifacts run to several hundred megabytes, so the timeout is
/// generous compared to a metadata fetch.
const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(600);

/// Trait for downloading an installer artifact to a local path.
///
/// The abstraction allows tests to mock HTTP behaviour without network
/// access.
#[cfg_attr(test, mockall::automock)]
pub trait InstallerDownloader {
    /// Download `url` and write the body to `dest`.
    ///
    /// # Errors
    ///
    /// Returns [`BootstrapError::ArtifactNotFound`] for HTTP 404,
    /// [`BootstrapError::DownloadFailed`] for any other request failure
    /// (including malformed URLs), and [`BootstrapError::Io`] if the
    /// destination file cannot be written.
    fn fetch(&self, url: &str, dest: &Path) -> Result<()>;
}

/// HTTP-based downloader using `ureq`.
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpDownloader;

impl InstallerDownloader for HttpDownloader {
    fn fetch(&self, url: &str, dest: &Path) -> Result<()> {
        log::debug!("downloading installer from {url}");
        let response = http_agent()
            .get(url)
            .call()
            .map_err(|e| map_ureq_error(url, &e))?;
        let mut file = std::fs::File::create(dest)?;
        std::io::copy(&mut response.into_body().as_reader(), &mut file)
            .map_err(BootstrapError::Io)?;
        Ok(())
    }
}

/// Shared `ureq` agent with request timeout configuration.
fn http_agent() -> &'static ureq::Agent {
    static AGENT: OnceLock<ureq::Agent> = OnceLock::new();
    AGENT.get_or_init(|| {
        let config = ureq::Agent::config_builder()
            .timeout_global(Some(DOWNLOAD_TIMEOUT))
            .build();
        ureq::Agent::new_with_config(config)
    })
}

/// Map a ureq error to a [`BootstrapError`].
fn map_ureq_error(url: &str, err: &ureq::Error) -> BootstrapError {
    match err {
        ureq::Error::StatusCode(404) => BootstrapError::ArtifactNotFound {
            url: url.to_owned(),
        },
        other => BootstrapError::DownloadFailed {
            url: url.to_owned(),
            reason: other.to_string(),
        },
    }
}
