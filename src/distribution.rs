//! Catalogue of supported Conda-based installer distributions.
//!
//! Each catalogued distribution resolves deterministically to a pinned
//! installer URL and a pinned SHA-256 checksum, all built for the same host
//! interpreter series the notebook environment ships.

use crate::error::{BootstrapError, Result};
use crate::sha256_digest::Sha256Digest;
use std::fmt;
use std::str::FromStr;

/// A Conda-based distribution installable by the bootstrap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Distribution {
    /// Miniconda-like distribution preconfigured for conda-forge, including
    /// `mamba`, a faster `conda` implementation. The default.
    Mambaforge,
    /// Miniconda-like distribution preconfigured for conda-forge.
    Miniforge,
    /// Minimal Anaconda installer.
    Miniconda,
    /// Full Anaconda distribution.
    Anaconda,
}

/// All catalogued distributions, in help-text order.
pub const ALL_DISTRIBUTIONS: [Distribution; 4] = [
    Distribution::Mambaforge,
    Distribution::Miniforge,
    Distribution::Miniconda,
    Distribution::Anaconda,
];

impl Distribution {
    /// The distribution installed by [`crate::install::install`].
    pub const DEFAULT: Self = Self::Mambaforge;

    /// Lowercase catalogue name, as accepted on the command line.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Mambaforge => "mambaforge",
            Self::Miniforge => "miniforge",
            Self::Miniconda => "miniconda",
            Self::Anaconda => "anaconda",
        }
    }

    /// The pinned installer URL for this distribution.
    ///
    /// Resolution is deterministic: the same distribution always yields the
    /// same URL.
    #[must_use]
    pub fn installer_url(self) -> &'static str {
        match self {
            Self::Mambaforge => {
                "https://github.com/conda-forge/miniforge/releases/download/23.1.0-1/Mambaforge-23.1.0-1-Linux-x86_64.sh"
            }
            Self::Miniforge => {
                "https://github.com/conda-forge/miniforge/releases/download/23.1.0-1/Miniforge3-23.1.0-1-Linux-x86_64.sh"
            }
            Self::Miniconda => {
                "https://repo.anaconda.com/miniconda/Miniconda3-py310_23.3.1-0-Linux-x86_64.sh"
            }
            Self::Anaconda => {
                "https://repo.anaconda.com/archive/Anaconda3-2023.03-1-Linux-x86_64.sh"
            }
        }
    }

    /// The published SHA-256 checksum of the pinned installer.
    fn checksum_hex(self) -> &'static str {
        match self {
            Self::Mambaforge => {
                "cfb16c47dc2d115c8b114280aa605e322173f029fdb847a45348bf4bd23c62ab"
            }
            Self::Miniforge => {
                "7a5859e873ed36fc9a141fff0ac60e133b971b3413aed49a4c82693d4f4a2ad2"
            }
            Self::Miniconda => {
                "aef279d6baea7f67940f16aad17ebe5f6aac97487c7c03466ff01f4819e5a651"
            }
            Self::Anaconda => {
                "95102d7c732411f1458a20bdf47e4c1b0b6c8a21a2edfe4052ca370aaae57bab"
            }
        }
    }

    /// The validated SHA-256 checksum of the pinned installer.
    ///
    /// # Errors
    ///
    /// Never fails for catalogued values; the `Result` exists so callers can
    /// propagate with `?` instead of asserting.
    pub fn checksum(self) -> Result<Sha256Digest> {
        Sha256Digest::try_from(self.checksum_hex())
    }
}

impl fmt::Display for Distribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Distribution {
    type Err = BootstrapError;

    fn from_str(s: &str) -> Result<Self> {
        ALL_DISTRIBUTIONS
            .into_iter()
            .find(|dist| dist.name() == s)
            .ok_or_else(|| BootstrapError::UnknownDistribution {
                name: s.to_owned(),
                known: known_names(),
            })
    }
}

/// Comma-separated list of catalogued distribution names for diagnostics.
fn known_names() -> String {
    let names: Vec<&str> = ALL_DISTRIBUTIONS.iter().map(|d| d.name()).collect();
    names.join(", ")
}
