//! SHA-256 digest newtype for installer artifact verification.
//!
//! Validates that a checksum is a 64-character lowercase hexadecimal string
//! and provides streaming digest computation over downloaded artifacts.

use crate::error::{BootstrapError, Result};
use sha2::{Digest, Sha256};
use std::fmt;
use std::io::Read;
use std::path::Path;

/// Expected length of a hex-encoded SHA-256 digest.
const DIGEST_HEX_LEN: usize = 64;

/// Read buffer size for streaming file hashing.
const HASH_BUFFER_LEN: usize = 8192;

/// A validated hex-encoded SHA-256 digest string.
///
/// # Examples
///
/// ```
/// use condastrap::sha256_digest::Sha256Digest;
///
/// let hex = "c".repeat(64);
/// let digest: Sha256Digest = hex.as_str().try_into().unwrap();
/// assert_eq!(digest.as_str().len(), 64);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Sha256Digest(String);

impl Sha256Digest {
    /// Return the digest as a hex string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the wrapper and return the inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }

    /// Wrap a hex string produced by the `sha2` hasher.
    ///
    /// The hasher always emits 64 lowercase hex characters, so no validation
    /// is required.
    fn from_hasher_hex(hex: String) -> Self {
        Self(hex)
    }
}

impl TryFrom<&str> for Sha256Digest {
    type Error = BootstrapError;

    fn try_from(value: &str) -> Result<Self> {
        validate_sha256(value)?;
        Ok(Self(value.to_owned()))
    }
}

impl TryFrom<String> for Sha256Digest {
    type Error = BootstrapError;

    fn try_from(value: String) -> Result<Self> {
        validate_sha256(&value)?;
        Ok(Self(value))
    }
}

impl AsRef<str> for Sha256Digest {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Sha256Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Validate that `value` is a well-formed hex-encoded SHA-256 digest.
fn validate_sha256(value: &str) -> Result<()> {
    if value.len() != DIGEST_HEX_LEN {
        return Err(BootstrapError::InvalidDigest {
            reason: format!(
                "expected {DIGEST_HEX_LEN} hex characters, got {}",
                value.len()
            ),
        });
    }
    if let Some(bad) = value.chars().find(|c| !c.is_ascii_hexdigit()) {
        return Err(BootstrapError::InvalidDigest {
            reason: format!("non-hex character '{bad}'"),
        });
    }
    if value.chars().any(|c| c.is_ascii_uppercase()) {
        return Err(BootstrapError::InvalidDigest {
            reason: "digest must be lowercase".to_owned(),
        });
    }
    Ok(())
}

/// Compute the SHA-256 digest of the file at `path`.
///
/// The file is hashed in fixed-size chunks so arbitrarily large installer
/// artifacts do not need to fit in memory.
///
/// # Errors
///
/// Returns [`BootstrapError::Io`] if the file cannot be read.
pub fn compute_sha256(path: &Path) -> Result<Sha256Digest> {
    let mut file = std::fs::File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; HASH_BUFFER_LEN];
    loop {
        let bytes_read = file.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }
    let hex = format!("{:x}", hasher.finalize());
    Ok(Sha256Digest::from_hasher_hex(hex))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_digest() -> String {
        "a".repeat(64)
    }

    #[test]
    fn accepts_valid_sixty_four_char_hex() {
        let digest = Sha256Digest::try_from(valid_digest().as_str());
        assert!(digest.is_ok());
    }

    #[test]
    fn rejects_too_short() {
        let result = Sha256Digest::try_from("abcdef");
        assert!(result.is_err());
    }

    #[test]
    fn rejects_non_hex_characters() {
        let mut bad = "a".repeat(63);
        bad.push('g');
        let result = Sha256Digest::try_from(bad.as_str());
        assert!(result.is_err());
    }

    #[test]
    fn rejects_uppercase_hex() {
        let bad = "A".repeat(64);
        let result = Sha256Digest::try_from(bad.as_str());
        assert!(result.is_err());
    }

    #[test]
    fn display_shows_full_digest() {
        let hex = valid_digest();
        let digest = Sha256Digest::try_from(hex.as_str()).expect("known good");
        assert_eq!(format!("{digest}"), hex);
    }

    #[test]
    fn compute_sha256_matches_known_vector() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("artifact.sh");
        std::fs::write(&path, b"abc").expect("write fixture");

        let digest = compute_sha256(&path).expect("hash fixture");
        assert_eq!(
            digest.as_str(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn compute_sha256_of_empty_file() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("empty.sh");
        std::fs::write(&path, b"").expect("write fixture");

        let digest = compute_sha256(&path).expect("hash fixture");
        assert_eq!(
            digest.as_str(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }
}
