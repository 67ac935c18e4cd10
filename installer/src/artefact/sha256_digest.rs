//! SHA-256 content hashing for downloaded release archives.
//!
//! Digests are computed over the raw file bytes with no normalisation so
//! that they match the values `sha256sum` writes into release manifests.

use sha2::{Digest, Sha256};
use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// Size of the read buffer used while hashing.
const READ_CHUNK: usize = 8192;

/// A hex-encoded SHA-256 digest computed from local content.
///
/// Values are always 64 lowercase hex characters; comparison against
/// manifest digests is case-insensitive via [`Sha256Digest::matches`].
///
/// # Examples
///
/// ```
/// use launchpad_installer::artefact::sha256_digest::Sha256Digest;
///
/// let digest = Sha256Digest::of_bytes(b"test");
/// assert_eq!(
///     digest.as_str(),
///     "9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08"
/// );
/// assert!(digest.matches(&digest.as_str().to_uppercase()));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Sha256Digest(String);

impl Sha256Digest {
    /// Hash an in-memory buffer.
    #[must_use]
    pub fn of_bytes(bytes: &[u8]) -> Self {
        Self::from_hasher(Sha256::new_with_prefix(bytes))
    }

    /// Hash the full contents of the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error if the file cannot be opened or read.
    pub fn of_file(path: &Path) -> io::Result<Self> {
        let mut file = File::open(path)?;
        let mut hasher = Sha256::new();
        let mut buffer = [0u8; READ_CHUNK];
        loop {
            let bytes_read = file.read(&mut buffer)?;
            let Some(chunk) = buffer.get(..bytes_read) else {
                break;
            };
            if chunk.is_empty() {
                break;
            }
            hasher.update(chunk);
        }
        Ok(Self::from_hasher(hasher))
    }

    /// Return the digest as a lowercase hex string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Compare against a hex digest from a manifest, ignoring case.
    #[must_use]
    pub fn matches(&self, expected: &str) -> bool {
        self.0.eq_ignore_ascii_case(expected.trim())
    }

    fn from_hasher(hasher: Sha256) -> Self {
        Self(format!("{:x}", hasher.finalize()))
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
