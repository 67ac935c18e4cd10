//! Pinned release version.
//!
//! The wrapper always installs exactly the release matching its own package
//! version. Versions appear in release URLs and as a cache directory name,
//! so only characters that are safe in both places are accepted.

use crate::error::{InstallerError, Result};
use std::fmt;

/// The version this wrapper was built as, before normalisation.
const PINNED_VERSION: &str = env!("CARGO_PKG_VERSION");

/// A normalised release version (no leading `v`).
///
/// # Examples
///
/// ```
/// use launchpad_installer::version::Version;
///
/// let version = Version::parse("v1.4.2").expect("valid version");
/// assert_eq!(version.as_str(), "1.4.2");
/// assert_eq!(version.tag(), "v1.4.2");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Version(String);

/// Characters permitted in a version: enough for semver pre-release and
/// build metadata, and nothing that can act as a path separator.
fn is_valid_version_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '+' | '_')
}

impl Version {
    /// Normalise and validate a raw version string.
    ///
    /// # Errors
    ///
    /// Returns [`InstallerError::InvalidVersion`] when the value is empty
    /// after normalisation or contains characters outside the accepted set.
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        let normalised = trimmed
            .strip_prefix('v')
            .or_else(|| trimmed.strip_prefix('V'))
            .unwrap_or(trimmed);

        if normalised.is_empty() {
            return Err(InstallerError::InvalidVersion {
                value: raw.to_owned(),
                reason: "version must not be empty".to_owned(),
            });
        }
        if let Some(bad) = normalised.chars().find(|c| !is_valid_version_char(*c)) {
            return Err(InstallerError::InvalidVersion {
                value: raw.to_owned(),
                reason: format!("invalid character '{bad}'"),
            });
        }
        if normalised.split('.').any(str::is_empty) {
            return Err(InstallerError::InvalidVersion {
                value: raw.to_owned(),
                reason: "empty version component".to_owned(),
            });
        }
        Ok(Self(normalised.to_owned()))
    }

    /// The version this wrapper package was released as.
    ///
    /// # Errors
    ///
    /// Returns [`InstallerError::InvalidVersion`] if the package metadata
    /// carries an unusable version string.
    pub fn pinned() -> Result<Self> {
        Self::parse(PINNED_VERSION)
    }

    /// Return the version as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Return the release tag (`v<version>`).
    #[must_use]
    pub fn tag(&self) -> String {
        format!("v{}", self.0)
    }
}

impl AsRef<str> for Version {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::bare("1.2.3", "1.2.3")]
    #[case::leading_v("v1.2.3", "1.2.3")]
    #[case::uppercase_v("V0.9.0", "0.9.0")]
    #[case::whitespace("  v2.0.0\n", "2.0.0")]
    #[case::pre_release("1.0.0-rc.1+build.5", "1.0.0-rc.1+build.5")]
    fn normalises_valid_versions(#[case] raw: &str, #[case] expected: &str) {
        let version = Version::parse(raw).expect("valid version");
        assert_eq!(version.as_str(), expected);
        assert_eq!(version.tag(), format!("v{expected}"));
    }

    #[rstest]
    #[case::empty("")]
    #[case::only_v("v")]
    #[case::path_separator("1.0/../../etc")]
    #[case::parent_dir("..")]
    #[case::backslash("1.0\\2")]
    #[case::inner_space("1.0 beta")]
    fn rejects_unsafe_versions(#[case] raw: &str) {
        let err = Version::parse(raw).expect_err("invalid version");
        assert!(matches!(err, InstallerError::InvalidVersion { .. }));
    }

    #[test]
    fn pinned_version_matches_package_metadata() {
        let version = Version::pinned().expect("package version is valid");
        assert_eq!(version.as_str(), env!("CARGO_PKG_VERSION"));
    }
}
