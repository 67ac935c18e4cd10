//! Checksum verification of downloaded release archives.
//!
//! Verification is mandatory and fails closed: a missing manifest, a
//! manifest without an entry for the archive, and a digest mismatch all
//! abort installation. Releases may publish either a global
//! `checksums.txt` or a per-release `<project>_<version>_checksums.txt`;
//! candidates are tried in that order and the first one found is used.

use super::checksum::ChecksumManifest;
use super::download::{AssetFetcher, DownloadError, FetchOutcome};
use super::sha256_digest::Sha256Digest;
use crate::version::Version;
use log::debug;
use std::io;
use std::path::Path;

/// Errors that block installation of a downloaded archive.
#[derive(Debug, thiserror::Error)]
pub enum VerificationError {
    /// None of the candidate manifests exist for the release.
    #[error("no checksum file found for v{version} (tried: {tried})")]
    ManifestNotFound {
        /// The release version.
        version: String,
        /// Comma-separated list of the manifest names that were tried.
        tried: String,
    },

    /// The manifest does not list the archive.
    #[error("checksum for {archive} not found in {manifest}")]
    DigestNotFound {
        /// The archive filename that was looked up.
        archive: String,
        /// The manifest that was searched.
        manifest: String,
    },

    /// The archive digest differs from the manifest.
    #[error("checksum mismatch for {archive}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        /// The archive filename.
        archive: String,
        /// The digest recorded in the manifest.
        expected: String,
        /// The digest computed from the downloaded file.
        actual: String,
    },

    /// A manifest download failed for a reason other than 404.
    #[error("checksum manifest download failed: {0}")]
    Download(#[from] DownloadError),

    /// The downloaded archive could not be read for hashing.
    #[error("could not hash {archive}: {source}")]
    Hash {
        /// The archive filename.
        archive: String,
        /// The underlying read error.
        #[source]
        source: io::Error,
    },
}

/// Where a release's files are published.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseLocation<'a> {
    /// URL prefix for the release's assets, without a trailing slash.
    pub base_url: &'a str,
    /// The project name used in asset and manifest filenames.
    pub project: &'a str,
    /// The release version.
    pub version: &'a Version,
}

impl ReleaseLocation<'_> {
    /// Return the URL of a file published with the release.
    #[must_use]
    pub fn asset_url(&self, filename: &str) -> String {
        format!("{}/{filename}", self.base_url.trim_end_matches('/'))
    }

    /// Return the manifest filenames to try, in priority order.
    #[must_use]
    pub fn manifest_candidates(&self) -> [String; 2] {
        [
            "checksums.txt".to_owned(),
            format!("{}_{}_checksums.txt", self.project, self.version),
        ]
    }
}

/// Verify the archive at `archive_path` against the release manifest.
///
/// Success is silent; any failure is returned as a [`VerificationError`].
///
/// # Errors
///
/// See [`VerificationError`] for the failure modes.
pub fn verify_release(
    fetcher: &dyn AssetFetcher,
    release: &ReleaseLocation<'_>,
    archive_name: &str,
    archive_path: &Path,
) -> Result<(), VerificationError> {
    let (manifest_name, manifest_text) = fetch_manifest(fetcher, release)?;

    let manifest = ChecksumManifest::parse(&manifest_text);
    let expected = manifest
        .lookup(archive_name)
        .ok_or_else(|| VerificationError::DigestNotFound {
            archive: archive_name.to_owned(),
            manifest: manifest_name.clone(),
        })?;

    let actual = Sha256Digest::of_file(archive_path).map_err(|source| VerificationError::Hash {
        archive: archive_name.to_owned(),
        source,
    })?;

    if !actual.matches(expected) {
        return Err(VerificationError::ChecksumMismatch {
            archive: archive_name.to_owned(),
            expected: expected.to_owned(),
            actual: actual.to_string(),
        });
    }

    debug!("{archive_name} matches {manifest_name}");
    Ok(())
}

/// Fetch the first manifest candidate that exists.
fn fetch_manifest(
    fetcher: &dyn AssetFetcher,
    release: &ReleaseLocation<'_>,
) -> Result<(String, String), VerificationError> {
    let candidates = release.manifest_candidates();
    for candidate in &candidates {
        if let FetchOutcome::Found(text) = fetcher.fetch_text(&release.asset_url(candidate))? {
            debug!("using checksum manifest {candidate}");
            return Ok((candidate.clone(), text));
        }
    }
    Err(VerificationError::ManifestNotFound {
        version: release.version.to_string(),
        tried: candidates.join(", "),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artefact::download::MockAssetFetcher;
    use mockall::predicate::eq;

    const BASE: &str = "https://example.test/releases/download/v1.2.3";
    const ARCHIVE: &str = "tool_linux_amd64.tar.gz";
    const CONTENT: &[u8] = b"archive bytes";

    struct Fixture {
        _temp: tempfile::TempDir,
        archive_path: std::path::PathBuf,
        version: Version,
    }

    fn fixture(content: &[u8]) -> Fixture {
        let temp = tempfile::tempdir().expect("temp dir");
        let archive_path = temp.path().join(ARCHIVE);
        std::fs::write(&archive_path, content).expect("write archive");
        Fixture {
            _temp: temp,
            archive_path,
            version: Version::parse("1.2.3").expect("version"),
        }
    }

    fn manifest_for(content: &[u8]) -> String {
        format!("{}  {ARCHIVE}\n", Sha256Digest::of_bytes(content))
    }

    fn run(fetcher: &MockAssetFetcher, fixture: &Fixture) -> Result<(), VerificationError> {
        let release = ReleaseLocation {
            base_url: BASE,
            project: "tool",
            version: &fixture.version,
        };
        verify_release(fetcher, &release, ARCHIVE, &fixture.archive_path)
    }

    #[test]
    fn global_manifest_is_preferred() {
        let fixture = fixture(CONTENT);
        let mut fetcher = MockAssetFetcher::new();
        let manifest = manifest_for(CONTENT);
        fetcher
            .expect_fetch_text()
            .with(eq(format!("{BASE}/checksums.txt")))
            .times(1)
            .returning(move |_| Ok(FetchOutcome::Found(manifest.clone())));

        run(&fetcher, &fixture).expect("verification succeeds");
    }

    #[test]
    fn per_release_manifest_is_used_when_global_is_missing() {
        let fixture = fixture(CONTENT);
        let mut fetcher = MockAssetFetcher::new();
        fetcher
            .expect_fetch_text()
            .with(eq(format!("{BASE}/checksums.txt")))
            .returning(|_| Ok(FetchOutcome::NotFound));
        let manifest = manifest_for(CONTENT);
        fetcher
            .expect_fetch_text()
            .with(eq(format!("{BASE}/tool_1.2.3_checksums.txt")))
            .returning(move |_| Ok(FetchOutcome::Found(manifest.clone())));

        run(&fetcher, &fixture).expect("verification succeeds");
    }

    #[test]
    fn missing_manifests_fail_closed() {
        let fixture = fixture(CONTENT);
        let mut fetcher = MockAssetFetcher::new();
        fetcher
            .expect_fetch_text()
            .times(2)
            .returning(|_| Ok(FetchOutcome::NotFound));

        let err = run(&fetcher, &fixture).expect_err("no manifest");
        assert!(
            matches!(err, VerificationError::ManifestNotFound { ref tried, .. }
                if tried == "checksums.txt, tool_1.2.3_checksums.txt"),
            "unexpected error: {err}"
        );
    }

    #[test]
    fn manifest_without_entry_fails() {
        let fixture = fixture(CONTENT);
        let mut fetcher = MockAssetFetcher::new();
        fetcher
            .expect_fetch_text()
            .returning(|_| Ok(FetchOutcome::Found("abcd  other.tar.gz\n".to_owned())));

        let err = run(&fetcher, &fixture).expect_err("no digest");
        assert!(
            matches!(err, VerificationError::DigestNotFound { ref manifest, .. }
                if manifest == "checksums.txt"),
            "unexpected error: {err}"
        );
    }

    #[test]
    fn single_corrupted_byte_is_a_mismatch() {
        let mut corrupted = CONTENT.to_vec();
        if let Some(first) = corrupted.first_mut() {
            *first ^= 0x01;
        }
        let fixture = fixture(&corrupted);
        let mut fetcher = MockAssetFetcher::new();
        let manifest = manifest_for(CONTENT);
        fetcher
            .expect_fetch_text()
            .returning(move |_| Ok(FetchOutcome::Found(manifest.clone())));

        let err = run(&fetcher, &fixture).expect_err("mismatch");
        assert!(matches!(err, VerificationError::ChecksumMismatch { .. }));
    }

    #[test]
    fn uppercase_manifest_digest_is_accepted() {
        let fixture = fixture(CONTENT);
        let mut fetcher = MockAssetFetcher::new();
        let manifest = manifest_for(CONTENT).to_uppercase().replace(
            &ARCHIVE.to_uppercase(),
            ARCHIVE,
        );
        fetcher
            .expect_fetch_text()
            .returning(move |_| Ok(FetchOutcome::Found(manifest.clone())));

        run(&fetcher, &fixture).expect("case-insensitive comparison");
    }

    #[test]
    fn network_failure_propagates() {
        let fixture = fixture(CONTENT);
        let mut fetcher = MockAssetFetcher::new();
        fetcher.expect_fetch_text().returning(|url| {
            Err(DownloadError::Http {
                url: url.to_owned(),
                reason: "connection reset".to_owned(),
            })
        });

        let err = run(&fetcher, &fixture).expect_err("network failure");
        assert!(matches!(err, VerificationError::Download(_)));
    }

    #[test]
    fn asset_url_tolerates_trailing_slash() {
        let version = Version::parse("1.0.0").expect("version");
        let release = ReleaseLocation {
            base_url: "https://example.test/v1.0.0/",
            project: "tool",
            version: &version,
        };
        assert_eq!(
            release.asset_url("checksums.txt"),
            "https://example.test/v1.0.0/checksums.txt"
        );
    }
}
