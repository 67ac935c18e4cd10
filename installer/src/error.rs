//! Error types for the launcher.
//!
//! Every failure aborts the current install attempt; none are retried or
//! downgraded. Entry points print the error as a single line and exit with
//! a non-zero status.

use crate::artefact::download::DownloadError;
use crate::artefact::extraction::ExtractionError;
use crate::artefact::verification::VerificationError;
use crate::platform::UnsupportedPlatform;
use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors that can occur while installing or launching the release binary.
#[derive(Debug, Error)]
pub enum InstallerError {
    /// The host operating system or architecture has no published release.
    #[error(transparent)]
    UnsupportedPlatform(#[from] UnsupportedPlatform),

    /// The release does not publish an asset for this platform.
    #[error("release asset not found for {platform} at v{version}: {asset}")]
    AssetNotFound {
        /// The resolved platform, e.g. `linux/amd64`.
        platform: String,
        /// The release version.
        version: String,
        /// The asset filename that was requested.
        asset: String,
    },

    /// Checksum verification rejected the downloaded archive.
    #[error(transparent)]
    Verification(#[from] VerificationError),

    /// The executable could not be extracted from the archive.
    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    /// A network request failed for a reason other than 404.
    #[error(transparent)]
    Network(DownloadError),

    /// The pinned version string is unusable.
    #[error("invalid version \"{value}\": {reason}")]
    InvalidVersion {
        /// The rejected version string.
        value: String,
        /// Description of the validation failure.
        reason: String,
    },

    /// The install root could not be determined or created.
    #[error("install root unavailable: {reason}")]
    InstallRootUnavailable {
        /// Description of why the root is unavailable.
        reason: String,
    },

    /// Configuration could not be read or parsed.
    #[error("invalid configuration{}: {reason}", path.as_ref().map(|p| format!(" at {p}")).unwrap_or_default())]
    Config {
        /// The file that failed to load, when one was involved.
        path: Option<Utf8PathBuf>,
        /// Description of the failure.
        reason: String,
    },

    /// The installed binary could not be started.
    #[error("failed to launch {path}: {source}")]
    Launch {
        /// The binary that was executed.
        path: Utf8PathBuf,
        /// The underlying spawn error.
        #[source]
        source: std::io::Error,
    },

    /// A local filesystem operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<DownloadError> for InstallerError {
    fn from(err: DownloadError) -> Self {
        match err {
            DownloadError::Io(source) => Self::Io(source),
            http @ DownloadError::Http { .. } => Self::Network(http),
        }
    }
}

/// Result type alias using [`InstallerError`].
pub type Result<T> = std::result::Result<T, InstallerError>;
