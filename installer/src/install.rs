//! Install orchestration: make the pinned release binary available locally.
//!
//! The flow is resolve platform, check the cache, and on a miss download,
//! verify, extract and commit. A cache hit returns immediately with no
//! network access and no re-verification. Every failure aborts the attempt;
//! the staging directory is removed on all paths so no partial entry
//! survives.

use camino::{Utf8Path, Utf8PathBuf};
use log::debug;
use std::io::Write;

use crate::artefact::download::{AssetFetcher, FetchOutcome, HttpFetcher};
use crate::artefact::extraction::{ArchiveExtractor, TarExtractor};
use crate::artefact::naming::{AssetName, accepted_member_names, binary_name};
use crate::artefact::verification::{ReleaseLocation, verify_release};
use crate::cache::CacheManager;
use crate::config::LauncherConfig;
use crate::error::{InstallerError, Result};
use crate::output::write_progress;
use crate::platform::{HostDescriptor, PlatformTriplet};
use crate::version::Version;

/// Inputs for one install attempt.
#[derive(Debug, Clone, Copy)]
pub struct InstallRequest<'a> {
    /// Project, release URL and output settings.
    pub config: &'a LauncherConfig,
    /// The pinned release version.
    pub version: &'a Version,
    /// The host to install for.
    pub host: HostDescriptor<'a>,
    /// The directory holding per-version cache entries.
    pub install_root: &'a Utf8Path,
}

/// Ensure the release binary is installed using the production HTTP fetcher
/// and tar extractor, returning its path.
///
/// # Errors
///
/// See [`ensure_installed_with`].
pub fn ensure_installed(request: &InstallRequest<'_>, stderr: &mut dyn Write) -> Result<Utf8PathBuf> {
    let fetcher = HttpFetcher::new(request.config.timeout());
    ensure_installed_with(request, &fetcher, &TarExtractor, stderr)
}

/// Testable inner function with injected fetcher and extractor.
///
/// # Errors
///
/// Returns [`InstallerError::UnsupportedPlatform`] before any I/O when the
/// host is not supported, [`InstallerError::AssetNotFound`] when the release
/// has no archive for the platform, and the verification, extraction,
/// network or filesystem error that aborted the install otherwise.
pub fn ensure_installed_with(
    request: &InstallRequest<'_>,
    fetcher: &dyn AssetFetcher,
    extractor: &dyn ArchiveExtractor,
    stderr: &mut dyn Write,
) -> Result<Utf8PathBuf> {
    let InstallRequest {
        config,
        version,
        host,
        install_root,
    } = *request;

    let platform = PlatformTriplet::resolve(host)?;
    let cache = CacheManager::new(
        install_root.to_owned(),
        binary_name(&config.project, platform.os()),
    );

    let target = cache.binary_path_for(version);
    if CacheManager::exists(&target) {
        debug!("cache hit: {target}");
        return Ok(target);
    }
    debug!("cache miss for v{version} on {platform}");

    install_release(config, version, platform, &cache, fetcher, extractor, stderr)
}

fn install_release(
    config: &LauncherConfig,
    version: &Version,
    platform: PlatformTriplet,
    cache: &CacheManager,
    fetcher: &dyn AssetFetcher,
    extractor: &dyn ArchiveExtractor,
    stderr: &mut dyn Write,
) -> Result<Utf8PathBuf> {
    let archive_name = AssetName::new(&config.project, platform).filename();
    let base_url = config.release_base_url(version);
    let release = ReleaseLocation {
        base_url: &base_url,
        project: &config.project,
        version,
    };

    let staging = cache.staging_area()?;
    let archive_path = staging.path().join(&archive_name);

    write_progress(
        stderr,
        config.quiet,
        format!("Downloading {} v{version} for {platform}...", config.project),
    );
    match fetcher.fetch_binary(&release.asset_url(&archive_name), archive_path.as_std_path())? {
        FetchOutcome::Found(()) => {}
        FetchOutcome::NotFound => {
            return Err(InstallerError::AssetNotFound {
                platform: platform.to_string(),
                version: version.to_string(),
                asset: archive_name,
            });
        }
    }

    verify_release(fetcher, &release, &archive_name, archive_path.as_std_path())?;

    let staged_binary = staging.path().join(cache.binary_name());
    extractor.extract_binary(
        archive_path.as_std_path(),
        staged_binary.as_std_path(),
        &accepted_member_names(&config.project, platform.os()),
    )?;

    let installed = cache.commit(&staged_binary, version)?;
    drop(staging);

    write_progress(
        stderr,
        config.quiet,
        format!("Installed {} v{version} to {installed}", config.project),
    );
    Ok(installed)
}

#[cfg(test)]
#[path = "install_tests.rs"]
mod tests;
