//! Cache cleanup: remove the pinned version, everything, or list entries.
//!
//! Uses the same [`CacheManager`] layout functions as the installer, so the
//! two binaries always agree on where entries live.

use crate::cache::CacheManager;
use crate::cli::CleanupAction;
use crate::error::Result;
use crate::output::write_line;
use crate::version::Version;
use std::io::Write;

/// Carry out `action` against `cache`, reporting to `stdout`.
///
/// `version` is the pinned release whose entry the default action removes.
///
/// # Errors
///
/// Returns an I/O error if an existing entry cannot be listed or removed.
///
/// # Examples
///
/// ```
/// use camino::Utf8PathBuf;
/// use launchpad_installer::cache::CacheManager;
/// use launchpad_installer::cleanup::run_cleanup;
/// use launchpad_installer::cli::CleanupAction;
/// use launchpad_installer::version::Version;
///
/// let temp = tempfile::tempdir()?;
/// let root = Utf8PathBuf::try_from(temp.path().join("launchpad")).expect("UTF-8 path");
/// let cache = CacheManager::new(root, "launchpad");
/// let version = Version::parse("1.0.0")?;
///
/// let mut stdout = Vec::new();
/// run_cleanup(&cache, &version, CleanupAction::RemoveAll, &mut stdout)?;
/// assert!(String::from_utf8_lossy(&stdout).starts_with("No cache found at: "));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn run_cleanup(
    cache: &CacheManager,
    version: &Version,
    action: CleanupAction,
    stdout: &mut dyn Write,
) -> Result<()> {
    match action {
        CleanupAction::RemoveAll => {
            let root = cache.install_root();
            if cache.remove_all()? {
                write_line(stdout, format!("Removed cache: {root}"));
            } else {
                write_line(stdout, format!("No cache found at: {root}"));
            }
        }
        CleanupAction::RemovePinned => {
            let entry = cache.version_dir(version);
            if cache.remove_version(version)? {
                write_line(stdout, format!("Removed cache for v{version}: {entry}"));
            } else {
                write_line(stdout, format!("No cache found for v{version}: {entry}"));
            }
        }
        CleanupAction::List => {
            for installed in cache.installed_versions()? {
                write_line(stdout, installed);
            }
        }
    }
    Ok(())
}
