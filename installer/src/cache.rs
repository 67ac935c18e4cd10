//! Versioned on-disk cache of installed release binaries.
//!
//! Layout: `<install_root>/<version>/bin/<binary_name>`, where the install
//! root is `<per-user app data>/<project>`. A committed entry is trusted
//! as-is on later runs. New entries are assembled in a process-unique
//! `.staging-*` directory inside the install root and renamed into place,
//! so no partially written binary is ever visible at the final path and
//! concurrent installers cannot observe each other's work. The cleanup
//! utility relies on the same layout functions.

use crate::config::LauncherConfig;
use crate::dirs::BaseDirs;
use crate::error::{InstallerError, Result};
use crate::version::Version;
use camino::{Utf8Path, Utf8PathBuf};
use log::debug;
use std::fs;
use std::io;
use tempfile::TempDir;

/// Prefix of in-progress staging directories inside the install root.
const STAGING_PREFIX: &str = ".staging-";

/// Subdirectory of a version entry holding the executable.
const BIN_DIR: &str = "bin";

/// Resolve the platform-conventional install root for `project`.
///
/// On Windows this is the Local AppData directory (falling back to the home
/// directory); elsewhere it is `~/.local/share`. The project name is
/// appended in both cases.
///
/// # Errors
///
/// Returns [`InstallerError::InstallRootUnavailable`] when no base directory
/// can be determined or it is not valid UTF-8.
pub fn default_install_root(dirs: &dyn BaseDirs, project: &str) -> Result<Utf8PathBuf> {
    let base = if cfg!(windows) {
        dirs.data_local_dir().or_else(|| dirs.home_dir())
    } else {
        dirs.home_dir().map(|home| home.join(".local").join("share"))
    };
    let base = base.ok_or_else(|| InstallerError::InstallRootUnavailable {
        reason: "could not determine the user's data directory".to_owned(),
    })?;
    let base = Utf8PathBuf::from_path_buf(base).map_err(|path| {
        InstallerError::InstallRootUnavailable {
            reason: format!("data directory is not valid UTF-8: {}", path.display()),
        }
    })?;
    Ok(base.join(project))
}

/// Resolve the install root, preferring the configured override.
///
/// # Errors
///
/// See [`default_install_root`].
pub fn resolve_install_root(dirs: &dyn BaseDirs, config: &LauncherConfig) -> Result<Utf8PathBuf> {
    match &config.install_root {
        Some(root) => Ok(root.clone()),
        None => default_install_root(dirs, &config.project),
    }
}

/// Owner of the install root and its per-version entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheManager {
    root: Utf8PathBuf,
    binary_name: String,
}

/// A disposable directory for assembling one install.
///
/// The directory and everything in it is removed when this value drops,
/// whether or not the install succeeded.
#[derive(Debug)]
pub struct StagingArea {
    dir: TempDir,
    path: Utf8PathBuf,
}

impl StagingArea {
    /// Return the staging directory path.
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// Remove the staging directory now, reporting any failure.
    ///
    /// # Errors
    ///
    /// Returns the I/O error raised while deleting the directory.
    pub fn close(self) -> io::Result<()> {
        self.dir.close()
    }
}

impl CacheManager {
    /// Create a manager rooted at `root` for executables named `binary_name`.
    #[must_use]
    pub fn new(root: Utf8PathBuf, binary_name: impl Into<String>) -> Self {
        Self {
            root,
            binary_name: binary_name.into(),
        }
    }

    /// Return the install root.
    #[must_use]
    pub fn install_root(&self) -> &Utf8Path {
        &self.root
    }

    /// Return the installed executable's file name.
    #[must_use]
    pub fn binary_name(&self) -> &str {
        &self.binary_name
    }

    /// Create the install root if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`InstallerError::InstallRootUnavailable`] if the directory
    /// cannot be created.
    pub fn ensure_root(&self) -> Result<()> {
        fs::create_dir_all(&self.root).map_err(|e| InstallerError::InstallRootUnavailable {
            reason: format!("failed to create {}: {e}", self.root),
        })
    }

    /// Return the cache entry directory for `version`.
    #[must_use]
    pub fn version_dir(&self, version: &Version) -> Utf8PathBuf {
        self.root.join(version.as_str())
    }

    /// Return the deterministic executable path for `version`.
    ///
    /// # Examples
    ///
    /// ```
    /// use camino::Utf8PathBuf;
    /// use launchpad_installer::cache::CacheManager;
    /// use launchpad_installer::version::Version;
    ///
    /// let cache = CacheManager::new(Utf8PathBuf::from("/data/launchpad"), "launchpad");
    /// let version = Version::parse("1.0.0").expect("valid version");
    /// assert_eq!(
    ///     cache.binary_path_for(&version),
    ///     Utf8PathBuf::from("/data/launchpad/1.0.0/bin/launchpad")
    /// );
    /// ```
    #[must_use]
    pub fn binary_path_for(&self, version: &Version) -> Utf8PathBuf {
        self.version_dir(version)
            .join(BIN_DIR)
            .join(&self.binary_name)
    }

    /// Whether a committed executable exists at `path`.
    #[must_use]
    pub fn exists(path: &Utf8Path) -> bool {
        path.is_file()
    }

    /// Create a process-unique staging directory inside the install root.
    ///
    /// # Errors
    ///
    /// Returns an error if the install root or the directory cannot be
    /// created.
    pub fn staging_area(&self) -> Result<StagingArea> {
        self.ensure_root()?;
        let dir = tempfile::Builder::new()
            .prefix(STAGING_PREFIX)
            .tempdir_in(&self.root)?;
        let path = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).map_err(|path| {
            InstallerError::InstallRootUnavailable {
                reason: format!("staging directory is not valid UTF-8: {}", path.display()),
            }
        })?;
        Ok(StagingArea { dir, path })
    }

    /// Move a verified, fully written executable into the cache entry for
    /// `version` and return its final path.
    ///
    /// The rename is atomic on the same filesystem; a concurrent writer
    /// committing identical content may win the race, which is harmless. If
    /// the rename fails while an executable is already present at the final
    /// path, that entry is kept and returned.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the entry directory cannot be created or the
    /// rename fails.
    pub fn commit(&self, staged_binary: &Utf8Path, version: &Version) -> Result<Utf8PathBuf> {
        let final_path = self.binary_path_for(version);
        if let Some(parent) = final_path.parent() {
            fs::create_dir_all(parent)?;
        }
        if let Err(err) = fs::rename(staged_binary, &final_path) {
            // A concurrent install may already have committed (and, on
            // Windows, be running) the same verified binary.
            if Self::exists(&final_path) {
                debug!("{final_path} already committed elsewhere: {err}");
                return Ok(final_path);
            }
            return Err(err.into());
        }
        debug!("committed {final_path}");
        Ok(final_path)
    }

    /// List the versions with a cache entry, sorted by name.
    ///
    /// Only directories named like a version (leading digit) and holding a
    /// `bin` subdirectory are reported; staging directories and unrelated
    /// content are ignored.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the install root exists but cannot be read.
    pub fn installed_versions(&self) -> Result<Vec<String>> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut versions = Vec::new();
        for entry in entries {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let Ok(name) = entry.file_name().into_string() else {
                continue;
            };
            if is_version_entry(&self.root, &name) {
                versions.push(name);
            }
        }
        versions.sort();
        Ok(versions)
    }

    /// Delete the cache entry for `version`, returning whether it existed.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the entry exists but cannot be removed.
    pub fn remove_version(&self, version: &Version) -> Result<bool> {
        remove_tree(&self.version_dir(version))
    }

    /// Delete every cache entry and staging directory, returning whether
    /// anything was removed.
    ///
    /// Unrelated content in the install root is left alone, so pointing the
    /// root at a shared directory cannot lose other files. The root itself
    /// is removed once it is empty.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the root exists but cannot be read, or an
    /// entry cannot be removed.
    pub fn remove_all(&self) -> Result<bool> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
            Err(e) => return Err(e.into()),
        };

        let mut removed = false;
        for entry in entries {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let Ok(name) = entry.file_name().into_string() else {
                continue;
            };
            if name.starts_with(STAGING_PREFIX) || is_version_entry(&self.root, &name) {
                removed |= remove_tree(&self.root.join(&name))?;
            }
        }

        if fs::read_dir(&self.root)?.next().is_none() {
            fs::remove_dir(&self.root)?;
            debug!("removed {}", self.root);
            removed = true;
        }
        Ok(removed)
    }
}

/// Whether `name` under `root` looks like a committed cache entry.
fn is_version_entry(root: &Utf8Path, name: &str) -> bool {
    name.starts_with(|c: char| c.is_ascii_digit())
        && Version::parse(name).is_ok_and(|version| version.as_str() == name)
        && root.join(name).join(BIN_DIR).is_dir()
}

fn remove_tree(path: &Utf8Path) -> Result<bool> {
    if !path.exists() {
        return Ok(false);
    }
    fs::remove_dir_all(path)?;
    debug!("removed {path}");
    Ok(true)
}
