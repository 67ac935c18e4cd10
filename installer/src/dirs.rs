//! Directory resolution abstraction for platform-specific paths.
//!
//! Wraps `directories-next` behind a trait so that cache and configuration
//! paths can be redirected in tests.

use std::path::PathBuf;

/// Source of the per-user base directories the launcher relies on.
#[cfg_attr(test, mockall::automock)]
pub trait BaseDirs {
    /// The user's home directory.
    fn home_dir(&self) -> Option<PathBuf>;

    /// The per-user local application data directory (Local AppData on
    /// Windows).
    fn data_local_dir(&self) -> Option<PathBuf>;

    /// The per-user configuration directory.
    fn config_dir(&self) -> Option<PathBuf>;
}

/// [`BaseDirs`] backed by the host's conventions via `directories-next`.
#[derive(Debug, Clone)]
pub struct SystemBaseDirs {
    inner: Option<directories_next::BaseDirs>,
}

impl SystemBaseDirs {
    /// Resolve the host's base directories.
    ///
    /// Resolution failures (no home directory) surface later as `None` from
    /// each accessor.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: directories_next::BaseDirs::new(),
        }
    }
}

impl Default for SystemBaseDirs {
    fn default() -> Self {
        Self::new()
    }
}

impl BaseDirs for SystemBaseDirs {
    fn home_dir(&self) -> Option<PathBuf> {
        self.inner.as_ref().map(|dirs| dirs.home_dir().to_path_buf())
    }

    fn data_local_dir(&self) -> Option<PathBuf> {
        self.inner
            .as_ref()
            .map(|dirs| dirs.data_local_dir().to_path_buf())
    }

    fn config_dir(&self) -> Option<PathBuf> {
        self.inner.as_ref().map(|dirs| dirs.config_dir().to_path_buf())
    }
}
