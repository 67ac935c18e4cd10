//! Launcher configuration.
//!
//! Settings are layered: built-in defaults, then an optional TOML file, then
//! environment overrides. The file is read from `LAUNCHPAD_CONFIG` when set,
//! otherwise from `<config_dir>/launchpad/config.toml` if it exists. The
//! pinned release version is deliberately absent: it always comes from the
//! wrapper's own package metadata.

use crate::dirs::BaseDirs;
use crate::error::{InstallerError, Result};
use crate::version::Version;
use camino::{Utf8Path, Utf8PathBuf};
use serde::Deserialize;
use std::time::Duration;

/// Environment variable naming an explicit configuration file.
pub const CONFIG_ENV: &str = "LAUNCHPAD_CONFIG";
/// Environment variable overriding the release URL template.
pub const RELEASE_URL_ENV: &str = "LAUNCHPAD_RELEASE_URL";
/// Environment variable overriding the install root.
pub const INSTALL_ROOT_ENV: &str = "LAUNCHPAD_INSTALL_ROOT";
/// Environment variable suppressing progress output.
pub const QUIET_ENV: &str = "LAUNCHPAD_QUIET";

/// Directory under the user's config dir holding `config.toml`.
const CONFIG_DIR_NAME: &str = "launchpad";
const CONFIG_FILE_NAME: &str = "config.toml";

/// Launcher settings.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct LauncherConfig {
    /// Project name used in asset names, the executable name, and the
    /// install directory.
    pub project: String,
    /// Owner of the repository publishing releases.
    pub owner: String,
    /// Release URL template; `{owner}`, `{project}` and `{version}` are
    /// substituted.
    pub release_url: String,
    /// Overrides the platform-conventional install root when set.
    pub install_root: Option<Utf8PathBuf>,
    /// Per-request network timeout in seconds.
    pub timeout_secs: u64,
    /// Suppress progress output on stderr.
    pub quiet: bool,
}

impl LauncherConfig {
    const DEFAULT_PROJECT: &'static str = "launchpad";
    const DEFAULT_OWNER: &'static str = "launchpad-dev";
    const DEFAULT_RELEASE_URL: &'static str =
        "https://github.com/{owner}/{project}/releases/download/v{version}";
    const DEFAULT_TIMEOUT_SECS: u64 = 30;

    /// Load configuration from the process environment and the host's
    /// configuration directory.
    ///
    /// # Errors
    ///
    /// Returns [`InstallerError::Config`] when a configuration file exists
    /// but cannot be read or parsed, or when `LAUNCHPAD_CONFIG` names a
    /// missing file.
    pub fn load(dirs: &dyn BaseDirs) -> Result<Self> {
        Self::load_with(dirs, |key| std::env::var(key).ok())
    }

    /// Load configuration using `env` to read environment variables.
    ///
    /// # Errors
    ///
    /// See [`Self::load`].
    ///
    /// # Examples
    ///
    /// ```
    /// use launchpad_installer::config::LauncherConfig;
    /// use launchpad_installer::dirs::SystemBaseDirs;
    ///
    /// let config = LauncherConfig::load_with(&SystemBaseDirs::new(), |key| {
    ///     (key == "LAUNCHPAD_QUIET").then(|| "1".to_owned())
    /// })?;
    /// assert!(config.quiet);
    /// # Ok::<(), launchpad_installer::error::InstallerError>(())
    /// ```
    pub fn load_with<F>(dirs: &dyn BaseDirs, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match non_blank(env(CONFIG_ENV)) {
            Some(explicit) => Self::from_file(Utf8Path::new(&explicit))?,
            None => match default_config_path(dirs) {
                Some(path) if path.is_file() => Self::from_file(&path)?,
                _ => Self::default(),
            },
        };
        config.apply_env(&env);
        Ok(config)
    }

    /// Parse configuration from TOML source.
    ///
    /// # Errors
    ///
    /// Returns [`InstallerError::Config`] on syntax errors or unknown keys.
    pub fn from_toml(source: &str) -> Result<Self> {
        toml::from_str(source).map_err(|e| InstallerError::Config {
            path: None,
            reason: e.to_string(),
        })
    }

    fn from_file(path: &Utf8Path) -> Result<Self> {
        let source = std::fs::read_to_string(path).map_err(|e| InstallerError::Config {
            path: Some(path.to_owned()),
            reason: e.to_string(),
        })?;
        toml::from_str(&source).map_err(|e| InstallerError::Config {
            path: Some(path.to_owned()),
            reason: e.to_string(),
        })
    }

    fn apply_env<F>(&mut self, env: &F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = non_blank(env(RELEASE_URL_ENV)) {
            self.release_url = url;
        }
        if let Some(root) = non_blank(env(INSTALL_ROOT_ENV)) {
            self.install_root = Some(Utf8PathBuf::from(root));
        }
        if let Some(quiet) = non_blank(env(QUIET_ENV)) {
            self.quiet = matches!(quiet.to_ascii_lowercase().as_str(), "1" | "true" | "yes");
        }
    }

    /// Return the release base URL for `version`.
    ///
    /// # Examples
    ///
    /// ```
    /// use launchpad_installer::config::LauncherConfig;
    /// use launchpad_installer::version::Version;
    ///
    /// let config = LauncherConfig::default();
    /// let version = Version::parse("1.2.3").expect("valid version");
    /// assert_eq!(
    ///     config.release_base_url(&version),
    ///     "https://github.com/launchpad-dev/launchpad/releases/download/v1.2.3"
    /// );
    /// ```
    #[must_use]
    pub fn release_base_url(&self, version: &Version) -> String {
        self.release_url
            .replace("{owner}", &self.owner)
            .replace("{project}", &self.project)
            .replace("{version}", version.as_str())
            .trim_end_matches('/')
            .to_owned()
    }

    /// Return the per-request network timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for LauncherConfig {
    fn default() -> Self {
        Self {
            project: Self::DEFAULT_PROJECT.to_owned(),
            owner: Self::DEFAULT_OWNER.to_owned(),
            release_url: Self::DEFAULT_RELEASE_URL.to_owned(),
            install_root: None,
            timeout_secs: Self::DEFAULT_TIMEOUT_SECS,
            quiet: false,
        }
    }
}

fn default_config_path(dirs: &dyn BaseDirs) -> Option<Utf8PathBuf> {
    let base = Utf8PathBuf::from_path_buf(dirs.config_dir()?).ok()?;
    Some(base.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}
