//! Release asset and executable naming policy.
//!
//! Assets follow the `<project>_<os>_<arch>.tar.gz` convention, and the
//! executable inside them is the bare project name (plus `.exe` on
//! Windows). Archives built for either convention are accepted, so the
//! extractor matches against a small set of names rather than one.

use crate::platform::{Os, PlatformTriplet};
use std::fmt;

/// File extension of published release archives.
const ASSET_EXTENSION: &str = ".tar.gz";

/// A release archive filename for one platform.
///
/// # Examples
///
/// ```
/// use launchpad_installer::artefact::naming::AssetName;
/// use launchpad_installer::platform::{Arch, Os, PlatformTriplet};
///
/// let name = AssetName::new("launchpad", PlatformTriplet::new(Os::Linux, Arch::Amd64));
/// assert_eq!(name.to_string(), "launchpad_linux_amd64.tar.gz");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetName {
    project: String,
    platform: PlatformTriplet,
}

impl AssetName {
    /// Create an asset name for `project` on `platform`.
    #[must_use]
    pub fn new(project: &str, platform: PlatformTriplet) -> Self {
        Self {
            project: project.to_owned(),
            platform,
        }
    }

    /// Return the platform component.
    #[must_use]
    pub const fn platform(&self) -> PlatformTriplet {
        self.platform
    }

    /// Return the filename as a string.
    #[must_use]
    pub fn filename(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for AssetName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}_{}_{}{ASSET_EXTENSION}",
            self.project,
            self.platform.os(),
            self.platform.arch()
        )
    }
}

/// Return the installed executable name for `project` on `os`.
///
/// # Examples
///
/// ```
/// use launchpad_installer::artefact::naming::binary_name;
/// use launchpad_installer::platform::Os;
///
/// assert_eq!(binary_name("launchpad", Os::Windows), "launchpad.exe");
/// assert_eq!(binary_name("launchpad", Os::Darwin), "launchpad");
/// ```
#[must_use]
pub fn binary_name(project: &str, os: Os) -> String {
    format!("{project}{}", os.executable_suffix())
}

/// Return the archive member base names accepted as the executable.
///
/// The platform-specific name comes first, followed by the bare and `.exe`
/// spellings; duplicates are removed while preserving order.
#[must_use]
pub fn accepted_member_names(project: &str, os: Os) -> Vec<String> {
    let mut names = Vec::with_capacity(3);
    for candidate in [
        binary_name(project, os),
        project.to_owned(),
        format!("{project}.exe"),
    ] {
        if !names.contains(&candidate) {
            names.push(candidate);
        }
    }
    names
}
