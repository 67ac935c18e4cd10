//! Host platform resolution for release asset selection.
//!
//! Release assets are named after a closed set of operating systems and
//! CPU architectures. The host's `std::env::consts` values are mapped onto
//! that set here; anything outside it is rejected before any network access
//! takes place.

use std::fmt;
use thiserror::Error;

/// The host reported an operating system or architecture with no release.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported platform: os={os}, arch={arch}")]
pub struct UnsupportedPlatform {
    /// The operating system string reported by the host.
    pub os: String,
    /// The architecture string reported by the host.
    pub arch: String,
}

/// Operating systems for which releases are published.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Os {
    /// Linux distributions.
    Linux,
    /// macOS.
    Darwin,
    /// Windows.
    Windows,
}

impl Os {
    /// Map a host operating system name onto the release naming set.
    ///
    /// Accepts both Rust's `std::env::consts::OS` spelling (`macos`) and the
    /// release spelling (`darwin`).
    #[must_use]
    pub fn from_host(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "linux" => Some(Self::Linux),
            "macos" | "darwin" => Some(Self::Darwin),
            "windows" => Some(Self::Windows),
            _ => None,
        }
    }

    /// Return the name used in release asset filenames.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Linux => "linux",
            Self::Darwin => "darwin",
            Self::Windows => "windows",
        }
    }

    /// Return the executable suffix for this operating system.
    #[must_use]
    pub const fn executable_suffix(self) -> &'static str {
        match self {
            Self::Windows => ".exe",
            Self::Linux | Self::Darwin => "",
        }
    }
}

impl fmt::Display for Os {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// CPU architectures for which releases are published.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Arch {
    /// 64-bit x86.
    Amd64,
    /// 64-bit ARM.
    Arm64,
}

impl Arch {
    /// Map a host architecture name onto the release naming set.
    #[must_use]
    pub fn from_host(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "x86_64" | "amd64" => Some(Self::Amd64),
            "aarch64" | "arm64" => Some(Self::Arm64),
            _ => None,
        }
    }

    /// Return the name used in release asset filenames.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Amd64 => "amd64",
            Self::Arm64 => "arm64",
        }
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The raw operating system and architecture strings reported by a host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostDescriptor<'a> {
    /// Operating system name, e.g. `linux` or `macos`.
    pub os: &'a str,
    /// Architecture name, e.g. `x86_64` or `aarch64`.
    pub arch: &'a str,
}

impl HostDescriptor<'static> {
    /// Describe the host this binary was compiled for.
    #[must_use]
    pub const fn current() -> Self {
        Self {
            os: std::env::consts::OS,
            arch: std::env::consts::ARCH,
        }
    }
}

/// The `(os, arch)` pair that selects a release asset variant.
///
/// # Examples
///
/// ```
/// use launchpad_installer::platform::{Arch, HostDescriptor, Os, PlatformTriplet};
///
/// let host = HostDescriptor { os: "macos", arch: "aarch64" };
/// let triplet = PlatformTriplet::resolve(host).expect("supported host");
/// assert_eq!(triplet.os(), Os::Darwin);
/// assert_eq!(triplet.arch(), Arch::Arm64);
/// assert_eq!(triplet.to_string(), "darwin/arm64");
///
/// let mips = HostDescriptor { os: "linux", arch: "mips" };
/// assert!(PlatformTriplet::resolve(mips).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlatformTriplet {
    os: Os,
    arch: Arch,
}

impl PlatformTriplet {
    /// Create a triplet from already-validated components.
    #[must_use]
    pub const fn new(os: Os, arch: Arch) -> Self {
        Self { os, arch }
    }

    /// Resolve the triplet for the given host description.
    ///
    /// # Errors
    ///
    /// Returns [`UnsupportedPlatform`] when either component is outside the
    /// supported set.
    pub fn resolve(host: HostDescriptor<'_>) -> Result<Self, UnsupportedPlatform> {
        match (Os::from_host(host.os), Arch::from_host(host.arch)) {
            (Some(os), Some(arch)) => Ok(Self { os, arch }),
            _ => Err(UnsupportedPlatform {
                os: host.os.to_owned(),
                arch: host.arch.to_owned(),
            }),
        }
    }

    /// Resolve the triplet for the running host.
    ///
    /// # Errors
    ///
    /// Returns [`UnsupportedPlatform`] on hosts with no published release.
    pub fn detect() -> Result<Self, UnsupportedPlatform> {
        Self::resolve(HostDescriptor::current())
    }

    /// Return the operating system component.
    #[must_use]
    pub const fn os(&self) -> Os {
        self.os
    }

    /// Return the architecture component.
    #[must_use]
    pub const fn arch(&self) -> Arch {
        self.arch
    }
}

impl fmt::Display for PlatformTriplet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.os, self.arch)
    }
}
