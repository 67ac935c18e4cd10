//! Launchpad installer library.
//!
//! Fetches the release binary pinned to this crate's version, verifies it
//! against the release checksum manifest, caches it per version in the
//! user's data directory, and hands off to it. Used by the `launchpad`
//! wrapper and `launchpad-cleanup` binaries, and can be driven
//! programmatically with injected fetchers and extractors for testing.
//!
//! # Modules
//!
//! - [`artefact`] - Asset naming, download, verification and extraction
//! - [`cache`] - Versioned on-disk cache of installed binaries
//! - [`cleanup`] - Cache removal and listing for the cleanup utility
//! - [`cli`] - Command-line argument definitions for the cleanup utility
//! - [`config`] - Layered launcher configuration
//! - [`dirs`] - Directory resolution abstraction for platform-specific paths
//! - [`error`] - Error taxonomy shared by every stage
//! - [`install`] - Install orchestration
//! - [`launch`] - Process delegation to the installed binary
//! - [`output`] - Progress and status line helpers
//! - [`platform`] - Host operating system and architecture resolution
//! - [`version`] - Release version newtype

pub mod artefact;
pub mod cache;
pub mod cleanup;
pub mod cli;
pub mod config;
pub mod dirs;
pub mod error;
pub mod install;
pub mod launch;
pub mod output;
pub mod platform;
#[cfg(any(test, feature = "test-support"))]
pub mod test_utils;
pub mod version;
