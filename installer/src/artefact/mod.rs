//! Release artefact handling: naming, download, verification, extraction.
//!
//! # Sub-modules
//!
//! - [`checksum`] - Checksum manifest parsing and lookup.
//! - [`download`] - Release file fetching trait and HTTP implementation.
//! - [`extraction`] - Executable extraction from tar archives.
//! - [`naming`] - Release asset and executable naming policy.
//! - [`sha256_digest`] - SHA-256 digest newtype (`Sha256Digest`).
//! - [`verification`] - Fail-closed checksum verification of archives.

pub mod checksum;
pub mod download;
pub mod extraction;
pub mod naming;
pub mod sha256_digest;
pub mod verification;
