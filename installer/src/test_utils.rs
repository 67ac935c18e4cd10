//! Shared test utilities for the installer crate.
//!
//! Available to unit tests and, through the `test-support` feature, to the
//! behaviour suites under `tests/`.

use crate::artefact::download::{AssetFetcher, DownloadError, FetchOutcome};
use crate::artefact::sha256_digest::Sha256Digest;
use std::cell::RefCell;
use std::collections::HashMap;
use std::io::Write;
use std::path::Path;

/// Return the lowercase hex SHA-256 digest of `bytes`.
#[must_use]
pub fn sha256_hex(bytes: &[u8]) -> String {
    Sha256Digest::of_bytes(bytes).to_string()
}

/// Build a single-line checksum manifest for `filename`.
#[must_use]
pub fn checksum_manifest(bytes: &[u8], filename: &str) -> String {
    format!("{}  {filename}\n", sha256_hex(bytes))
}

/// Compression applied to a fixture archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    /// `.tar.gz`
    Gzip,
    /// `.tar.zst`
    Zstd,
    /// `.tar`
    Plain,
}

/// Build an in-memory tar archive containing `entries` as regular files.
///
/// # Panics
///
/// Panics if the archive cannot be assembled; intended for tests only.
#[must_use]
pub fn archive_bytes(format: ArchiveFormat, entries: &[(&str, &[u8])]) -> Vec<u8> {
    match format {
        ArchiveFormat::Gzip => {
            let encoder = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
            append_entries(encoder, entries)
                .finish()
                .expect("finish gzip stream")
        }
        ArchiveFormat::Zstd => {
            let encoder = zstd::Encoder::new(Vec::new(), 0).expect("zstd encoder");
            append_entries(encoder, entries)
                .finish()
                .expect("finish zstd frame")
        }
        ArchiveFormat::Plain => append_entries(Vec::new(), entries),
    }
}

/// Write a fixture archive to `path`.
///
/// # Panics
///
/// Panics if the archive cannot be written; intended for tests only.
pub fn write_archive(path: &Path, format: ArchiveFormat, entries: &[(&str, &[u8])]) {
    std::fs::write(path, archive_bytes(format, entries)).expect("write archive fixture");
}

fn append_entries<W: Write>(writer: W, entries: &[(&str, &[u8])]) -> W {
    let mut builder = tar::Builder::new(writer);
    for (name, data) in entries {
        let mut header = tar::Header::new_gnu();
        header.set_size(data.len() as u64);
        header.set_mode(0o755);
        builder
            .append_data(&mut header, name, *data)
            .expect("append archive entry");
    }
    builder.into_inner().expect("finish tar stream")
}

/// A canned response served by [`StubFetcher`].
#[derive(Debug, Clone)]
pub enum StubResponse {
    /// Serve these bytes (binary or text requests).
    Body(Vec<u8>),
    /// Answer 404.
    NotFound,
    /// Fail with a network error carrying this reason.
    Fail(String),
}

/// An [`AssetFetcher`] that serves canned responses and records every URL.
///
/// Unknown URLs answer 404.
#[derive(Debug, Default)]
pub struct StubFetcher {
    responses: HashMap<String, StubResponse>,
    calls: RefCell<Vec<String>>,
}

impl StubFetcher {
    /// Create a stub with no published files.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the response for `url`.
    pub fn serve(&mut self, url: impl Into<String>, response: StubResponse) {
        self.responses.insert(url.into(), response);
    }

    /// Return every URL requested so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    /// Return the number of requests made so far.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }

    fn respond(&self, url: &str) -> Result<FetchOutcome<Vec<u8>>, DownloadError> {
        self.calls.borrow_mut().push(url.to_owned());
        match self.responses.get(url) {
            Some(StubResponse::Body(bytes)) => Ok(FetchOutcome::Found(bytes.clone())),
            Some(StubResponse::NotFound) | None => Ok(FetchOutcome::NotFound),
            Some(StubResponse::Fail(reason)) => Err(DownloadError::Http {
                url: url.to_owned(),
                reason: reason.clone(),
            }),
        }
    }
}

impl AssetFetcher for StubFetcher {
    fn fetch_binary(&self, url: &str, dest: &Path) -> Result<FetchOutcome<()>, DownloadError> {
        match self.respond(url)? {
            FetchOutcome::Found(bytes) => {
                std::fs::write(dest, bytes)?;
                Ok(FetchOutcome::Found(()))
            }
            FetchOutcome::NotFound => Ok(FetchOutcome::NotFound),
        }
    }

    fn fetch_text(&self, url: &str) -> Result<FetchOutcome<String>, DownloadError> {
        Ok(match self.respond(url)? {
            FetchOutcome::Found(bytes) => {
                FetchOutcome::Found(String::from_utf8_lossy(&bytes).into_owned())
            }
            FetchOutcome::NotFound => FetchOutcome::NotFound,
        })
    }
}
