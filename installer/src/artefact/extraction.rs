//! Executable extraction from release archives.
//!
//! Release archives are tar streams, normally gzip-compressed. The
//! compression layer is detected from the leading magic bytes (gzip, zstd,
//! or none), and the first regular file whose base name is one of the
//! accepted executable names is copied verbatim to the destination. Only
//! the base name of each member is consulted, so archive paths never
//! influence where bytes are written.

use flate2::read::GzDecoder;
use log::trace;
use std::ffi::OsStr;
use std::fs::File;
use std::io::{self, BufReader, Read, Seek};
use std::path::Path;

/// Leading bytes of a gzip stream.
const GZIP_MAGIC: &[u8] = &[0x1f, 0x8b];

/// Leading bytes of a zstd frame.
const ZSTD_MAGIC: &[u8] = &[0x28, 0xb5, 0x2f, 0xfd];

/// Number of bytes sniffed to detect compression.
const MAGIC_LEN: u64 = 4;

/// Trait for extracting the executable from an archive, enabling test mocking.
///
/// # Examples
///
/// ```
/// use launchpad_installer::artefact::extraction::TarExtractor;
///
/// let extractor = TarExtractor;
/// // extractor.extract_binary(archive_path, dest_path, &accepted) in production
/// ```
#[cfg_attr(test, mockall::automock)]
pub trait ArchiveExtractor {
    /// Copy the first member named in `accepted` from `archive_path` to
    /// `dest_path`, then mark it executable on Unix.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractionError::BinaryNotFound`] if no regular file in the
    /// archive has an accepted base name, [`ExtractionError::MemberUnreadable`]
    /// if the matched member cannot be read, and [`ExtractionError::Io`] for
    /// other I/O failures.
    fn extract_binary(
        &self,
        archive_path: &Path,
        dest_path: &Path,
        accepted: &[String],
    ) -> Result<(), ExtractionError>;
}

/// Errors arising from archive extraction.
#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    /// No archive member carries an accepted executable name.
    #[error("binary not found inside release archive (expected one of: {expected})")]
    BinaryNotFound {
        /// Comma-separated list of accepted names.
        expected: String,
    },

    /// The matched member's content could not be read or copied.
    #[error("failed to extract {name} from release archive: {source}")]
    MemberUnreadable {
        /// The member path inside the archive.
        name: String,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// I/O error opening or scanning the archive.
    #[error("extraction I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Compression layers recognised in front of the tar stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    /// gzip (`.tar.gz`).
    Gzip,
    /// Zstandard (`.tar.zst`).
    Zstd,
    /// An uncompressed tar stream.
    None,
}

impl Compression {
    /// Detect the compression layer from the first bytes of a file.
    #[must_use]
    pub fn detect(prefix: &[u8]) -> Self {
        if prefix.starts_with(GZIP_MAGIC) {
            Self::Gzip
        } else if prefix.starts_with(ZSTD_MAGIC) {
            Self::Zstd
        } else {
            Self::None
        }
    }
}

/// Default extractor using the `tar`, `flate2`, and `zstd` crates.
pub struct TarExtractor;

impl ArchiveExtractor for TarExtractor {
    fn extract_binary(
        &self,
        archive_path: &Path,
        dest_path: &Path,
        accepted: &[String],
    ) -> Result<(), ExtractionError> {
        let mut archive = tar::Archive::new(open_decoded(archive_path)?);

        for entry_result in archive.entries()? {
            let mut entry = entry_result?;
            if !entry.header().entry_type().is_file() {
                continue;
            }
            let member = entry.path()?.into_owned();
            if !is_accepted(&member, accepted) {
                continue;
            }

            let name = member.display().to_string();
            trace!("extracting {name} to {}", dest_path.display());
            copy_member(&mut entry, dest_path).map_err(|source| {
                ExtractionError::MemberUnreadable {
                    name: name.clone(),
                    source,
                }
            })?;
            make_executable(dest_path)?;
            return Ok(());
        }

        Err(ExtractionError::BinaryNotFound {
            expected: accepted.join(", "),
        })
    }
}

/// Open `path` and wrap it in the decoder matching its magic bytes.
fn open_decoded(path: &Path) -> io::Result<Box<dyn Read>> {
    let mut file = File::open(path)?;
    let mut prefix = Vec::new();
    (&mut file).take(MAGIC_LEN).read_to_end(&mut prefix)?;
    file.rewind()?;

    let reader: Box<dyn Read> = match Compression::detect(&prefix) {
        Compression::Gzip => Box::new(GzDecoder::new(BufReader::new(file))),
        Compression::Zstd => Box::new(zstd::Decoder::new(file)?),
        Compression::None => Box::new(BufReader::new(file)),
    };
    Ok(reader)
}

fn is_accepted(member: &Path, accepted: &[String]) -> bool {
    member
        .file_name()
        .and_then(OsStr::to_str)
        .is_some_and(|name| accepted.iter().any(|candidate| candidate == name))
}

fn copy_member(entry: &mut impl Read, dest_path: &Path) -> io::Result<()> {
    let mut dest = File::create(dest_path)?;
    io::copy(entry, &mut dest)?;
    dest.sync_all()
}

#[cfg(unix)]
fn make_executable(path: &Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755))
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> io::Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{ArchiveFormat, write_archive};
    use rstest::rstest;

    fn accepted() -> Vec<String> {
        vec!["tool".to_owned(), "tool.exe".to_owned()]
    }

    #[rstest]
    #[case::gzip(ArchiveFormat::Gzip)]
    #[case::zstd(ArchiveFormat::Zstd)]
    #[case::plain(ArchiveFormat::Plain)]
    fn extracts_byte_identical_binary(#[case] format: ArchiveFormat) {
        let temp_dir = tempfile::tempdir().expect("temp dir");
        let archive_path = temp_dir.path().join("release.tar");
        let payload = b"\x7fELF pretend executable".to_vec();
        write_archive(
            &archive_path,
            format,
            &[("README.md", b"docs".as_slice()), ("dist/tool", payload.as_slice())],
        );

        let dest = temp_dir.path().join("out");
        TarExtractor
            .extract_binary(&archive_path, &dest, &accepted())
            .expect("extract");

        assert_eq!(std::fs::read(&dest).expect("read output"), payload);
    }

    #[test]
    fn accepts_exe_name_on_any_platform() {
        let temp_dir = tempfile::tempdir().expect("temp dir");
        let archive_path = temp_dir.path().join("release.tar.gz");
        write_archive(
            &archive_path,
            ArchiveFormat::Gzip,
            &[("tool.exe", b"MZ".as_slice())],
        );

        let dest = temp_dir.path().join("out");
        TarExtractor
            .extract_binary(&archive_path, &dest, &accepted())
            .expect("extract");
        assert_eq!(std::fs::read(&dest).expect("read output"), b"MZ");
    }

    #[test]
    fn missing_member_is_reported_with_expected_names() {
        let temp_dir = tempfile::tempdir().expect("temp dir");
        let archive_path = temp_dir.path().join("release.tar.gz");
        write_archive(
            &archive_path,
            ArchiveFormat::Gzip,
            &[("tool-helper", b"nope".as_slice())],
        );

        let dest = temp_dir.path().join("out");
        let err = TarExtractor
            .extract_binary(&archive_path, &dest, &accepted())
            .expect_err("no matching member");
        assert!(
            matches!(err, ExtractionError::BinaryNotFound { ref expected } if expected == "tool, tool.exe"),
            "unexpected error: {err}"
        );
        assert!(!dest.exists());
    }

    #[test]
    fn garbage_input_is_an_error() {
        let temp_dir = tempfile::tempdir().expect("temp dir");
        let archive_path = temp_dir.path().join("release.tar.gz");
        std::fs::write(&archive_path, [0x1f, 0x8b, 0x00, 0x00, 0x01]).expect("write");

        let dest = temp_dir.path().join("out");
        let result = TarExtractor.extract_binary(&archive_path, &dest, &accepted());
        assert!(result.is_err());
    }

    #[rstest]
    #[case::gzip(&[0x1f, 0x8b, 0x08, 0x00], Compression::Gzip)]
    #[case::zstd(&[0x28, 0xb5, 0x2f, 0xfd], Compression::Zstd)]
    #[case::tar(b"tool", Compression::None)]
    #[case::short(&[0x1f], Compression::None)]
    fn detects_compression_from_magic(#[case] prefix: &[u8], #[case] expected: Compression) {
        assert_eq!(Compression::detect(prefix), expected);
    }

    #[cfg(unix)]
    #[test]
    fn extracted_binary_is_executable() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = tempfile::tempdir().expect("temp dir");
        let archive_path = temp_dir.path().join("release.tar.gz");
        write_archive(
            &archive_path,
            ArchiveFormat::Gzip,
            &[("tool", b"#!/bin/sh\n".as_slice())],
        );

        let dest = temp_dir.path().join("out");
        TarExtractor
            .extract_binary(&archive_path, &dest, &accepted())
            .expect("extract");

        let mode = std::fs::metadata(&dest).expect("metadata").permissions().mode();
        assert_eq!(mode & 0o777, 0o755);
    }
}
