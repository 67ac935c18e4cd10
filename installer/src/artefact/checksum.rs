//! Checksum manifest parsing for release verification.
//!
//! Releases publish a plain-text manifest in the format produced by
//! `sha256sum`: one `<hex-digest> <filename>` pair per line. Blank lines and
//! `#` comments are ignored, and a leading `*` on the filename (the binary
//! mode marker) is stripped. Malformed lines are skipped rather than treated
//! as fatal so that a single stray line cannot block verification of the
//! entries that are well formed.

/// One `(digest, filename)` pair read from a checksum manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChecksumEntry {
    digest: String,
    filename: String,
}

impl ChecksumEntry {
    /// Return the lowercase hex digest.
    #[must_use]
    pub fn digest(&self) -> &str {
        &self.digest
    }

    /// Return the filename with any binary-mode marker removed.
    #[must_use]
    pub fn filename(&self) -> &str {
        &self.filename
    }
}

/// The ordered entries of a parsed checksum manifest.
///
/// # Examples
///
/// ```
/// use launchpad_installer::artefact::checksum::ChecksumManifest;
///
/// let text = "# release checksums\nABCDEF  *tool_linux_amd64.tar.gz\n";
/// let manifest = ChecksumManifest::parse(text);
/// assert_eq!(manifest.lookup("tool_linux_amd64.tar.gz"), Some("abcdef"));
/// assert_eq!(manifest.lookup("tool_darwin_arm64.tar.gz"), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChecksumManifest {
    entries: Vec<ChecksumEntry>,
}

impl ChecksumManifest {
    /// Parse manifest text, skipping comments, blank and malformed lines.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let entries = text.lines().filter_map(parse_line).collect();
        Self { entries }
    }

    /// Return the entries in manifest order.
    #[must_use]
    pub fn entries(&self) -> &[ChecksumEntry] {
        &self.entries
    }

    /// Return the digest of the first entry whose filename equals `filename`.
    ///
    /// Absence is a normal outcome: callers decide whether it is fatal.
    #[must_use]
    pub fn lookup(&self, filename: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|entry| entry.filename == filename)
            .map(ChecksumEntry::digest)
    }
}

/// Look up the digest for `filename` directly in manifest text.
///
/// # Examples
///
/// ```
/// use launchpad_installer::artefact::checksum::lookup_checksum;
///
/// let text = "0123abcd  tool_linux_amd64.tar.gz\n";
/// assert_eq!(
///     lookup_checksum(text, "tool_linux_amd64.tar.gz").as_deref(),
///     Some("0123abcd"),
/// );
/// ```
#[must_use]
pub fn lookup_checksum(text: &str, filename: &str) -> Option<String> {
    ChecksumManifest::parse(text)
        .lookup(filename)
        .map(str::to_owned)
}

fn parse_line(raw: &str) -> Option<ChecksumEntry> {
    let line = raw.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }

    let mut fields = line.split_whitespace();
    let digest = fields.next()?;
    // The filename is the last field; a lone digest is malformed.
    let filename = fields.next_back()?;
    let filename = filename.strip_prefix('*').unwrap_or(filename);

    Some(ChecksumEntry {
        digest: digest.to_ascii_lowercase(),
        filename: filename.to_owned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const DIGEST: &str = "9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08";

    #[rstest]
    #[case::two_spaces(format!("{DIGEST}  launchpad_linux_amd64.tar.gz"))]
    #[case::binary_marker(format!("{DIGEST} *launchpad_linux_amd64.tar.gz"))]
    #[case::surrounding_whitespace(format!("   {DIGEST}\tlaunchpad_linux_amd64.tar.gz   "))]
    #[case::uppercase_digest(format!("{}  launchpad_linux_amd64.tar.gz", DIGEST.to_uppercase()))]
    fn lookup_returns_lowercased_digest(#[case] line: String) {
        let text = format!("# checksums\n\n{line}\n");
        assert_eq!(
            lookup_checksum(&text, "launchpad_linux_amd64.tar.gz").as_deref(),
            Some(DIGEST)
        );
    }

    #[rstest]
    #[case::empty("")]
    #[case::comments_only("# nothing here\n\n   # still nothing\n")]
    #[case::other_files(concat!(
        "aaaa  launchpad_darwin_arm64.tar.gz\n",
        "bbbb  launchpad_windows_amd64.tar.gz\n",
    ))]
    #[case::digest_only("cccc\n")]
    fn lookup_returns_none_without_match(#[case] text: &str) {
        assert_eq!(lookup_checksum(text, "launchpad_linux_amd64.tar.gz"), None);
    }

    #[test]
    fn first_matching_line_wins() {
        let text = "1111  a.tar.gz\n2222  a.tar.gz\n";
        assert_eq!(ChecksumManifest::parse(text).lookup("a.tar.gz"), Some("1111"));
    }

    #[test]
    fn filename_is_taken_from_last_field() {
        let text = "3333 extra-column a.tar.gz\n";
        assert_eq!(ChecksumManifest::parse(text).lookup("a.tar.gz"), Some("3333"));
    }

    #[test]
    fn filename_comparison_is_exact() {
        let text = "4444  A.tar.gz\n5555  a.tar.gz.sig\n";
        assert_eq!(ChecksumManifest::parse(text).lookup("a.tar.gz"), None);
    }

    #[test]
    fn malformed_lines_are_skipped_not_fatal() {
        let text = "garbage\n6666  a.tar.gz\n";
        let manifest = ChecksumManifest::parse(text);
        assert_eq!(manifest.entries().len(), 1);
        assert_eq!(manifest.lookup("a.tar.gz"), Some("6666"));
    }
}
