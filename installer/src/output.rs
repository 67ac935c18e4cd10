//! Line-oriented output helpers shared by the launcher and cleanup binaries.
//!
//! Writers are passed in explicitly so tests can capture output in a
//! `Vec<u8>`. Write failures are ignored: progress and status lines are
//! informational and must never abort an install.

use std::fmt::Display;
use std::io::Write;

/// Write `message` followed by a newline, ignoring write failures.
pub fn write_line(out: &mut dyn Write, message: impl Display) {
    if writeln!(out, "{message}").is_err() {
        // Output is best-effort.
    }
}

/// Write a progress line to `stderr` unless `quiet` is set.
pub fn write_progress(stderr: &mut dyn Write, quiet: bool, message: impl Display) {
    if !quiet {
        write_line(stderr, message);
    }
}

/// Format the single-line message printed when the launcher fails.
///
/// # Examples
///
/// ```
/// use launchpad_installer::output::install_error_line;
///
/// assert_eq!(
///     install_error_line("launchpad", "connection refused"),
///     "launchpad install error: connection refused"
/// );
/// ```
#[must_use]
pub fn install_error_line(project: &str, err: impl Display) -> String {
    format!("{project} install error: {err}")
}
