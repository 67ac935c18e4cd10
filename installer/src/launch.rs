//! Process delegation to the installed release binary.

use crate::error::{InstallerError, Result};
use camino::Utf8Path;
use log::debug;
use std::ffi::OsString;
use std::process::{Command, ExitStatus};

/// Exit code reported when a child's status carries neither a code nor a
/// signal.
const UNKNOWN_EXIT: i32 = 1;

/// Run `binary` with `args`, inheriting stdio, and return its exit code.
///
/// On Unix a child terminated by a signal is reported as `128 + signal`,
/// matching shell conventions.
///
/// # Errors
///
/// Returns [`InstallerError::Launch`] if the process cannot be spawned.
pub fn run_binary<I>(binary: &Utf8Path, args: I) -> Result<i32>
where
    I: IntoIterator<Item = OsString>,
{
    debug!("launching {binary}");
    let status = Command::new(binary)
        .args(args)
        .status()
        .map_err(|source| InstallerError::Launch {
            path: binary.to_owned(),
            source,
        })?;
    Ok(exit_code(status))
}

/// Translate a child's exit status into the code this process exits with.
#[must_use]
pub fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    signal_exit_code(status).unwrap_or(UNKNOWN_EXIT)
}

#[cfg(unix)]
fn signal_exit_code(status: ExitStatus) -> Option<i32> {
    use std::os::unix::process::ExitStatusExt;
    status.signal().map(|signal| 128 + signal)
}

#[cfg(not(unix))]
fn signal_exit_code(_status: ExitStatus) -> Option<i32> {
    None
}
