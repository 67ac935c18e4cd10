//! `launchpad-cleanup` entrypoint.
//!
//! Removes the cached binary for the pinned version, or the whole install
//! root with `--all`, and lists cached versions with `--list`.

use clap::Parser;
use launchpad_installer::cache::{CacheManager, resolve_install_root};
use launchpad_installer::cleanup::run_cleanup;
use launchpad_installer::cli::CleanupArgs;
use launchpad_installer::config::LauncherConfig;
use launchpad_installer::dirs::SystemBaseDirs;
use launchpad_installer::error::Result;
use launchpad_installer::output::write_line;
use launchpad_installer::version::Version;
use std::io::Write;

fn main() {
    let args = CleanupArgs::parse();
    let mut stdout = std::io::stdout();
    let mut stderr = std::io::stderr();
    let exit_code = exit_code_for_run_result(run(&args, &mut stdout), &mut stderr);
    if exit_code != 0 {
        std::process::exit(exit_code);
    }
}

fn run(args: &CleanupArgs, stdout: &mut dyn Write) -> Result<()> {
    let dirs = SystemBaseDirs::new();
    let config = LauncherConfig::load(&dirs)?;
    let root = resolve_install_root(&dirs, &config)?;
    let version = Version::pinned()?;
    let cache = CacheManager::new(root, config.project);
    run_cleanup(&cache, &version, args.action(), stdout)
}

fn exit_code_for_run_result(result: Result<()>, stderr: &mut dyn Write) -> i32 {
    match result {
        Ok(()) => 0,
        Err(err) => {
            write_line(stderr, format!("launchpad-cleanup: {err}"));
            1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use launchpad_installer::error::InstallerError;

    #[test]
    fn success_exits_zero_silently() {
        let mut stderr = Vec::new();
        assert_eq!(exit_code_for_run_result(Ok(()), &mut stderr), 0);
        assert!(stderr.is_empty());
    }

    #[test]
    fn failure_is_reported_on_stderr() {
        let err = InstallerError::InstallRootUnavailable {
            reason: "could not determine the user's data directory".to_owned(),
        };
        let mut stderr = Vec::new();
        assert_eq!(exit_code_for_run_result(Err(err), &mut stderr), 1);

        let text = String::from_utf8(stderr).expect("stderr was not UTF-8");
        assert!(text.starts_with("launchpad-cleanup: install root unavailable"));
    }
}
