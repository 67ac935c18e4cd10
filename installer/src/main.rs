//! Launchpad wrapper entrypoint.
//!
//! Makes sure the release binary pinned to this package's version is
//! installed and verified, then runs it with the caller's arguments and
//! exits with its status. Install failures are reported as a single line on
//! stderr with exit status 1.

use camino::Utf8PathBuf;
use launchpad_installer::cache::resolve_install_root;
use launchpad_installer::config::LauncherConfig;
use launchpad_installer::dirs::{BaseDirs, SystemBaseDirs};
use launchpad_installer::error::Result;
use launchpad_installer::install::{InstallRequest, ensure_installed};
use launchpad_installer::launch::run_binary;
use launchpad_installer::output::{install_error_line, write_line};
use launchpad_installer::platform::HostDescriptor;
use launchpad_installer::version::Version;
use std::io::Write;

fn main() {
    let mut stderr = std::io::stderr();
    let exit_code = run(&mut stderr);
    std::process::exit(exit_code);
}

fn run(stderr: &mut dyn Write) -> i32 {
    let dirs = SystemBaseDirs::new();
    let config = match LauncherConfig::load(&dirs) {
        Ok(config) => config,
        Err(err) => {
            let project = LauncherConfig::default().project;
            return exit_code_for_run_result(&project, Err(err), stderr);
        }
    };

    let result = install(&dirs, &config, stderr)
        .and_then(|binary| run_binary(&binary, std::env::args_os().skip(1)));
    exit_code_for_run_result(&config.project, result, stderr)
}

fn install(
    dirs: &dyn BaseDirs,
    config: &LauncherConfig,
    stderr: &mut dyn Write,
) -> Result<Utf8PathBuf> {
    let version = Version::pinned()?;
    let install_root = resolve_install_root(dirs, config)?;
    let request = InstallRequest {
        config,
        version: &version,
        host: HostDescriptor::current(),
        install_root: &install_root,
    };
    ensure_installed(&request, stderr)
}

fn exit_code_for_run_result(project: &str, result: Result<i32>, stderr: &mut dyn Write) -> i32 {
    match result {
        Ok(code) => code,
        Err(err) => {
            write_line(stderr, install_error_line(project, err));
            1
        }
    }
}
