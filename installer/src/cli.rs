//! CLI argument definitions for the `launchpad-cleanup` utility.
//!
//! The `launchpad` wrapper itself takes no options of its own: every
//! argument is forwarded to the installed release binary untouched.

use clap::Parser;

/// Remove cached launchpad release binaries.
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "launchpad-cleanup")]
#[command(version, about)]
#[command(long_about = concat!(
    "Remove cached launchpad release binaries.\n\n",
    "By default only the cache entry for the version this utility was ",
    "released with is removed. Use --all to delete every cached version, or ",
    "--list to see what is installed.",
))]
#[command(after_help = concat!(
    "EXAMPLES:\n",
    "  Remove the pinned version:\n",
    "    $ launchpad-cleanup\n\n",
    "  Remove every cached version:\n",
    "    $ launchpad-cleanup --all\n\n",
    "  Show cached versions:\n",
    "    $ launchpad-cleanup --list",
))]
pub struct CleanupArgs {
    /// Remove the whole install root rather than only the pinned version.
    #[arg(long, conflicts_with = "list")]
    pub all: bool,

    /// List installed versions instead of removing anything.
    #[arg(long)]
    pub list: bool,
}

/// What the cleanup utility has been asked to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CleanupAction {
    /// Remove the pinned version's cache entry.
    RemovePinned,
    /// Remove the whole install root.
    RemoveAll,
    /// Print installed versions.
    List,
}

impl CleanupArgs {
    /// Return the action selected by the flags.
    #[must_use]
    pub const fn action(&self) -> CleanupAction {
        if self.list {
            CleanupAction::List
        } else if self.all {
            CleanupAction::RemoveAll
        } else {
            CleanupAction::RemovePinned
        }
    }
}
