//! Application-wide constants.
//!
//! Centralized configuration values to avoid magic numbers throughout the codebase.

/// Name of the lightweight tag recording the head seen by the previous run.
pub const MARKER_TAG: &str = "Updated.At";

/// Location of the straight.el package clones, relative to the home directory.
pub const STRAIGHT_REPOS_SUBDIR: &str = ".emacs.d/straight/repos";

/// Remote every package clone is expected to track.
pub const ORIGIN_REMOTE: &str = "origin";

/// Commands run in order when any repository received new commits.
pub const RESTART_COMMANDS: &[&[&str]] = &[
    &["emacsclient", "-e", "(kill-emacs)"],
    &["emacs", "-nw", "--daemon"],
];

/// Default number of threads for parallel repository syncs.
/// Bounded so a large package set does not hammer the hosting services.
pub const DEFAULT_JOBS: usize = 16;

/// Progress bar tick interval in milliseconds.
pub const PROGRESS_TICK_MS: u64 = 80;

/// Git directory name used to detect repositories.
pub const GIT_DIR: &str = ".git";

/// Default name used when a repository name cannot be determined from its path.
pub const DEFAULT_REPO_NAME: &str = "repository";

/// Number of hex characters shown for an abbreviated commit hash.
pub const SHORT_HASH_LEN: usize = 6;

/// Indentation inserted after every newline of a commit message.
pub const MESSAGE_INDENT: &str = "\t\t";

/// xterm-256 palette indices used by the commit log and the restart relay.
pub mod palette {
    pub const DATE: u8 = 140;
    pub const HASH: u8 = 104;
    pub const AUTHOR: u8 = 111;
    pub const MESSAGE: u8 = 108;
    pub const COMMIT_COUNT: u8 = 208;
    pub const COMMAND_STDOUT: u8 = 147;
    pub const COMMAND_STDERR: u8 = 175;
}
