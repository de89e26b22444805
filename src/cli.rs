//! Command-line arguments.

use clap::Parser;
use std::path::PathBuf;
use straight_sync::config::{Config, RestartPolicy, Verbosity};
use straight_sync::constants::{DEFAULT_JOBS, MARKER_TAG};

/// Pull every straight.el package repository and restart Emacs if anything changed
#[derive(Parser, Debug)]
#[command(name = "straight-sync")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Only print a one-line count and errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log every git invocation and sync step
    #[arg(short, long)]
    pub verbose: bool,

    /// Directory holding the package repositories [default: ~/.emacs.d/straight/repos]
    #[arg(long, value_name = "DIR", env = "STRAIGHT_SYNC_ROOT")]
    pub root: Option<PathBuf>,

    /// Maximum number of repositories pulled at the same time
    #[arg(short, long, value_name = "N", env = "STRAIGHT_SYNC_JOBS", default_value_t = DEFAULT_JOBS)]
    pub jobs: usize,

    /// Never restart the Emacs daemon
    #[arg(long, conflicts_with = "confirm")]
    pub no_restart: bool,

    /// Ask before restarting the Emacs daemon
    #[arg(long)]
    pub confirm: bool,
}

impl Cli {
    pub fn config(&self) -> Config {
        let verbosity = if self.quiet {
            Verbosity::Quiet
        } else if self.verbose {
            Verbosity::Verbose
        } else {
            Verbosity::Normal
        };
        let restart = if self.no_restart {
            RestartPolicy::Never
        } else if self.confirm {
            RestartPolicy::Confirm
        } else {
            RestartPolicy::Always
        };

        Config {
            verbosity,
            jobs: self.jobs,
            marker: MARKER_TAG.to_string(),
            restart,
        }
    }
}
