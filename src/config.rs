//! Configuration types for CLI verbosity and options.

use crate::constants::{DEFAULT_JOBS, MARKER_TAG};
use log::LevelFilter;

/// Runtime configuration derived from CLI arguments.
#[derive(Debug, Clone)]
pub struct Config {
    /// Controls the verbosity level of CLI output.
    pub verbosity: Verbosity,
    /// Upper bound on repositories synced at the same time.
    pub jobs: usize,
    /// Tag name used as the last-seen marker.
    pub marker: String,
    pub restart: RestartPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            verbosity: Verbosity::default(),
            jobs: DEFAULT_JOBS,
            marker: MARKER_TAG.to_string(),
            restart: RestartPolicy::default(),
        }
    }
}

impl Config {
    #[must_use]
    pub fn is_quiet(&self) -> bool {
        self.verbosity == Verbosity::Quiet
    }

    #[must_use]
    pub fn is_verbose(&self) -> bool {
        self.verbosity == Verbosity::Verbose
    }

    /// Log level used when `RUST_LOG` is not set.
    ///
    /// Verbose mode surfaces every git invocation and sync step; quiet mode
    /// only lets errors through.
    #[must_use]
    pub fn log_level(&self) -> LevelFilter {
        match self.verbosity {
            Verbosity::Quiet => LevelFilter::Error,
            Verbosity::Normal => LevelFilter::Warn,
            Verbosity::Verbose => LevelFilter::Debug,
        }
    }

    /// Pool size, never below one thread.
    #[must_use]
    pub fn jobs(&self) -> usize {
        self.jobs.max(1)
    }
}

/// Verbosity level for CLI output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    Quiet,
    #[default]
    Normal,
    Verbose,
}

/// What to do with the Emacs daemon once some repository changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RestartPolicy {
    #[default]
    Always,
    Confirm,
    Never,
}
