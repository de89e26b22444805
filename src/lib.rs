//! Straight.el package updater library.
//!
//! This crate keeps the git clones under `~/.emacs.d/straight/repos` current:
//! - Discovering the package repositories
//! - Tagging the current head with a movable `Updated.At` marker
//! - Pulling from `origin` on a bounded thread pool
//! - Listing the commits that arrived since the marker
//! - Restarting the Emacs daemon when anything changed

pub mod config;
pub mod constants;
pub mod discovery;
pub mod git;
pub mod output;
pub mod repo;
pub mod restart;
