//! Locating the straight.el package repositories.

use crate::constants::{GIT_DIR, STRAIGHT_REPOS_SUBDIR};
use anyhow::Context;
use std::path::{Path, PathBuf};

/// `<home>/.emacs.d/straight/repos`
pub fn default_repos_root() -> anyhow::Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine the home directory")?;
    Ok(home.join(STRAIGHT_REPOS_SUBDIR))
}

pub fn is_git_repo(path: &Path) -> bool {
    path.join(GIT_DIR).exists()
}

/// Expands `<root>/*` and returns the matches that are git working trees.
///
/// Only direct children are considered. A missing root or a root without
/// repositories yields an empty list.
pub fn list_repos(root: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let escaped = glob::Pattern::escape(&root.to_string_lossy());
    let pattern = Path::new(&escaped).join("*");
    let pattern = pattern.to_string_lossy();

    let mut repos: Vec<PathBuf> = glob::glob(&pattern)
        .with_context(|| format!("Invalid repository pattern '{}'", pattern))?
        .filter_map(|entry| match entry {
            Ok(path) => Some(path),
            Err(e) => {
                log::warn!("skipping unreadable entry: {}", e);
                None
            }
        })
        .filter(|path| {
            let keep = path.is_dir() && is_git_repo(path);
            if !keep {
                log::debug!("skipping {}: not a git repository", path.display());
            }
            keep
        })
        .collect();

    repos.sort();
    Ok(repos)
}
