//! Git command wrappers.
//!
//! This module provides a thin wrapper around git CLI commands,
//! handling command execution and error formatting. Everything the sync
//! cycle needs from a repository (head, remote, marker tag, pull and the
//! commit log) goes through [`run_git`].

use crate::constants::SHORT_HASH_LEN;
use anyhow::Context;
use std::path::Path;
use std::process::{Command, Output};

const FIELD_SEP: char = '\x1f';
const RECORD_SEP: char = '\x1e';

/// `git log` format producing one record per commit:
/// hash, committer timestamp, committer date, author identity and raw message.
const LOG_FORMAT: &str = "--format=%H%x1f%ct%x1f%cd%x1f%an <%ae>%x1f%B%x1e";

fn git_command(repo: &Path, args: &[&str]) -> anyhow::Result<Output> {
    log::debug!("git {} (in {})", args.join(" "), repo.display());
    Command::new("git")
        .current_dir(repo)
        .args(args)
        // Fail instead of blocking a worker on a credential prompt.
        .env("GIT_TERMINAL_PROMPT", "0")
        .env("LC_ALL", "C")
        .output()
        .context("Failed to execute git command")
}

/// Runs git in `repo` and returns its trimmed stdout.
pub fn run_git(repo: &Path, args: &[&str]) -> anyhow::Result<String> {
    let output = git_command(repo, args)?;

    if output.status.success() {
        let result = String::from_utf8_lossy(&output.stdout);
        Ok(result.as_ref().trim().to_string())
    } else {
        let stderr = String::from_utf8_lossy(&output.stderr);
        anyhow::bail!("git {} failed: {}", args.join(" "), stderr.trim())
    }
}

/// Like [`run_git`], but a non-zero exit status yields `None`.
fn try_git(repo: &Path, args: &[&str]) -> anyhow::Result<Option<String>> {
    let output = git_command(repo, args)?;
    if output.status.success() {
        Ok(Some(String::from_utf8_lossy(&output.stdout).trim().to_string()))
    } else {
        Ok(None)
    }
}

fn validate_tag_name(name: &str) -> anyhow::Result<()> {
    if name.is_empty()
        || name.contains('\0')
        || name.contains('\n')
        || name.chars().any(char::is_whitespace)
    {
        anyhow::bail!("Invalid tag name: {:?}", name);
    }
    Ok(())
}

fn tag_ref(name: &str) -> String {
    format!("refs/tags/{}", name)
}

pub fn head_commit(repo: &Path) -> anyhow::Result<String> {
    run_git(repo, &["rev-parse", "--verify", "HEAD"]).context("Failed to read HEAD")
}

pub fn remote_url(repo: &Path, remote: &str) -> anyhow::Result<String> {
    run_git(repo, &["remote", "get-url", remote])
        .with_context(|| format!("Failed to read remote '{}'", remote))
}

/// A movable tag recording the last-seen head of a repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Marker {
    pub name: String,
    pub commit: String,
}

/// Returns the commit the marker tag points at, or `None` when the tag is absent.
pub fn resolve_marker(repo: &Path, name: &str) -> anyhow::Result<Option<String>> {
    validate_tag_name(name)?;
    let revision = format!("{}^{{commit}}", tag_ref(name));
    try_git(repo, &["rev-parse", "--verify", "--quiet", &revision])
        .with_context(|| format!("Failed to resolve tag '{}'", name))
}

/// Points the marker tag `name` at `target`, creating it when absent.
///
/// An existing tag is overwritten regardless of where it pointed before.
pub fn ensure_marker(repo: &Path, name: &str, target: &str) -> anyhow::Result<Marker> {
    let previous = resolve_marker(repo, name)?;
    let reference = tag_ref(name);
    run_git(repo, &["update-ref", &reference, target])
        .with_context(|| format!("Failed to update tag '{}'", name))?;

    match previous {
        Some(old) if old != target => {
            log::debug!("moved {} from {} to {}", name, short_hash(&old), short_hash(target))
        }
        Some(_) => {}
        None => log::debug!("created {} at {}", name, short_hash(target)),
    }

    Ok(Marker {
        name: name.to_string(),
        commit: target.to_string(),
    })
}

/// Result of pulling from the configured remote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PullOutcome {
    UpToDate,
    Updated,
}

/// Fast-forwards the current branch from its upstream.
///
/// Whether anything arrived is decided by comparing `HEAD` before and after,
/// so a failing pull is always an error and never reported as an update.
pub fn pull(repo: &Path) -> anyhow::Result<PullOutcome> {
    let before = head_commit(repo)?;
    run_git(repo, &["pull", "--ff-only"]).context("Failed to pull from remote")?;
    let after = head_commit(repo)?;

    Ok(if before == after {
        PullOutcome::UpToDate
    } else {
        PullOutcome::Updated
    })
}

/// Committer timestamp of `commit`, in seconds since the epoch.
pub fn committer_timestamp(repo: &Path, commit: &str) -> anyhow::Result<i64> {
    let raw = run_git(repo, &["log", "-1", "--format=%ct", commit])
        .with_context(|| format!("Failed to read commit {}", short_hash(commit)))?;
    raw.parse::<i64>()
        .with_context(|| format!("Unexpected commit timestamp {:?}", raw))
}

/// One commit as shown in the per-repository report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitSummary {
    pub hash: String,
    /// Committer time, seconds since the epoch.
    pub timestamp: i64,
    /// Committer date, `YYYY-MM-DD`.
    pub date: String,
    /// `Name <email>`
    pub author: String,
    pub message: String,
}

impl CommitSummary {
    pub fn short_hash(&self) -> &str {
        short_hash(&self.hash)
    }
}

fn short_hash(hash: &str) -> &str {
    hash.get(..SHORT_HASH_LEN).unwrap_or(hash)
}

/// Lists commits reachable from `HEAD` that are newer than the marker commit.
///
/// Selection is by committer time: everything at or after one second past the
/// marker's committer timestamp. Commits sharing the marker's exact second are
/// therefore not reported. The whole history is walked, so an older commit
/// does not hide newer ones behind it. Order follows git's default log order.
pub fn commits_since(repo: &Path, marker: &Marker) -> anyhow::Result<Vec<CommitSummary>> {
    let since = committer_timestamp(repo, &marker.commit)? + 1;
    let output = run_git(repo, &["log", "--date=short", LOG_FORMAT, "HEAD"])
        .context("Failed to list new commits")?;
    Ok(parse_log(&output)?
        .into_iter()
        .filter(|commit| commit.timestamp >= since)
        .collect())
}

fn parse_log(output: &str) -> anyhow::Result<Vec<CommitSummary>> {
    output
        .split(RECORD_SEP)
        .map(|record| record.trim_start_matches('\n'))
        .filter(|record| !record.is_empty())
        .map(|record| -> anyhow::Result<CommitSummary> {
            let mut fields = record.splitn(5, FIELD_SEP);
            let mut next = || {
                fields
                    .next()
                    .with_context(|| format!("Malformed log record: {:?}", record))
            };
            Ok(CommitSummary {
                hash: next()?.to_string(),
                timestamp: next()?
                    .parse()
                    .with_context(|| format!("Malformed commit timestamp in {:?}", record))?,
                date: next()?.to_string(),
                author: next()?.to_string(),
                message: next()?.trim_end_matches('\n').to_string(),
            })
        })
        .collect()
}
