// Per-repository sync cycle, result types, parallel fan-out

use crate::config::Config;
use crate::constants::{DEFAULT_REPO_NAME, ORIGIN_REMOTE};
use crate::discovery::is_git_repo;
use crate::git::{self, CommitSummary, PullOutcome};
use rayon::prelude::*;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStep {
    Started,
    Opening,
    ReadingHead,
    ReadingRemote,
    MarkingHead,
    Pulling,
    ListingCommits,
    AdvancingMarker,
    Completed,
}

impl fmt::Display for SyncStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            SyncStep::Started => "starting",
            SyncStep::Opening => "opening repository",
            SyncStep::ReadingHead => "reading HEAD",
            SyncStep::ReadingRemote => "reading origin",
            SyncStep::MarkingHead => "tagging current HEAD",
            SyncStep::Pulling => "pulling from origin",
            SyncStep::ListingCommits => "listing new commits",
            SyncStep::AdvancingMarker => "advancing tag",
            SyncStep::Completed => "completed",
        };
        f.write_str(text)
    }
}

#[derive(Debug)]
pub struct SyncResult {
    pub path: PathBuf,
    pub outcome: SyncOutcome,
    pub duration: Duration,
}

impl SyncResult {
    pub fn name(&self) -> &str {
        repo_name(&self.path)
    }

    /// Number of commits that arrived, zero for failures.
    pub fn new_commit_count(&self) -> usize {
        match &self.outcome {
            SyncOutcome::Success(success) => success.commits.len(),
            SyncOutcome::Failed(_) => 0,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self.outcome, SyncOutcome::Failed(_))
    }
}

#[derive(Debug)]
struct SyncError {
    source: anyhow::Error,
    step: SyncStep,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncSuccess {
    pub remote_url: String,
    pub pull: PullOutcome,
    /// Head before pulling; where the marker pointed while commits were listed.
    pub previous_head: String,
    /// Head after pulling; where the marker points now.
    pub head: String,
    pub commits: Vec<CommitSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncFailure {
    pub error: String,
    pub step: SyncStep,
}

#[derive(Debug)]
pub enum SyncOutcome {
    Success(SyncSuccess),
    Failed(SyncFailure),
}

/// Hooks invoked while a repository syncs.
pub trait SyncCallbacks {
    fn on_step(&self, _step: SyncStep) {}
    fn on_complete(&self, _result: &SyncResult) {}
}

/// Raised by any worker that saw new commits; never lowered during a run.
#[derive(Debug, Default)]
pub struct RestartFlag(AtomicBool);

impl RestartFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raise(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_raised(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

pub fn repo_name(path: &Path) -> &str {
    path.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(DEFAULT_REPO_NAME)
}

fn at_step<T>(step: SyncStep, result: anyhow::Result<T>) -> Result<T, SyncError> {
    result.map_err(|e| SyncError { source: e, step })
}

/// Runs the full cycle for one repository: tag the current head, pull, list
/// what arrived since the tag, then move the tag to the new head.
pub fn sync<C>(path: &Path, callbacks: &C, config: &Config) -> SyncResult
where
    C: SyncCallbacks + ?Sized,
{
    let start = Instant::now();
    let outcome = match do_sync(path, callbacks, config) {
        Ok(success) => {
            callbacks.on_step(SyncStep::Completed);
            log::debug!("[{}] {}", repo_name(path), SyncStep::Completed);
            SyncOutcome::Success(success)
        }
        Err(e) => {
            log::debug!("[{}] failed while {}: {:#}", repo_name(path), e.step, e.source);
            SyncOutcome::Failed(SyncFailure {
                error: format!("{:#}", e.source),
                step: e.step,
            })
        }
    };

    let result = SyncResult {
        path: path.to_path_buf(),
        outcome,
        duration: start.elapsed(),
    };
    callbacks.on_complete(&result);
    result
}

fn do_sync<C>(path: &Path, callbacks: &C, config: &Config) -> Result<SyncSuccess, SyncError>
where
    C: SyncCallbacks + ?Sized,
{
    let name = repo_name(path);
    let step = |step: SyncStep| {
        log::debug!("[{}] {}", name, step);
        callbacks.on_step(step);
    };

    step(SyncStep::Started);

    step(SyncStep::Opening);
    if !is_git_repo(path) {
        return Err(SyncError {
            source: anyhow::anyhow!("{} is not a git repository", path.display()),
            step: SyncStep::Opening,
        });
    }

    step(SyncStep::ReadingHead);
    let previous_head = at_step(SyncStep::ReadingHead, git::head_commit(path))?;

    step(SyncStep::ReadingRemote);
    let remote_url = at_step(
        SyncStep::ReadingRemote,
        git::remote_url(path, ORIGIN_REMOTE),
    )?;

    step(SyncStep::MarkingHead);
    let marker = at_step(
        SyncStep::MarkingHead,
        git::ensure_marker(path, &config.marker, &previous_head),
    )?;

    step(SyncStep::Pulling);
    let pull = at_step(SyncStep::Pulling, git::pull(path))?;

    step(SyncStep::ListingCommits);
    let commits = at_step(SyncStep::ListingCommits, git::commits_since(path, &marker))?;

    let head = match pull {
        PullOutcome::UpToDate => previous_head.clone(),
        PullOutcome::Updated => {
            step(SyncStep::AdvancingMarker);
            let head = at_step(SyncStep::AdvancingMarker, git::head_commit(path))?;
            at_step(
                SyncStep::AdvancingMarker,
                git::ensure_marker(path, &config.marker, &head),
            )?;
            head
        }
    };

    Ok(SyncSuccess {
        remote_url,
        pull,
        previous_head,
        head,
        commits,
    })
}

/// Syncs every repository on a pool of `config.jobs()` threads and returns
/// once all of them finished. Results come back in the order of `repos`.
///
/// `restart` is raised when at least one repository received commits.
pub fn sync_all<F, C>(
    repos: &[PathBuf],
    make_callbacks: F,
    restart: &RestartFlag,
    config: &Config,
) -> anyhow::Result<Vec<SyncResult>>
where
    F: Fn(&Path) -> C + Sync,
    C: SyncCallbacks,
{
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.jobs())
        .build()?;

    let results: Vec<SyncResult> = pool.install(|| {
        repos
            .par_iter()
            .map(|path| {
                let path = path.as_path();
                let callbacks = make_callbacks(path);
                let result = sync(path, &callbacks, config);
                if result.new_commit_count() > 0 {
                    restart.raise();
                }
                result
            })
            .collect()
    });

    Ok(results)
}
