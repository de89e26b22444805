//! Test infrastructure for straight-sync integration tests.
#![allow(dead_code)]

use anyhow::Result;
use std::cell::Cell;
use std::path::{Path, PathBuf};
use std::process::Command;
use straight_sync::config::Config;
use straight_sync::git::run_git;
use tempfile::TempDir;

/// Committer timestamp of the first commit of every upstream.
pub const EPOCH: i64 = 1_700_000_000;

/// Seconds between two consecutive fixture commits.
pub const TICK: i64 = 60;

pub fn test_config() -> Config {
    Config::default()
}

/// Runs git with a fixed identity and commit timestamp.
pub fn git_at(repo: &Path, timestamp: i64, args: &[&str]) -> Result<String> {
    let date = format!("{} +0000", timestamp);
    let output = Command::new("git")
        .current_dir(repo)
        .args(args)
        .env("GIT_AUTHOR_NAME", "Test User")
        .env("GIT_AUTHOR_EMAIL", "test@example.com")
        .env("GIT_COMMITTER_NAME", "Test User")
        .env("GIT_COMMITTER_EMAIL", "test@example.com")
        .env("GIT_AUTHOR_DATE", &date)
        .env("GIT_COMMITTER_DATE", &date)
        .output()?;
    if !output.status.success() {
        anyhow::bail!(
            "git {} failed: {}",
            args.join(" "),
            String::from_utf8_lossy(&output.stderr)
        );
    }
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

/// A bare `origin` plus a publishing clone that pushes commits to it.
/// Every commit gets a distinct, increasing committer timestamp.
pub struct Upstream {
    _temp_dir: TempDir,
    bare: PathBuf,
    publisher: PathBuf,
    clock: Cell<i64>,
}

impl Upstream {
    /// Creates an upstream whose master branch holds one initial commit.
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let bare = temp_dir.path().join("origin.git");
        let publisher = temp_dir.path().join("publisher");
        std::fs::create_dir_all(&bare)?;
        std::fs::create_dir_all(&publisher)?;

        run_git(&bare, &["init", "--bare", "-b", "master"])?;
        run_git(&publisher, &["init", "-b", "master"])?;

        let upstream = Self {
            _temp_dir: temp_dir,
            bare,
            publisher,
            clock: Cell::new(EPOCH),
        };
        upstream.commit("Initial commit")?;
        let url = upstream.url();
        run_git(&upstream.publisher, &["remote", "add", "origin", &url])?;
        run_git(&upstream.publisher, &["push", "-u", "origin", "master"])?;
        Ok(upstream)
    }

    pub fn url(&self) -> String {
        self.bare.to_string_lossy().into_owned()
    }

    fn tick(&self) -> i64 {
        let now = self.clock.get();
        self.clock.set(now + TICK);
        now
    }

    /// Commits locally in the publisher without pushing.
    pub fn commit(&self, message: &str) -> Result<String> {
        let timestamp = self.tick();
        self.commit_at(message, timestamp)
    }

    pub fn commit_at(&self, message: &str, timestamp: i64) -> Result<String> {
        git_at(
            &self.publisher,
            timestamp,
            &["commit", "--allow-empty", "--no-gpg-sign", "-m", message],
        )?;
        self.head()
    }

    pub fn push(&self) -> Result<()> {
        run_git(&self.publisher, &["push", "origin", "master"])?;
        Ok(())
    }

    /// Commits `count` numbered changes and pushes them.
    pub fn publish(&self, count: usize) -> Result<String> {
        for i in 0..count {
            self.commit(&format!("Change {}", i + 1))?;
        }
        self.push()?;
        self.head()
    }

    pub fn head(&self) -> Result<String> {
        run_git(&self.publisher, &["rev-parse", "HEAD"])
    }

    /// Committer timestamp of the publisher's head.
    pub fn head_timestamp(&self) -> Result<i64> {
        Ok(run_git(&self.publisher, &["log", "-1", "--format=%ct"])?.parse()?)
    }

    /// Clones the upstream into `dest`.
    pub fn clone_into(&self, dest: &Path) -> Result<()> {
        let parent = dest.parent().unwrap_or(dest);
        std::fs::create_dir_all(parent)?;
        let dest_str = dest.to_string_lossy();
        run_git(parent, &["clone", &self.url(), &dest_str])?;
        Ok(())
    }
}

/// An upstream and one local clone of it, the repository under test.
pub struct Fixture {
    pub upstream: Upstream,
    _local_dir: TempDir,
    local: PathBuf,
}

impl Fixture {
    pub fn new() -> Result<Self> {
        let upstream = Upstream::new()?;
        let local_dir = TempDir::new()?;
        let local = local_dir.path().join("package");
        upstream.clone_into(&local)?;
        Ok(Self {
            upstream,
            _local_dir: local_dir,
            local,
        })
    }

    pub fn path(&self) -> &Path {
        &self.local
    }

    pub fn head(&self) -> Result<String> {
        run_git(&self.local, &["rev-parse", "HEAD"])
    }

    pub fn tag(&self, name: &str) -> Result<String> {
        run_git(&self.local, &["rev-parse", &format!("refs/tags/{}", name)])
    }

    /// Whether `ancestor` is reachable from `descendant` (or equal to it).
    pub fn is_ancestor(&self, ancestor: &str, descendant: &str) -> bool {
        run_git(
            &self.local,
            &["merge-base", "--is-ancestor", ancestor, descendant],
        )
        .is_ok()
    }
}

/// A directory of package clones, each backed by its own upstream.
pub struct Workspace {
    pub dir: TempDir,
    pub upstreams: Vec<(String, Upstream)>,
}

impl Workspace {
    pub fn new(names: &[&str]) -> Result<Self> {
        let dir = TempDir::new()?;
        let mut upstreams = Vec::new();
        for name in names {
            let upstream = Upstream::new()?;
            upstream.clone_into(&dir.path().join(name))?;
            upstreams.push((name.to_string(), upstream));
        }
        Ok(Self { dir, upstreams })
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn upstream(&self, name: &str) -> &Upstream {
        &self
            .upstreams
            .iter()
            .find(|(n, _)| n == name)
            .expect("unknown repository")
            .1
    }
}
