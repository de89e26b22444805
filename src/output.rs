//! Progress bar, colored commit logs, and summary formatting.
//!
//! Colors come from the xterm-256 palette and are rendered through `colored`,
//! which drops them when stdout is not a terminal or `NO_COLOR` is set.

use crate::config::Config;
use crate::constants::{MESSAGE_INDENT, PROGRESS_TICK_MS, palette};
use crate::git::CommitSummary;
use crate::repo::{SyncCallbacks, SyncOutcome, SyncResult, repo_name};
use colored::{Color, ColoredString, Colorize};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// No-op callbacks for when progress tracking is not needed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoOpCallbacks;

impl SyncCallbacks for NoOpCallbacks {}

/// Paints `text` with an xterm-256 palette entry (`38;5;N`).
pub fn paint(text: &str, index: u8) -> ColoredString {
    text.color(Color::AnsiColor(index))
}

/// Renders one commit as a two-line block:
/// date, short hash and author, then the message indented under it.
pub fn format_commit(commit: &CommitSummary) -> String {
    let message = commit
        .message
        .replace('\n', &format!("\n{}", MESSAGE_INDENT));
    format!(
        "\t{} {} {}\n{}{}\n",
        paint(&commit.date, palette::DATE),
        paint(commit.short_hash(), palette::HASH),
        paint(&commit.author, palette::AUTHOR),
        MESSAGE_INDENT,
        paint(&message, palette::MESSAGE),
    )
}

pub fn render_commits(commits: &[CommitSummary]) -> String {
    commits.iter().map(format_commit).collect()
}

/// Header and commit log for a repository that received commits.
/// Returns `None` when nothing arrived or the sync failed.
pub fn format_report(result: &SyncResult) -> Option<String> {
    let SyncOutcome::Success(success) = &result.outcome else {
        return None;
    };
    if success.commits.is_empty() {
        return None;
    }
    Some(format!(
        "{} {}\n{}\n{}",
        format!("Fetched from {}", success.remote_url).yellow(),
        paint(
            &format!("{} new commits", success.commits.len()),
            palette::COMMIT_COUNT
        ),
        format!("local path: {}", result.path.display()).dimmed(),
        render_commits(&success.commits),
    ))
}

pub fn print_reports(results: &[SyncResult], config: &Config) {
    if config.is_quiet() {
        return;
    }
    for report in results.iter().filter_map(format_report) {
        print!("{}", report);
    }
}

/// Running totals shown next to the progress bar.
#[derive(Default)]
struct ProgressState {
    updated: usize,
    failed: usize,
}

/// Thread-safe progress bar over all repositories of a run.
#[derive(Clone)]
pub struct SyncProgress {
    bar: ProgressBar,
    state: Arc<Mutex<ProgressState>>,
}

impl SyncProgress {
    pub fn tracker(&self, path: &Path) -> RepoProgressTracker {
        RepoProgressTracker {
            repo_name: repo_name(path).to_string(),
            progress: self.clone(),
        }
    }

    fn mark_completed(&self, repo_name: &str, new_commits: usize, failed: bool) {
        self.bar.inc(1);

        let mut state = self
            .state
            .lock()
            .expect("SyncProgress state mutex poisoned");
        if failed {
            state.failed += 1;
        }
        if new_commits > 0 {
            state.updated += 1;
        }

        let mut message = format!("{} updated", state.updated).green().to_string();
        if state.failed > 0 {
            message = format!("{} │ {}", message, format!("{} failed", state.failed).red());
        }
        self.bar
            .set_message(format!("{} {}", message, repo_name.dimmed()));
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

/// Per-repository handle that reports its completion to the shared bar.
pub struct RepoProgressTracker {
    repo_name: String,
    progress: SyncProgress,
}

impl SyncCallbacks for RepoProgressTracker {
    fn on_complete(&self, result: &SyncResult) {
        self.progress
            .mark_completed(&self.repo_name, result.new_commit_count(), result.is_failure());
    }
}

/// Creates a progress bar showing completion count.
/// The bar is hidden in quiet or verbose mode.
#[must_use]
pub fn create_sync_progress(total: usize, config: &Config) -> SyncProgress {
    let bar = if config.is_quiet() || config.is_verbose() {
        ProgressBar::hidden()
    } else {
        let bar = ProgressBar::new(total as u64);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{bar:40.cyan/blue} {pos}/{len} synced {spinner:.cyan} {msg}")
                .expect("valid progress template")
                .progress_chars("█░"),
        );
        bar.enable_steady_tick(Duration::from_millis(PROGRESS_TICK_MS));
        bar
    };

    SyncProgress {
        bar,
        state: Arc::new(Mutex::new(ProgressState::default())),
    }
}

pub fn print_repos_root(path: &Path, config: &Config) {
    if config.is_quiet() {
        return;
    }
    println!(
        "{} {}",
        "Syncing packages in:".cyan(),
        path.display().to_string().white().bold()
    )
}

pub fn print_start(count: usize, config: &Config) {
    if config.is_quiet() {
        return;
    }
    if count == 0 {
        println!("{}", "No git repositories found".yellow().bold())
    } else {
        println!("{}", format!("Pulling {} repositories", count).dimmed())
    }
}

pub fn print_restart_start(config: &Config) {
    if config.is_quiet() {
        return;
    }
    println!("{}", "Restarting the Emacs daemon".cyan().bold());
}

pub fn print_summary(results: &[SyncResult], duration: Duration, config: &Config) {
    if config.is_quiet() {
        print_quiet_summary(results);
    } else {
        print_normal_summary(results, duration);
    }
}

fn print_quiet_summary(results: &[SyncResult]) {
    let updated = results.iter().filter(|r| r.new_commit_count() > 0).count();
    println!("{}/{} repositories updated", updated, results.len());

    for result in results {
        if let SyncOutcome::Failed(failure) = &result.outcome {
            eprintln!("error: {}: {}", result.path.display(), failure.error);
        }
    }
}

fn print_normal_summary(results: &[SyncResult], duration: Duration) {
    print_section("Summary");
    let updated: Vec<_> = results
        .iter()
        .filter(|r| r.new_commit_count() > 0)
        .collect();
    let failures: Vec<_> = results.iter().filter(|r| r.is_failure()).collect();

    print_updated(&updated);
    print_failures(&failures);

    println!(
        "{}: {} updated, {} failed, {} repos in {}",
        "Total".white().bold(),
        updated.len(),
        failures.len(),
        results.len(),
        format_duration(duration)
    );
}

fn format_duration(duration: Duration) -> String {
    format!("{:.2}s", duration.as_secs_f32())
}

fn print_section(title: &str) {
    let line = "=".repeat(50).cyan().dimmed();
    let padding = (50 - title.len()) / 2;
    let centered = format!("{:>width$}", title, width = padding + title.len());
    println!("\n{}\n{}\n{}\n", line, centered.cyan().bold(), line);
}

fn print_updated(updated: &[&SyncResult]) {
    if updated.is_empty() {
        return;
    }
    println!("{}", format!("Updated ({}):", updated.len()).green().bold());
    for result in updated {
        println!(
            "  {} {} {} in {}",
            "NEW".green().bold(),
            result.name().white(),
            paint(
                &format!("+{}", result.new_commit_count()),
                palette::COMMIT_COUNT
            ),
            format_duration(result.duration).dimmed(),
        );
    }
    println!();
}

fn print_failures(failures: &[&SyncResult]) {
    if failures.is_empty() {
        return;
    }
    println!("{}", format!("Failed ({}):", failures.len()).red().bold());
    for result in failures {
        if let SyncOutcome::Failed(failure) = &result.outcome {
            println!(
                "  {} {} {} in {}",
                "FAIL".red().bold(),
                result.path.display().to_string().white(),
                format!("while {}: {}", failure.step, failure.error).red(),
                format_duration(result.duration).dimmed(),
            );
        }
    }
    println!();
}
