mod cli;

use clap::Parser;
use dialoguer::Confirm;
use std::time::Instant;
use straight_sync::config::{Config, RestartPolicy};
use straight_sync::constants::RESTART_COMMANDS;
use straight_sync::repo::{self, RestartFlag};
use straight_sync::{discovery, output, restart};

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();
    let config = cli.config();

    env_logger::Builder::new()
        .filter_level(config.log_level())
        .parse_default_env()
        .init();

    let root = match &cli.root {
        Some(root) => root.clone(),
        None => discovery::default_repos_root()?,
    };
    output::print_repos_root(&root, &config);

    let repos = discovery::list_repos(&root)?;
    output::print_start(repos.len(), &config);
    if repos.is_empty() {
        return Ok(());
    }

    let start = Instant::now();
    let restart_flag = RestartFlag::new();
    let progress = output::create_sync_progress(repos.len(), &config);
    let results = repo::sync_all(
        &repos,
        |path| progress.tracker(path),
        &restart_flag,
        &config,
    )?;
    progress.finish();

    output::print_reports(&results, &config);
    output::print_summary(&results, start.elapsed(), &config);

    if restart_flag.is_raised() && should_restart(&config)? {
        output::print_restart_start(&config);
        restart::restart_daemon(RESTART_COMMANDS)?;
    }

    let failed = results.iter().filter(|r| r.is_failure()).count();
    if failed > 0 {
        anyhow::bail!("{} of {} repositories failed to sync", failed, results.len());
    }
    Ok(())
}

fn should_restart(config: &Config) -> anyhow::Result<bool> {
    match config.restart {
        RestartPolicy::Always => Ok(true),
        RestartPolicy::Never => Ok(false),
        RestartPolicy::Confirm => Ok(Confirm::new()
            .with_prompt("Restart the Emacs daemon?")
            .default(true)
            .interact()?),
    }
}
