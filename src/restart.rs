//! Restarting the Emacs daemon after packages changed.
//!
//! Commands run one after another; their stdout and stderr are relayed to our
//! stdout line by line in two distinct colors.

use crate::constants::palette;
use crate::output::paint;
use anyhow::Context;
use std::io::{BufRead, BufReader, Read, Write};
use std::process::{Command, Stdio};

/// Runs every command in order, stopping at the first failure.
pub fn restart_daemon(commands: &[&[&str]]) -> anyhow::Result<()> {
    for argv in commands {
        run_command(argv)?;
    }
    Ok(())
}

/// Runs `argv`, relaying its output, and fails unless it exits successfully.
pub fn run_command(argv: &[&str]) -> anyhow::Result<()> {
    let (program, args) = argv.split_first().context("Empty command")?;
    let display = argv.join(" ");
    log::debug!("running {}", display);

    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .with_context(|| format!("Failed to start '{}'", display))?;

    let stdout = child.stdout.take().context("Child stdout not captured")?;
    let stderr = child.stderr.take().context("Child stderr not captured")?;

    let status = std::thread::scope(|scope| {
        let out = scope.spawn(|| relay(stdout, palette::COMMAND_STDOUT, std::io::stdout()));
        let err = scope.spawn(|| relay(stderr, palette::COMMAND_STDERR, std::io::stdout()));
        let status = child.wait();
        for handle in [out, err] {
            if let Ok(Err(e)) = handle.join() {
                log::warn!("lost output of '{}': {}", display, e);
            }
        }
        status
    })
    .with_context(|| format!("Failed to wait for '{}'", display))?;

    if !status.success() {
        anyhow::bail!("'{}' failed: {}", display, status);
    }
    Ok(())
}

/// Copies `source` to `sink` line by line, painting each line.
///
/// Bytes that are not valid UTF-8 are replaced rather than ending the relay.
/// The source is drained to the end even when the sink fails, so the child
/// never blocks or dies on a closed pipe.
fn relay<R: Read, W: Write>(source: R, color: u8, mut sink: W) -> std::io::Result<()> {
    let mut reader = BufReader::new(source);
    let mut buf = Vec::new();
    let mut write_error = None;
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        if write_error.is_some() {
            continue;
        }
        let line = String::from_utf8_lossy(&buf);
        let line = line.trim_end_matches(['\n', '\r']);
        if let Err(e) = writeln!(sink, "{}", paint(line, color)) {
            write_error = Some(e);
        }
    }
    match write_error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
