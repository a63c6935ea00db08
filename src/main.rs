mod link;
mod logging;
mod models;
mod platform;
#[cfg_attr(not(windows), allow(dead_code))]
mod resolver;
mod selection;
mod volume;

use anyhow::{anyhow, bail, Result};
use clap::Parser;
use std::path::{Path, PathBuf};

use crate::link::{link_files, regular_files};
use crate::logging::{log, Logger};
use crate::models::{Args, Outcome};
use crate::volume::SystemVolumes;

#[cfg(windows)]
use crate::platform::explorer::Explorer as Shell;
#[cfg(not(windows))]
use crate::selection::NoSelection as Shell;

fn main() -> Result<()> {
    let args = Args::parse();
    let mut logger = Logger::new(args.log.as_deref())?;

    if args.auto {
        log!(logger, "Settings: Mode=auto | DryRun={}", args.dry_run);
        return hardlink_from_clip_to_foreground_window(&args, &mut logger);
    }
    if let Some(dest) = &args.dest {
        log!(
            logger,
            "Settings: Mode=explicit | Dest={:?} | Files={} | DryRun={}",
            dest,
            args.files.len(),
            args.dry_run
        );
        return hardlink_into(dest, &args.files, args.dry_run, &mut logger);
    }
    Ok(())
}

#[cfg(windows)]
fn hardlink_from_clip_to_foreground_window(args: &Args, logger: &mut Logger) -> Result<()> {
    use crate::resolver::resolve_foreground;

    let Some(files) = clipboard_input(platform::windows::clipboard_files(), logger)? else {
        return Ok(());
    };
    let Some(dest) = resolve_foreground(&Shell) else {
        log!(logger, "Foreground window is not showing a directory, nothing to do.");
        return Ok(());
    };
    log!(logger, "Destination: {:?}", dest);
    log!(logger, "Clipboard files: {}", files.len());

    let outcome = link_files(&files, &dest, &SystemVolumes::new(), &Shell, args.dry_run);
    report(outcome, files.len(), true, logger)?;
    Ok(())
}

/// Regular files from a clipboard read. An unreadable clipboard is nothing to do.
#[cfg_attr(not(windows), allow(dead_code))]
fn clipboard_input(read: Result<Vec<PathBuf>>, logger: &mut Logger) -> Result<Option<Vec<PathBuf>>> {
    match read {
        Ok(paths) => Ok(Some(regular_files(paths))),
        Err(err) => {
            log!(logger, "No clipboard files, nothing to do: {:#}", err);
            Ok(None)
        }
    }
}

#[cfg(not(windows))]
fn hardlink_from_clip_to_foreground_window(_args: &Args, _logger: &mut Logger) -> Result<()> {
    bail!("--auto needs the Windows desktop shell; use --dest with explicit files instead")
}

fn hardlink_into(dest: &Path, requested: &[PathBuf], dry_run: bool, logger: &mut Logger) -> Result<()> {
    if !dest.is_dir() {
        bail!("{} is not a directory", dest.display());
    }
    let files = regular_files(requested.iter().cloned());
    for skipped in requested.iter().filter(|p| !files.contains(p)) {
        log!(logger, "Skipping {:?}: not a regular file", skipped);
    }

    let outcome = link_files(&files, dest, &SystemVolumes::new(), &Shell, dry_run);
    if report(outcome, files.len(), false, logger)? {
        bail!("No hardlinks were created");
    }
    Ok(())
}

/// Logs the outcome. Returns true when the batch was rejected.
fn report(outcome: Outcome, total: usize, popups: bool, logger: &mut Logger) -> Result<bool> {
    match outcome {
        Outcome::NothingToDo => {
            log!(logger, "No files to link.");
        }
        Outcome::Rejected(rejections) => {
            for rejection in &rejections {
                log!(logger, "{}", rejection);
                if popups {
                    platform::warn(&rejection.to_string());
                }
            }
            return Ok(true);
        }
        Outcome::DryRun(targets) => {
            for target in &targets {
                log!(logger, "[DRY RUN] Would link {:?}", target);
            }
        }
        Outcome::Linked(report) => {
            for target in &report.linked {
                log!(logger, "Linked {:?}", target);
            }
            if let Some(err) = &report.selection_error {
                log!(logger, "Could not select new links: {:#}", err);
            }
            if let Some(failure) = report.failure {
                return Err(anyhow!(failure.error).context(format!(
                    "Failed to link {:?} ({} of {} links created)",
                    failure.file,
                    report.linked.len(),
                    total
                )));
            }
            log!(logger, "Done.");
        }
    }
    Ok(false)
}
