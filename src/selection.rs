use anyhow::Result;
use std::path::{Path, PathBuf};

use crate::models::link_target;

pub trait Selector {
    fn open_and_select(&self, dir: &Path, items: &[PathBuf]) -> Result<()>;
}

#[cfg_attr(windows, allow(dead_code))]
pub struct NoSelection;

impl Selector for NoSelection {
    fn open_and_select(&self, _dir: &Path, _items: &[PathBuf]) -> Result<()> {
        Ok(())
    }
}

/// Entries to select for `files` linked into `dir`. `None` when there is
/// nothing to select or any entry is missing.
pub fn selection_targets(dir: &Path, files: &[PathBuf]) -> Option<Vec<PathBuf>> {
    if !dir.is_dir() || files.is_empty() {
        return None;
    }
    files
        .iter()
        .map(|file| {
            let target = link_target(file, dir);
            target.exists().then_some(target)
        })
        .collect()
}

pub fn select_in_dir<S: Selector>(selector: &S, dir: &Path, files: &[PathBuf]) -> Result<bool> {
    match selection_targets(dir, files) {
        Some(targets) => selector.open_and_select(dir, &targets).map(|_| true),
        None => Ok(false),
    }
}
