use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::models::{link_target, LinkFailure, LinkReport, Outcome, Reason, Rejection};
use crate::selection::{select_in_dir, Selector};
use crate::volume::VolumeProbe;

/// Keep only paths that currently name regular files, preserving order.
pub fn regular_files<I>(paths: I) -> Vec<PathBuf>
where
    I: IntoIterator<Item = PathBuf>,
{
    paths.into_iter().filter(|p| p.is_file()).collect()
}

/// Any directory entry at `path`, including a dangling symlink. Entries that
/// cannot be inspected count as present.
fn entry_exists(path: &Path) -> bool {
    match fs::symlink_metadata(path) {
        Ok(_) => true,
        Err(e) => e.kind() != io::ErrorKind::NotFound,
    }
}

/// First reason `file` may not be linked into `dest`, if any.
pub fn check_file<V: VolumeProbe>(file: &Path, dest: &Path, volumes: &V) -> Option<Reason> {
    if entry_exists(&link_target(file, dest)) {
        return Some(Reason::AlreadyExists);
    }
    if !volumes.same_volume(file, dest) {
        return Some(Reason::DifferentVolume);
    }
    None
}

/// True only if every file may be linked into `dest`. All files are checked
/// and each rejection is passed to `report`. Creates nothing.
pub fn validate<V, F>(files: &[PathBuf], dest: &Path, volumes: &V, mut report: F) -> bool
where
    V: VolumeProbe,
    F: FnMut(Rejection),
{
    if !dest.is_dir() || files.is_empty() {
        return false;
    }
    let mut allowed = true;
    let mut names = HashSet::new();
    for file in files {
        // Two sources with one base name would collide on the second link.
        let repeated = !names.insert(file.file_name().unwrap_or_default().to_os_string());
        let verdict = if repeated {
            Some(Reason::AlreadyExists)
        } else {
            check_file(file, dest, volumes)
        };
        if let Some(reason) = verdict {
            allowed = false;
            report(Rejection {
                file: file.clone(),
                reason,
            });
        }
    }
    allowed
}

/// Link every file into `dest`, stopping at the first failure, then ask the
/// shell to highlight the new entries. Links made before a failure stay.
pub fn apply<S: Selector>(files: &[PathBuf], dest: &Path, selector: &S) -> LinkReport {
    let mut report = LinkReport::default();
    for file in files {
        let target = link_target(file, dest);
        if let Err(error) = fs::hard_link(file, &target) {
            report.failure = Some(LinkFailure {
                file: file.clone(),
                error,
            });
            return report;
        }
        report.linked.push(target);
    }
    report.selection_error = select_in_dir(selector, dest, files).err();
    report
}

/// Validate then apply, all or nothing.
pub fn link_files<V, S>(
    files: &[PathBuf],
    dest: &Path,
    volumes: &V,
    selector: &S,
    dry_run: bool,
) -> Outcome
where
    V: VolumeProbe,
    S: Selector,
{
    if files.is_empty() || !dest.is_dir() {
        return Outcome::NothingToDo;
    }
    let mut rejections = Vec::new();
    if !validate(files, dest, volumes, |r| rejections.push(r)) {
        return Outcome::Rejected(rejections);
    }
    if dry_run {
        return Outcome::DryRun(files.iter().map(|f| link_target(f, dest)).collect());
    }
    Outcome::Linked(apply(files, dest, selector))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::fake::RecordingSelector;
    use crate::volume::SystemVolumes;
    use std::collections::HashSet;
    use tempfile::TempDir;

    /// Treats any path under `foreign` as a separate volume.
    struct SplitVolumes {
        foreign: PathBuf,
    }

    impl VolumeProbe for SplitVolumes {
        fn same_volume(&self, a: &Path, b: &Path) -> bool {
            a.starts_with(&self.foreign) == b.starts_with(&self.foreign)
        }
    }

    fn sources(names: &[&str]) -> (TempDir, Vec<PathBuf>) {
        let dir = tempfile::tempdir().unwrap();
        let files = names
            .iter()
            .map(|name| {
                let path = dir.path().join(name);
                fs::write(&path, format!("contents of {name}")).unwrap();
                path
            })
            .collect();
        (dir, files)
    }

    fn entries(dir: &Path) -> HashSet<String> {
        fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn links_every_file_and_selects_them() {
        let (_src, files) = sources(&["a.txt", "b.txt"]);
        let dest = tempfile::tempdir().unwrap();
        let selector = RecordingSelector::default();

        let report = match link_files(&files, dest.path(), &SystemVolumes::new(), &selector, false) {
            Outcome::Linked(report) => report,
            other => panic!("expected links, got {other:?}"),
        };
        assert!(report.failure.is_none());
        assert!(report.selection_error.is_none());
        assert_eq!(
            report.linked,
            vec![dest.path().join("a.txt"), dest.path().join("b.txt")]
        );
        for file in &files {
            let linked = dest.path().join(file.file_name().unwrap());
            assert_eq!(fs::read(&linked).unwrap(), fs::read(file).unwrap());
        }

        let calls = selector.calls.borrow();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, dest.path());
        assert_eq!(calls[0].1, report.linked);
    }

    #[test]
    fn links_share_content_with_the_source() {
        let (_src, files) = sources(&["shared.txt"]);
        let dest = tempfile::tempdir().unwrap();

        let report = apply(&files, dest.path(), &RecordingSelector::default());
        fs::write(&files[0], "rewritten").unwrap();

        assert_eq!(fs::read_to_string(&report.linked[0]).unwrap(), "rewritten");
    }

    #[test]
    fn existing_name_rejects_the_whole_batch() {
        let (_src, files) = sources(&["a.txt", "b.txt"]);
        let dest = tempfile::tempdir().unwrap();
        fs::write(dest.path().join("a.txt"), "already here").unwrap();
        let selector = RecordingSelector::default();

        let rejections = match link_files(&files, dest.path(), &SystemVolumes::new(), &selector, false) {
            Outcome::Rejected(rejections) => rejections,
            other => panic!("expected rejection, got {other:?}"),
        };
        assert_eq!(
            rejections,
            vec![Rejection {
                file: files[0].clone(),
                reason: Reason::AlreadyExists,
            }]
        );
        assert_eq!(entries(dest.path()), HashSet::from(["a.txt".to_string()]));
        assert_eq!(
            fs::read_to_string(dest.path().join("a.txt")).unwrap(),
            "already here"
        );
        assert!(selector.calls.borrow().is_empty());
    }

    #[test]
    fn different_volume_rejects_the_whole_batch() {
        let (_src, mut files) = sources(&["a.txt"]);
        let (foreign, other) = sources(&["c.txt"]);
        files.extend(other);
        let dest = tempfile::tempdir().unwrap();
        let volumes = SplitVolumes {
            foreign: foreign.path().to_path_buf(),
        };

        let outcome = link_files(
            &files,
            dest.path(),
            &volumes,
            &RecordingSelector::default(),
            false,
        );

        let rejections = match outcome {
            Outcome::Rejected(rejections) => rejections,
            other => panic!("expected rejection, got {other:?}"),
        };
        assert_eq!(rejections.len(), 1);
        assert_eq!(rejections[0].reason, Reason::DifferentVolume);
        assert_eq!(rejections[0].file_name(), "c.txt");
        assert!(entries(dest.path()).is_empty());
    }

    #[test]
    fn every_failing_file_is_reported_once() {
        let (_src, files) = sources(&["a.txt", "b.txt", "c.txt"]);
        let dest = tempfile::tempdir().unwrap();
        fs::write(dest.path().join("a.txt"), "").unwrap();
        let volumes = SplitVolumes {
            foreign: files[0].parent().unwrap().to_path_buf(),
        };

        let mut seen = Vec::new();
        assert!(!validate(&files, dest.path(), &volumes, |r| seen.push(r)));

        // a.txt stops at the existence check; the others fail on volume.
        let reasons: Vec<_> = seen.iter().map(|r| (r.file_name(), r.reason)).collect();
        assert_eq!(
            reasons,
            vec![
                ("a.txt".to_string(), Reason::AlreadyExists),
                ("b.txt".to_string(), Reason::DifferentVolume),
                ("c.txt".to_string(), Reason::DifferentVolume),
            ]
        );
    }

    #[cfg(unix)]
    #[test]
    fn dangling_symlink_in_dest_rejects_the_batch() {
        let (_src, files) = sources(&["a.txt", "b.txt"]);
        let dest = tempfile::tempdir().unwrap();
        std::os::unix::fs::symlink(dest.path().join("nowhere"), dest.path().join("b.txt")).unwrap();

        let rejections = match link_files(
            &files,
            dest.path(),
            &SystemVolumes::new(),
            &RecordingSelector::default(),
            false,
        ) {
            Outcome::Rejected(rejections) => rejections,
            other => panic!("expected rejection, got {other:?}"),
        };

        assert_eq!(rejections.len(), 1);
        assert_eq!(rejections[0].file_name(), "b.txt");
        assert_eq!(rejections[0].reason, Reason::AlreadyExists);
        assert_eq!(entries(dest.path()), HashSet::from(["b.txt".to_string()]));
    }

    #[test]
    fn same_name_from_two_sources_rejects_the_batch() {
        let (_first, mut files) = sources(&["a.txt"]);
        let (_second, more) = sources(&["a.txt"]);
        files.extend(more);
        let dest = tempfile::tempdir().unwrap();

        let rejections = match link_files(
            &files,
            dest.path(),
            &SystemVolumes::new(),
            &RecordingSelector::default(),
            false,
        ) {
            Outcome::Rejected(rejections) => rejections,
            other => panic!("expected rejection, got {other:?}"),
        };

        assert_eq!(
            rejections,
            vec![Rejection {
                file: files[1].clone(),
                reason: Reason::AlreadyExists,
            }]
        );
        assert!(entries(dest.path()).is_empty());
    }

    #[test]
    fn validate_is_repeatable_and_creates_nothing() {
        let (_src, files) = sources(&["a.txt", "b.txt"]);
        let dest = tempfile::tempdir().unwrap();
        let volumes = SystemVolumes::new();

        let first = validate(&files, dest.path(), &volumes, |_| {});
        let second = validate(&files, dest.path(), &volumes, |_| {});

        assert!(first);
        assert_eq!(first, second);
        assert!(entries(dest.path()).is_empty());
    }

    #[test]
    fn empty_input_or_missing_dest_is_vacuously_false() {
        let (_src, files) = sources(&["a.txt"]);
        let dest = tempfile::tempdir().unwrap();
        let volumes = SystemVolumes::new();
        let mut reported = 0;

        assert!(!validate(&[], dest.path(), &volumes, |_| reported += 1));
        assert!(!validate(&files, &dest.path().join("gone"), &volumes, |_| reported += 1));
        assert_eq!(reported, 0);

        let outcome = link_files(&[], dest.path(), &volumes, &RecordingSelector::default(), false);
        assert!(matches!(outcome, Outcome::NothingToDo));
    }

    #[test]
    fn dry_run_creates_nothing() {
        let (_src, files) = sources(&["a.txt", "b.txt"]);
        let dest = tempfile::tempdir().unwrap();
        let selector = RecordingSelector::default();

        let targets = match link_files(&files, dest.path(), &SystemVolumes::new(), &selector, true) {
            Outcome::DryRun(targets) => targets,
            other => panic!("expected dry run, got {other:?}"),
        };
        assert_eq!(targets, vec![dest.path().join("a.txt"), dest.path().join("b.txt")]);
        assert!(entries(dest.path()).is_empty());
        assert!(selector.calls.borrow().is_empty());
    }

    #[test]
    fn failure_keeps_earlier_links_and_skips_selection() {
        let (src, mut files) = sources(&["a.txt"]);
        files.push(src.path().join("vanished.txt"));
        let dest = tempfile::tempdir().unwrap();
        let selector = RecordingSelector::default();

        let report = apply(&files, dest.path(), &selector);

        assert_eq!(report.linked, vec![dest.path().join("a.txt")]);
        assert!(report.selection_error.is_none());
        let failure = report.failure.expect("second link should fail");
        assert_eq!(failure.file, files[1]);
        assert_eq!(failure.error.kind(), std::io::ErrorKind::NotFound);
        assert!(selector.calls.borrow().is_empty());
        assert_eq!(entries(dest.path()), HashSet::from(["a.txt".to_string()]));
    }

    #[test]
    fn selection_failure_does_not_undo_links() {
        let (_src, files) = sources(&["a.txt"]);
        let dest = tempfile::tempdir().unwrap();
        let selector = RecordingSelector {
            fail: true,
            ..Default::default()
        };

        let report = apply(&files, dest.path(), &selector);

        assert!(report.failure.is_none());
        assert!(report.selection_error.is_some());
        assert!(dest.path().join("a.txt").is_file());
    }

    #[test]
    fn only_regular_files_are_kept() {
        let (src, mut files) = sources(&["a.txt"]);
        files.push(src.path().to_path_buf());
        files.push(src.path().join("missing.txt"));

        assert_eq!(regular_files(files.clone()), vec![files[0].clone()]);
    }
}
